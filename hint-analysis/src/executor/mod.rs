//! Abstract interpreter for hinting programs.
//!
//! The executor walks the control flow graph of a program, applying the
//! abstract semantics of each statement to an [`Environment`]. Calls run
//! the callee's body on the same environment before the caller resumes.

mod arith;
mod control_flow;
mod cvt;
mod dispatch;
mod graphics;
mod outline;
mod stack;

use std::collections::BTreeSet;

use crate::{
    analysis::CallGraph,
    body::Body,
    call_stack::{CallStack, DEFAULT_MAX_CALL_DEPTH},
    container::BytecodeContainer,
    environment::Environment,
    error::{ExecutionError, ExecutionErrorKind},
    Label,
};

pub type OpResult = Result<(), ExecutionErrorKind>;

/// Maximum number of statements executed by a single call to
/// [`Executor::execute`].
///
/// See <https://gitlab.freedesktop.org/freetype/freetype/-/blob/57617782464411201ce7bbc93b086c1b4d7d84a5/include/freetype/config/ftoption.h#L744>
pub const DEFAULT_MAX_INSTRUCTIONS: usize = 1_000_000;

/// Strategy for exploring the arms of an IF.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BranchPolicy {
    /// Only the THEN arm is executed, regardless of the condition.
    #[default]
    ThenArm,
    /// The THEN arm is executed and the ELSE arm, when present, is
    /// additionally executed on a copy of the environment.
    ///
    /// State produced by the ELSE arm is discarded at the merge point but
    /// its calls and stack depth are recorded.
    BothArms,
}

/// Configuration for the executor.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutorOptions {
    pub branch_policy: BranchPolicy,
    /// Maximum depth of nested calls.
    pub max_call_depth: usize,
    /// Maximum number of statements executed per program.
    pub max_instructions: usize,
    /// Number of variation axes reported by GETVARIATION.
    pub axis_count: u16,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            branch_policy: BranchPolicy::default(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_instructions: DEFAULT_MAX_INSTRUCTIONS,
            axis_count: 0,
        }
    }
}

/// What to do after a statement has been applied.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Flow {
    /// Continue with the first successor.
    Next,
    /// Resolve the IF at the current statement.
    Branch,
    /// Run the function with the given label, then continue.
    Call(Label),
}

/// Abstract execution engine.
///
/// A single executor accumulates the call graph and peak stack depth across
/// every program it runs.
pub struct Executor<'a> {
    container: &'a BytecodeContainer,
    options: ExecutorOptions,
    call_graph: CallGraph,
    call_stack: CallStack,
    max_stack_depth: usize,
    instruction_count: usize,
    program: String,
    called: BTreeSet<Label>,
}

impl<'a> Executor<'a> {
    pub fn new(container: &'a BytecodeContainer, options: ExecutorOptions) -> Self {
        Self {
            container,
            options,
            call_graph: CallGraph::default(),
            call_stack: CallStack::new(options.max_call_depth),
            max_stack_depth: 0,
            instruction_count: 0,
            program: String::new(),
            called: BTreeSet::new(),
        }
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Returns an environment seeded with the container's functions and
    /// control values.
    pub fn initial_environment(&self) -> Environment<'a> {
        Environment::new(self.container.functions(), self.container.cvt())
    }

    /// Executes the program with the given tag against `env`.
    ///
    /// Returns the labels of every function called, directly or through
    /// other functions.
    pub fn execute(
        &mut self,
        tag: &str,
        env: &mut Environment<'a>,
    ) -> Result<BTreeSet<Label>, ExecutionError> {
        self.program = tag.into();
        self.call_stack.clear();
        self.instruction_count = 0;
        self.called.clear();
        let container = self.container;
        let program = container.program(tag).ok_or_else(|| ExecutionError {
            program: tag.into(),
            function: None,
            statement: None,
            kind: ExecutionErrorKind::UnknownProgram(tag.into()),
        })?;
        self.run(program.body(), env, 0, None)?;
        log::debug!(
            "{tag}: executed {} statements, {} functions called",
            self.instruction_count,
            self.called.len()
        );
        Ok(core::mem::take(&mut self.called))
    }

    /// Returns invocation counts for every function called so far.
    pub fn call_graph(&self) -> &CallGraph {
        &self.call_graph
    }

    /// Returns the largest value stack depth reached so far.
    pub fn max_stack_depth(&self) -> usize {
        self.max_stack_depth
    }

    /// Consumes the executor, returning the accumulated call graph and peak
    /// stack depth.
    pub fn finish(self) -> (CallGraph, usize) {
        (self.call_graph, self.max_stack_depth)
    }

    /// Walks `body` from `start` until a statement without successors, or
    /// until `stop` is reached.
    fn run(
        &mut self,
        body: &Body,
        env: &mut Environment<'a>,
        start: usize,
        stop: Option<usize>,
    ) -> Result<(), ExecutionError> {
        let mut ix = start;
        while ix < body.len() && Some(ix) != stop {
            let statement = &body.statements()[ix];
            self.instruction_count += 1;
            if self.instruction_count > self.options.max_instructions {
                let kind = ExecutionErrorKind::ExceededExecutionBudget;
                return Err(self.error(body, ix, kind));
            }
            log::trace!("{}: {statement}", body.statement_id(ix));
            let flow = self
                .dispatch(statement, env)
                .map_err(|kind| self.error(body, ix, kind))?;
            self.max_stack_depth = self.max_stack_depth.max(env.stack.peak());
            match flow {
                Flow::Next => {}
                Flow::Branch => {
                    if let Some(then_ix) = self.branch(body, ix, env)? {
                        ix = then_ix;
                        continue;
                    }
                }
                Flow::Call(label) => self.call(body, ix, label, env)?,
            }
            match body.successors(ix).first() {
                Some(next) => ix = *next,
                None => break,
            }
        }
        Ok(())
    }

    /// Runs the function with the given label on `env`.
    fn call(
        &mut self,
        body: &Body,
        ix: usize,
        label: Label,
        env: &mut Environment<'a>,
    ) -> Result<(), ExecutionError> {
        let function = env
            .functions()
            .get(label)
            .ok_or_else(|| self.error(body, ix, ExecutionErrorKind::UndefinedFunction(label)))?;
        self.call_stack
            .push(label)
            .map_err(|kind| self.error(body, ix, kind))?;
        self.called.insert(label);
        self.call_graph.record(label);
        self.run(function.body(), env, 0, None)?;
        self.call_stack.pop();
        Ok(())
    }

    /// Resolves the IF at `ix` according to the branch policy and returns
    /// the index where execution continues.
    fn branch(
        &mut self,
        body: &Body,
        ix: usize,
        env: &mut Environment<'a>,
    ) -> Result<Option<usize>, ExecutionError> {
        let (Some(branch), [then_ix, else_ix]) = (body.branch(ix).copied(), body.successors(ix))
        else {
            return Ok(None);
        };
        let (then_ix, else_ix) = (*then_ix, *else_ix);
        if self.options.branch_policy == BranchPolicy::BothArms && else_ix != branch.eif_ix {
            let mut else_env = env.clone();
            self.run(body, &mut else_env, else_ix, Some(branch.eif_ix))?;
        }
        Ok(Some(then_ix))
    }

    fn error(&self, body: &Body, ix: usize, kind: ExecutionErrorKind) -> ExecutionError {
        ExecutionError {
            program: self.program.clone(),
            function: self.call_stack.current(),
            statement: Some(body.statement_id(ix)),
            kind,
        }
    }
}
