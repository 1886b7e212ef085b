//! Managing the flow of control.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#managing-the-flow-of-control>

use super::Flow;
use crate::{environment::Environment, error::ExecutionErrorKind};

impl Environment<'_> {
    /// If test.
    ///
    /// IF[] (0x58)
    ///
    /// Pops: e: stack element
    ///
    /// The condition is consumed but the arm to take is decided by the
    /// executor's branch policy.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#if-test>
    pub(super) fn op_if(&mut self) -> Result<Flow, ExecutionErrorKind> {
        self.stack.pop()?;
        Ok(Flow::Branch)
    }

    /// Call function.
    ///
    /// CALL[] (0x2B)
    ///
    /// Pops: f: function identifier number
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#call-function>
    pub(super) fn op_call(&mut self) -> Result<Flow, ExecutionErrorKind> {
        let label = self
            .stack
            .pop()?
            .known()
            .ok_or(ExecutionErrorKind::UnresolvedCallTarget)?;
        Ok(Flow::Call(label))
    }

    /// Loop and call function.
    ///
    /// LOOPCALL[] (0x2a)
    ///
    /// Pops: f: function number integer in the range 0 through (n-1)
    ///       count: number of times to call the function
    ///
    /// The callee is executed once whatever the count; repeated runs would
    /// only repeat the calls it makes.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#loop-and-call-function>
    pub(super) fn op_loopcall(&mut self) -> Result<Flow, ExecutionErrorKind> {
        let label = self.stack.pop()?;
        self.stack.pop()?;
        let label = label
            .known()
            .ok_or(ExecutionErrorKind::UnresolvedCallTarget)?;
        Ok(Flow::Call(label))
    }
}
