//! Whole font analysis.
//!
//! Runs the control value program once, then each glyph program against a
//! copy of the resulting environment, collecting the functions reached.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    container::{BytecodeContainer, CONTROL_VALUE_PROGRAM},
    error::ExecutionError,
    executor::{Executor, ExecutorOptions},
    graphics::GraphicsState,
    value_stack::Value,
    Label,
};

/// Number of times each function was invoked.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallGraph {
    counts: BTreeMap<Label, u32>,
}

impl CallGraph {
    /// Records one invocation of `label`.
    pub fn record(&mut self, label: Label) {
        *self.counts.entry(label).or_default() += 1;
    }

    /// Adds the counts of `other` to this graph.
    ///
    /// The result does not depend on the order in which graphs are merged.
    pub fn merge(&mut self, other: &CallGraph) {
        for (label, count) in &other.counts {
            *self.counts.entry(*label).or_default() += count;
        }
    }

    pub fn count(&self, label: Label) -> u32 {
        self.counts.get(&label).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns the called labels and their counts in label order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, u32)> + '_ {
        self.counts.iter().map(|(label, count)| (*label, *count))
    }

    /// Returns the set of called labels.
    pub fn labels(&self) -> BTreeSet<Label> {
        self.counts.keys().copied().collect()
    }
}

/// Results of analyzing the programs of a font.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Analysis {
    /// Functions called by each analyzed program, keyed by tag.
    pub program_calls: BTreeMap<String, BTreeSet<Label>>,
    pub call_graph: CallGraph,
    /// Largest value stack depth reached by any program.
    pub max_stack_depth: usize,
    /// Graphics state after the control value program.
    pub graphics: GraphicsState,
    /// Control values after the control value program.
    pub cvt: Vec<Value>,
}

impl Analysis {
    /// Returns the union of the functions called by every analyzed program.
    pub fn called_functions(&self) -> BTreeSet<Label> {
        self.program_calls.values().flatten().copied().collect()
    }
}

/// Analyzes the control value program and the given glyph programs.
///
/// Passing `None` for `glyphs` analyzes every program other than `prep`.
/// A missing `prep` is treated as empty. The call sets of the analyzed
/// programs are stored back into the container.
pub fn analyze(
    container: &mut BytecodeContainer,
    glyphs: Option<&[&str]>,
    options: ExecutorOptions,
) -> Result<Analysis, ExecutionError> {
    let tags: Vec<String> = match glyphs {
        Some(glyphs) => glyphs.iter().map(|tag| tag.to_string()).collect(),
        None => container.glyph_tags().map(String::from).collect(),
    };
    let analysis = run(container, &tags, options)?;
    for (tag, called) in &analysis.program_calls {
        container.set_called_functions(tag, called.clone());
    }
    Ok(analysis)
}

fn run(
    container: &BytecodeContainer,
    tags: &[String],
    options: ExecutorOptions,
) -> Result<Analysis, ExecutionError> {
    let mut executor = Executor::new(container, options);
    let mut env = executor.initial_environment();
    let mut program_calls = BTreeMap::new();
    if container.program(CONTROL_VALUE_PROGRAM).is_some() {
        let called = executor.execute(CONTROL_VALUE_PROGRAM, &mut env)?;
        program_calls.insert(CONTROL_VALUE_PROGRAM.to_string(), called);
    }
    // Each glyph starts from the state left by prep.
    env.stack.clear();
    for tag in tags {
        let mut glyph_env = env.clone();
        let called = executor.execute(tag, &mut glyph_env)?;
        program_calls.insert(tag.clone(), called);
    }
    let (call_graph, max_stack_depth) = executor.finish();
    log::debug!(
        "analyzed {} programs, {} functions reached, peak stack depth {max_stack_depth}",
        program_calls.len(),
        call_graph.len()
    );
    Ok(Analysis {
        program_calls,
        call_graph,
        max_stack_depth,
        graphics: env.graphics,
        cvt: env.cvt().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_data, BranchPolicy};

    fn container(glyphs: &[(&str, &str)]) -> BytecodeContainer {
        let programs = [("fpgm", test_data::FPGM), ("prep", test_data::PREP)]
            .into_iter()
            .chain(glyphs.iter().copied());
        BytecodeContainer::new(programs, test_data::CVT.to_vec()).unwrap()
    }

    #[test]
    fn prep_and_glyph_calls() {
        let mut container = container(&[
            ("glyf.a", test_data::GLYPH_A),
            ("glyf.b", test_data::GLYPH_B),
        ]);
        let analysis = analyze(&mut container, None, ExecutorOptions::default()).unwrap();
        assert_eq!(analysis.program_calls["prep"], BTreeSet::from([4]));
        assert_eq!(analysis.program_calls["glyf.a"], BTreeSet::from([5]));
        assert!(analysis.program_calls["glyf.b"].is_empty());
        assert_eq!(analysis.called_functions(), BTreeSet::from([4, 5]));
        assert_eq!(analysis.call_graph.count(4), 1);
        assert_eq!(analysis.call_graph.count(3), 0);
        // three values left by prep plus two pushed by function 4
        assert_eq!(analysis.max_stack_depth, 5);
        // function 4 copies cvt[0] into cvt[1]
        assert_eq!(
            analysis.cvt,
            [Value::Known(64), Value::Known(64), Value::Known(256)]
        );
        assert_eq!(
            container.program("glyf.a").unwrap().called_functions(),
            &BTreeSet::from([5])
        );
    }

    #[test]
    fn glyphs_are_isolated() {
        // writes 5 into cvt[2] and changes a zone pointer
        let writer = "PUSHB[ ] 2 5 WCVTP[ ] PUSHB[ ] 0 SZP0[ ]";
        // calls the function named by cvt[2]
        let reader = "PUSHB[ ] 2 RCVT[ ] CALL[ ]";
        let mut container = container(&[("glyf.a", writer), ("glyf.b", reader)]);
        container.set_cvt(2, 3).unwrap();
        let analysis = analyze(&mut container, None, ExecutorOptions::default()).unwrap();
        assert_eq!(analysis.program_calls["glyf.b"], BTreeSet::from([3]));
        assert_eq!(analysis.cvt[2], Value::Known(3));
        assert_eq!(analysis.graphics.zp0, Value::Known(1));
    }

    #[test]
    fn glyphs_start_on_empty_stack() {
        // prep leaves three values behind and sets rp0
        let prep = "PUSHB[ ] 1 2 3 PUSHB[ ] 9 SRP0[ ]";
        // calls function 3 only when the stack starts empty
        let glyph = "DEPTH[ ] PUSHB[ ] 3 ADD[ ] CALL[ ]";
        let programs = [
            ("fpgm", test_data::FPGM),
            ("prep", prep),
            ("glyf.a", glyph),
        ];
        let mut container = BytecodeContainer::new(programs, test_data::CVT.to_vec()).unwrap();
        let analysis = analyze(&mut container, None, ExecutorOptions::default()).unwrap();
        assert_eq!(analysis.program_calls["glyf.a"], BTreeSet::from([3]));
        assert_eq!(analysis.graphics.rp0, Value::Known(9));
    }

    #[test]
    fn selected_glyphs_only() {
        let mut container = container(&[
            ("glyf.a", test_data::GLYPH_A),
            ("glyf.b", test_data::GLYPH_B),
        ]);
        let analysis = analyze(
            &mut container,
            Some(&["glyf.b"]),
            ExecutorOptions {
                branch_policy: BranchPolicy::BothArms,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(analysis.called_functions(), BTreeSet::from([4]));
        assert!(container.program("glyf.a").unwrap().called_functions().is_empty());
    }

    #[test]
    fn unknown_glyph() {
        let mut container = container(&[]);
        let err = analyze(&mut container, Some(&["glyf.z"]), Default::default()).unwrap_err();
        assert_eq!(err.program, "glyf.z");
    }

    #[test]
    fn merge_is_commutative() {
        let mut a = CallGraph::default();
        a.record(1);
        a.record(2);
        let mut b = CallGraph::default();
        b.record(2);
        b.record(7);
        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);
        assert_eq!(ab, ba);
        assert_eq!(ab.iter().collect::<Vec<_>>(), [(1, 1), (2, 2), (7, 1)]);
        assert_eq!(ab.labels(), BTreeSet::from([1, 2, 7]));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let mut container = container(&[("glyf.a", test_data::GLYPH_A)]);
        let analysis = analyze(&mut container, None, ExecutorOptions::default()).unwrap();
        let json = serde_json::to_string(&analysis).unwrap();
        let parsed: Analysis = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, analysis);
    }
}
