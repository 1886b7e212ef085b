//! Tracking function call state.

use crate::{error::ExecutionErrorKind, Label};

// FreeType provides a call stack with 32 entries.
// See <https://gitlab.freedesktop.org/freetype/freetype/-/blob/57617782464411201ce7bbc93b086c1b4d7d84a5/src/truetype/ttinterp.c#L502>
pub const DEFAULT_MAX_CALL_DEPTH: usize = 32;

/// Labels of the functions currently executing, outermost first.
#[derive(Clone, Debug)]
pub struct CallStack {
    labels: Vec<Label>,
    max_depth: usize,
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CALL_DEPTH)
    }
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            labels: Vec::new(),
            max_depth,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Returns the label of the innermost executing function.
    pub fn current(&self) -> Option<Label> {
        self.labels.last().copied()
    }

    /// Enters the function with the given label.
    ///
    /// Fails when the label is already executing or when the stack is full.
    /// In both cases the error carries the chain of labels from the
    /// outermost call to `label`.
    pub fn push(&mut self, label: Label) -> Result<(), ExecutionErrorKind> {
        if let Some(start) = self.labels.iter().position(|entered| *entered == label) {
            let mut chain = self.labels[start..].to_vec();
            chain.push(label);
            return Err(ExecutionErrorKind::RecursiveCall(chain));
        }
        if self.labels.len() >= self.max_depth {
            let mut chain = self.labels.clone();
            chain.push(label);
            return Err(ExecutionErrorKind::CallStackOverflow(chain));
        }
        self.labels.push(label);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Label> {
        self.labels.pop()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }
}
