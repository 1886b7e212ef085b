//! Abstract value stack.

use crate::error::ExecutionErrorKind;

use ExecutionErrorKind::ValueStackUnderflow;

/// Abstract value tracked by the interpreter.
///
/// Values pushed as literals, and anything computed only from known values,
/// are known. Measurements of the outline and queries about the rendering
/// environment are unknown.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Known(i32),
    #[default]
    Unknown,
}

impl Value {
    /// Returns the concrete value, if known.
    pub fn known(self) -> Option<i32> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unknown => None,
        }
    }

    /// Applies `op` to a known value.
    pub fn map(self, op: impl FnOnce(i32) -> i32) -> Self {
        match self {
            Self::Known(value) => Self::Known(op(value)),
            Self::Unknown => Self::Unknown,
        }
    }

    /// Applies `op` when both values are known.
    pub fn zip_with(self, other: Self, op: impl FnOnce(i32, i32) -> Option<i32>) -> Self {
        match (self, other) {
            (Self::Known(a), Self::Known(b)) => op(a, b).map_or(Self::Unknown, Self::Known),
            _ => Self::Unknown,
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Known(value)
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Known(value) => write!(f, "{value}"),
            Self::Unknown => f.write_str("?"),
        }
    }
}

/// Value stack for the abstract interpreter.
///
/// Tracks the largest depth reached since creation.
///
/// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#managing-the-stack>
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct ValueStack {
    values: Vec<Value>,
    peak: usize,
}

impl ValueStack {
    /// Returns the depth of the stack.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the largest depth observed.
    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
        self.peak = self.peak.max(self.values.len());
    }

    /// Pushes values decoded from the instruction stream.
    ///
    /// Implements the PUSHB[], PUSHW[], NPUSHB[] and NPUSHW[] instructions.
    pub fn push_literals(&mut self, literals: impl IntoIterator<Item = i32>) {
        self.values
            .extend(literals.into_iter().map(Value::Known));
        self.peak = self.peak.max(self.values.len());
    }

    pub fn peek(&self) -> Option<Value> {
        self.values.last().copied()
    }

    /// Pops a value from the stack.
    ///
    /// Implements the POP[] instruction.
    pub fn pop(&mut self) -> Result<Value, ExecutionErrorKind> {
        self.values.pop().ok_or(ValueStackUnderflow)
    }

    /// Pops and discards `count` values.
    pub fn discard(&mut self, count: usize) -> Result<(), ExecutionErrorKind> {
        let len = self.values.len();
        if count > len {
            return Err(ValueStackUnderflow);
        }
        self.values.truncate(len - count);
        Ok(())
    }

    /// Applies a unary operation.
    ///
    /// Pops `a` from the stack and pushes `op(a)`.
    pub fn apply_unary(
        &mut self,
        op: impl FnOnce(Value) -> Value,
    ) -> Result<(), ExecutionErrorKind> {
        let a = self.pop()?;
        self.push(op(a));
        Ok(())
    }

    /// Applies a binary operation.
    ///
    /// Pops `b` and `a` from the stack and pushes `op(a, b)`.
    pub fn apply_binary(
        &mut self,
        op: impl FnOnce(Value, Value) -> Value,
    ) -> Result<(), ExecutionErrorKind> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(op(a, b));
        Ok(())
    }

    /// Clear the entire stack.
    ///
    /// Implements the CLEAR[] instruction.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Duplicate top stack element.
    ///
    /// Implements the DUP[] instruction.
    pub fn dup(&mut self) -> Result<(), ExecutionErrorKind> {
        let value = self.peek().ok_or(ValueStackUnderflow)?;
        self.push(value);
        Ok(())
    }

    /// Swap the top two elements on the stack.
    ///
    /// Implements the SWAP[] instruction.
    pub fn swap(&mut self) -> Result<(), ExecutionErrorKind> {
        let a = self.pop()?;
        let b = self.pop()?;
        self.push(a);
        self.push(b);
        Ok(())
    }

    /// Copy the indexed element to the top of the stack.
    ///
    /// Implements the CINDEX[] instruction. An unknown index copies an
    /// unknown value.
    pub fn copy_index(&mut self) -> Result<(), ExecutionErrorKind> {
        let index = self.pop()?;
        let value = match index.known() {
            Some(index) => self.element(index)?,
            None => Value::Unknown,
        };
        self.push(value);
        Ok(())
    }

    /// Moves the indexed element to the top of the stack.
    ///
    /// Implements the MINDEX[] instruction. With an unknown index the depth
    /// still drops by one, but any element may have shifted so the whole
    /// stack becomes unknown.
    pub fn move_index(&mut self) -> Result<(), ExecutionErrorKind> {
        let index = self.pop()?;
        match index.known() {
            Some(index) => {
                let element_ix = self.element_ix(index)?;
                let value = self.values.remove(element_ix);
                self.values.push(value);
            }
            None => {
                if self.values.is_empty() {
                    return Err(ValueStackUnderflow);
                }
                self.values.fill(Value::Unknown);
            }
        }
        Ok(())
    }

    /// Roll the top three stack elements.
    ///
    /// Implements the ROLL[] instruction.
    pub fn roll(&mut self) -> Result<(), ExecutionErrorKind> {
        let a = self.pop()?;
        let b = self.pop()?;
        let c = self.pop()?;
        self.push(b);
        self.push(a);
        self.push(c);
        Ok(())
    }

    // Index 1 is the top of the stack.
    fn element_ix(&self, index: i32) -> Result<usize, ExecutionErrorKind> {
        usize::try_from(index)
            .ok()
            .filter(|&index| index >= 1)
            .and_then(|index| self.values.len().checked_sub(index))
            .ok_or(ValueStackUnderflow)
    }

    fn element(&self, index: i32) -> Result<Value, ExecutionErrorKind> {
        Ok(self.values[self.element_ix(index)?])
    }
}
