//! Managing the stack and pushing data onto the interpreter stack.
//!
//! Most stack manipulation is delegated directly to
//! [`ValueStack`](crate::ValueStack).
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#managing-the-stack>

use super::OpResult;
use crate::{environment::Environment, instruction::Statement, value_stack::Value};

impl Environment<'_> {
    /// PUSH[], PUSHB[], PUSHW[], NPUSHB[] and NPUSHW[]
    ///
    /// Pushes the literal operands of the statement.
    pub(super) fn op_push(&mut self, statement: &Statement) {
        self.stack.push_literals(statement.values());
    }

    /// Returns the depth of the stack.
    ///
    /// DEPTH[] (0x24)
    ///
    /// Pushes: n: number of elements
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#returns-the-depth-of-the-stack>
    pub(super) fn op_depth(&mut self) {
        let depth = self.stack.len() as i32;
        self.stack.push(depth);
    }

    /// Consumes `pops` operands and pushes `pushes` unknown results.
    ///
    /// Used for measurements, queries and point movement whose effect on
    /// the outline is not tracked.
    pub(super) fn op_opaque(&mut self, pops: usize, pushes: usize) -> OpResult {
        self.stack.discard(pops)?;
        for _ in 0..pushes {
            self.stack.push(Value::Unknown);
        }
        Ok(())
    }

    /// Get variation.
    ///
    /// GETVARIATION[] (0x91)
    ///
    /// Pushes: Normalized axes coordinates, one for each axis in the font.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#get-variation>
    pub(super) fn op_getvariation(&mut self, axis_count: u16) {
        for _ in 0..axis_count {
            self.stack.push(Value::Unknown);
        }
    }
}
