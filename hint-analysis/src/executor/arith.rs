//! Arithmetic, math and logical instructions.
//!
//! Results are computed when every operand is known and are unknown
//! otherwise.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#arithmetic-and-math-instructions>
//! and <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#logical-functions>

use super::OpResult;
use crate::{environment::Environment, math, value_stack::Value};

fn binary(op: fn(i32, i32) -> Option<i32>) -> impl FnOnce(Value, Value) -> Value {
    move |a, b| a.zip_with(b, op)
}

fn compare(op: fn(&i32, &i32) -> bool) -> impl FnOnce(Value, Value) -> Value {
    move |a, b| a.zip_with(b, |a, b| Some(op(&a, &b) as i32))
}

impl Environment<'_> {
    /// LT[] (0x50)
    pub(super) fn op_lt(&mut self) -> OpResult {
        self.stack.apply_binary(compare(i32::lt))
    }

    /// LTEQ[] (0x51)
    pub(super) fn op_lteq(&mut self) -> OpResult {
        self.stack.apply_binary(compare(i32::le))
    }

    /// GT[] (0x52)
    pub(super) fn op_gt(&mut self) -> OpResult {
        self.stack.apply_binary(compare(i32::gt))
    }

    /// GTEQ[] (0x53)
    pub(super) fn op_gteq(&mut self) -> OpResult {
        self.stack.apply_binary(compare(i32::ge))
    }

    /// EQ[] (0x54)
    pub(super) fn op_eq(&mut self) -> OpResult {
        self.stack.apply_binary(compare(i32::eq))
    }

    /// NEQ[] (0x55)
    pub(super) fn op_neq(&mut self) -> OpResult {
        self.stack.apply_binary(compare(i32::ne))
    }

    /// Odd.
    ///
    /// ODD[] (0x56)
    ///
    /// Pops: e1
    /// Pushes: Boolean value
    ///
    /// The value is rounded with the current round state before testing, so
    /// the result is unknown under the super rounding modes.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#odd>
    pub(super) fn op_odd(&mut self) -> OpResult {
        let round_state = self.graphics.round_state;
        self.stack.apply_unary(|e1| {
            e1.known()
                .map_or(Value::Unknown, |e1| round_state.round(e1))
                .map(|rounded| (rounded & 127 == 64) as i32)
        })
    }

    /// Even.
    ///
    /// EVEN[] (0x57)
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#even>
    pub(super) fn op_even(&mut self) -> OpResult {
        let round_state = self.graphics.round_state;
        self.stack.apply_unary(|e1| {
            e1.known()
                .map_or(Value::Unknown, |e1| round_state.round(e1))
                .map(|rounded| (rounded & 127 == 0) as i32)
        })
    }

    /// Logical and.
    ///
    /// AND[] (0x5A)
    ///
    /// A known false operand decides the result on its own.
    pub(super) fn op_and(&mut self) -> OpResult {
        self.stack.apply_binary(|a, b| match (a, b) {
            (Value::Known(0), _) | (_, Value::Known(0)) => Value::Known(0),
            _ => a.zip_with(b, |_, _| Some(1)),
        })
    }

    /// Logical or.
    ///
    /// OR[] (0x5B)
    ///
    /// A known true operand decides the result on its own.
    pub(super) fn op_or(&mut self) -> OpResult {
        self.stack.apply_binary(|a, b| match (a.known(), b.known()) {
            (Some(a), _) if a != 0 => Value::Known(1),
            (_, Some(b)) if b != 0 => Value::Known(1),
            (Some(_), Some(_)) => Value::Known(0),
            _ => Value::Unknown,
        })
    }

    /// Logical not.
    ///
    /// NOT[] (0x5C)
    pub(super) fn op_not(&mut self) -> OpResult {
        self.stack.apply_unary(|e| e.map(|e| (e == 0) as i32))
    }

    /// ADD[] (0x60)
    ///
    /// Pops: n1, n2 (F26Dot6)
    /// Pushes: (n2 + n1)
    pub(super) fn op_add(&mut self) -> OpResult {
        self.stack.apply_binary(binary(|a, b| Some(a.wrapping_add(b))))
    }

    /// SUB[] (0x61)
    ///
    /// Pops: n1, n2 (F26Dot6)
    /// Pushes: (n2 - n1)
    pub(super) fn op_sub(&mut self) -> OpResult {
        self.stack.apply_binary(binary(|a, b| Some(a.wrapping_sub(b))))
    }

    /// DIV[] (0x62)
    ///
    /// Pops: n1, n2 (F26Dot6)
    /// Pushes: (n2/n1)
    ///
    /// Truncates rather than rounds. A known zero divisor would fault at
    /// runtime; the result is left unknown.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#divide>
    pub(super) fn op_div(&mut self) -> OpResult {
        self.stack
            .apply_binary(binary(|a, b| math::mul_div_no_round(a, 64, b)))
    }

    /// MUL[] (0x63)
    ///
    /// Pops: n1, n2 (F26Dot6)
    /// Pushes: (n2 * n1)
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#multiply>
    pub(super) fn op_mul(&mut self) -> OpResult {
        self.stack.apply_binary(binary(|a, b| math::mul_div(a, b, 64)))
    }

    /// ABS[] (0x64)
    pub(super) fn op_abs(&mut self) -> OpResult {
        self.stack.apply_unary(|n| n.map(i32::wrapping_abs))
    }

    /// NEG[] (0x65)
    pub(super) fn op_neg(&mut self) -> OpResult {
        self.stack.apply_unary(|n| n.map(i32::wrapping_neg))
    }

    /// FLOOR[] (0x66)
    pub(super) fn op_floor(&mut self) -> OpResult {
        self.stack.apply_unary(|n| n.map(math::floor))
    }

    /// CEILING[] (0x67)
    pub(super) fn op_ceiling(&mut self) -> OpResult {
        self.stack.apply_unary(|n| n.map(math::ceil))
    }

    /// MAX[] (0x8B)
    pub(super) fn op_max(&mut self) -> OpResult {
        self.stack.apply_binary(binary(|a, b| Some(a.max(b))))
    }

    /// MIN[] (0x8C)
    pub(super) fn op_min(&mut self) -> OpResult {
        self.stack.apply_binary(binary(|a, b| Some(a.min(b))))
    }
}
