//! Managing the graphics state.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#managing-the-graphics-state>

use super::OpResult;
use crate::{
    environment::Environment,
    error::ExecutionErrorKind,
    graphics::{Axis, RoundMode},
    value_stack::Value,
    Mnemonic,
};

impl Environment<'_> {
    /// Set vectors to coordinate axis.
    ///
    /// SVTCA\[a\] (0x00 - 0x01), SPVTCA\[a\] (0x02 - 0x03) and
    /// SFVTCA\[a\] (0x04 - 0x05)
    ///
    /// Flag 1 selects the x-axis and 0 the y-axis.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-freedom-and-projection-vectors-to-coordinate-axis>
    pub(super) fn op_svtca(&mut self, mnemonic: Mnemonic, flags: u8) {
        let axis = if flags & 1 != 0 { Axis::X } else { Axis::Y };
        match mnemonic {
            Mnemonic::SPVTCA => self.graphics.set_proj_vector(axis),
            Mnemonic::SFVTCA => self.graphics.freedom_vector = axis,
            _ => self.graphics.set_vectors(axis),
        }
    }

    /// Set vectors to line.
    ///
    /// SPVTL\[a\] (0x06 - 0x07), SFVTL\[a\] (0x08 - 0x09) and
    /// SDPVTL\[a\] (0x86 - 0x87)
    ///
    /// Pops: p1, p2: point numbers
    ///
    /// Point positions are not tracked, so the resulting vector is only
    /// known to be custom.
    pub(super) fn op_svtl(&mut self, mnemonic: Mnemonic) -> OpResult {
        self.stack.discard(2)?;
        match mnemonic {
            Mnemonic::SFVTL => self.graphics.freedom_vector = Axis::Custom,
            Mnemonic::SDPVTL => self.graphics.set_proj_vector(Axis::Custom),
            _ => self.graphics.proj_vector = Axis::Custom,
        }
        Ok(())
    }

    /// Set projection vector from stack.
    ///
    /// SPVFS[] (0x0A)
    ///
    /// Pops: y, x: 2.14 components of the vector
    pub(super) fn op_spvfs(&mut self) -> OpResult {
        let y = self.stack.pop()?;
        let x = self.stack.pop()?;
        self.graphics.set_proj_vector(Axis::from_components(x, y));
        Ok(())
    }

    /// Set freedom vector from stack.
    ///
    /// SFVFS[] (0x0B)
    ///
    /// Pops: y, x: 2.14 components of the vector
    pub(super) fn op_sfvfs(&mut self) -> OpResult {
        let y = self.stack.pop()?;
        let x = self.stack.pop()?;
        self.graphics.freedom_vector = Axis::from_components(x, y);
        Ok(())
    }

    /// Get projection vector.
    ///
    /// GPV[] (0x0C)
    ///
    /// Pushes: x, y: 2.14 components of the vector
    pub(super) fn op_gpv(&mut self) {
        let [x, y] = self.graphics.proj_vector.components();
        self.stack.push(x);
        self.stack.push(y);
    }

    /// Get freedom vector.
    ///
    /// GFV[] (0x0D)
    ///
    /// Pushes: x, y: 2.14 components of the vector
    pub(super) fn op_gfv(&mut self) {
        let [x, y] = self.graphics.freedom_vector.components();
        self.stack.push(x);
        self.stack.push(y);
    }

    /// Set freedom vector to projection vector.
    ///
    /// SFVTPV[] (0x0E)
    pub(super) fn op_sfvtpv(&mut self) {
        self.graphics.freedom_vector = self.graphics.proj_vector;
    }

    /// Set zone pointers.
    ///
    /// SZP0[] (0x13), SZP1[] (0x14), SZP2[] (0x15) and SZPS[] (0x16)
    ///
    /// Pops: n: zone number
    ///
    /// Only the twilight zone (0) and the glyph zone (1) exist.
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-zone-pointer-0>
    pub(super) fn op_szp(&mut self, mnemonic: Mnemonic) -> OpResult {
        let zone = self.stack.pop()?;
        if let Some(n) = zone.known() {
            if !(0..=1).contains(&n) {
                return Err(ExecutionErrorKind::InvalidZoneIndex(n));
            }
        }
        let graphics = &mut self.graphics;
        match mnemonic {
            Mnemonic::SZP0 => graphics.zp0 = zone,
            Mnemonic::SZP1 => graphics.zp1 = zone,
            Mnemonic::SZP2 => graphics.zp2 = zone,
            _ => {
                graphics.zp0 = zone;
                graphics.zp1 = zone;
                graphics.zp2 = zone;
            }
        }
        Ok(())
    }

    /// Set loop variable.
    ///
    /// SLOOP[] (0x17)
    ///
    /// Pops: n: value for loop Graphics State variable (integer)
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#set-loop-variable>
    pub(super) fn op_sloop(&mut self) -> OpResult {
        let n = self.stack.pop()?;
        if n.known().is_some_and(|n| n < 0) {
            return Err(ExecutionErrorKind::NegativeLoopCounter);
        }
        // As in FreeType, heuristically limit the number of loops to 16 bits.
        self.graphics.loop_counter = n.map(|n| n.min(0xFFFF));
        Ok(())
    }

    /// Round to grid and friends.
    ///
    /// RTG[] (0x18), RTHG[] (0x19), RTDG[] (0x3D), RDTG[] (0x7D),
    /// RUTG[] (0x7C) and ROFF[] (0x7A)
    pub(super) fn op_round_mode(&mut self, mnemonic: Mnemonic) {
        self.graphics.round_state.mode = match mnemonic {
            Mnemonic::RTHG => RoundMode::HalfGrid,
            Mnemonic::RTDG => RoundMode::DoubleGrid,
            Mnemonic::RDTG => RoundMode::DownToGrid,
            Mnemonic::RUTG => RoundMode::UpToGrid,
            Mnemonic::ROFF => RoundMode::Off,
            _ => RoundMode::Grid,
        };
    }

    /// Super round.
    ///
    /// SROUND[] (0x76) and S45ROUND[] (0x77)
    ///
    /// Pops: n: number decomposed to obtain period, phase, threshold
    pub(super) fn op_sround(&mut self, mnemonic: Mnemonic) -> OpResult {
        let selector = self.stack.pop()?;
        self.graphics.round_state.mode = if mnemonic == Mnemonic::S45ROUND {
            RoundMode::Super45
        } else {
            RoundMode::Super
        };
        self.graphics.round_state.selector = selector;
        Ok(())
    }

    /// Set single width.
    ///
    /// SSW[] (0x1F)
    ///
    /// Pops: n: value for single width value (FUnit)
    ///
    /// The value is scaled to pixels, so it becomes unknown.
    pub(super) fn op_ssw(&mut self) -> OpResult {
        self.stack.pop()?;
        self.graphics.single_width = Value::Unknown;
        Ok(())
    }

    /// Instruction execution control.
    ///
    /// INSTCTRL[] (0x8E)
    ///
    /// Pops: s: selector flag (int32)
    ///       value: used to set value of instruction_control (uint16 padded)
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#instruction-execution-control>
    pub(super) fn op_instctrl(&mut self) -> OpResult {
        let selector = self.stack.pop()?;
        let value = self.stack.pop()?;
        let (Some(selector), Some(value)) = (selector.known(), value.known()) else {
            self.graphics.instruct_control = Value::Unknown;
            return Ok(());
        };
        // Selectors are indices starting with 1; not flags.
        if !(1..=3).contains(&selector) {
            return Ok(());
        }
        let flag = 1 << (selector - 1);
        if value != 0 && value != flag {
            return Ok(());
        }
        self.graphics.instruct_control = self
            .graphics
            .instruct_control
            .map(|control| (control & !flag) | value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::FunctionTable;

    #[test]
    fn vectors() {
        let functions = FunctionTable::default();
        let mut env = Environment::new(&functions, &[]);
        env.op_svtca(Mnemonic::SVTCA, 0);
        assert_eq!(env.graphics.freedom_vector, Axis::Y);
        assert_eq!(env.graphics.proj_vector, Axis::Y);
        env.op_svtca(Mnemonic::SFVTCA, 1);
        assert_eq!(env.graphics.freedom_vector, Axis::X);
        assert_eq!(env.graphics.proj_vector, Axis::Y);
        env.op_gpv();
        assert_eq!(env.stack.values(), [Value::Known(0), Value::Known(0x4000)]);
        env.op_spvfs().unwrap();
        assert_eq!(env.graphics.proj_vector, Axis::Y);
        env.stack.push_literals([1, 2]);
        env.op_svtl(Mnemonic::SDPVTL).unwrap();
        assert_eq!(env.graphics.dual_proj_vector, Axis::Custom);
        env.op_sfvtpv();
        assert_eq!(env.graphics.freedom_vector, Axis::Custom);
    }

    #[test]
    fn zones_and_loop() {
        let functions = FunctionTable::default();
        let mut env = Environment::new(&functions, &[]);
        env.stack.push(0);
        env.op_szp(Mnemonic::SZPS).unwrap();
        assert_eq!(env.graphics.zp2, Value::Known(0));
        env.stack.push(2);
        assert_eq!(
            env.op_szp(Mnemonic::SZP1),
            Err(ExecutionErrorKind::InvalidZoneIndex(2))
        );
        env.stack.push(-1);
        assert_eq!(env.op_sloop(), Err(ExecutionErrorKind::NegativeLoopCounter));
        env.stack.push(Value::Unknown);
        env.op_sloop().unwrap();
        assert_eq!(env.graphics.loop_counter, Value::Unknown);
    }

    #[test]
    fn instruct_control() {
        let functions = FunctionTable::default();
        let mut env = Environment::new(&functions, &[]);
        // value, selector
        env.stack.push_literals([2, 2]);
        env.op_instctrl().unwrap();
        assert_eq!(env.graphics.instruct_control, Value::Known(2));
        // mismatched value is ignored
        env.stack.push_literals([4, 1]);
        env.op_instctrl().unwrap();
        assert_eq!(env.graphics.instruct_control, Value::Known(2));
        env.stack.push_literals([0, 2]);
        env.op_instctrl().unwrap();
        assert_eq!(env.graphics.instruct_control, Value::Known(0));
    }
}
