//! Moving points.
//!
//! Outline coordinates are not modeled. These instructions consume their
//! operands and update the reference points and the loop counter.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#moving-points>

use super::OpResult;
use crate::{
    environment::Environment, error::ExecutionErrorKind, value_stack::Value, Mnemonic,
};

impl Environment<'_> {
    /// Move direct absolute point.
    ///
    /// MDAP\[a\] (0x2E - 0x2F)
    ///
    /// Pops: p: point number
    ///
    /// Sets rp0 and rp1 to p.
    pub(super) fn op_mdap(&mut self) -> OpResult {
        let p = self.stack.pop()?;
        self.graphics.rp0 = p;
        self.graphics.rp1 = p;
        Ok(())
    }

    /// Move indirect absolute point.
    ///
    /// MIAP\[a\] (0x3E - 0x3F)
    ///
    /// Pops: n: CVT entry number
    ///       p: point number
    ///
    /// Sets rp0 and rp1 to p.
    pub(super) fn op_miap(&mut self) -> OpResult {
        let n = self.stack.pop()?;
        let p = self.stack.pop()?;
        self.read_cvt(n)?;
        self.graphics.rp0 = p;
        self.graphics.rp1 = p;
        Ok(())
    }

    /// Move direct relative point.
    ///
    /// MDRP\[abcde\] (0xC0 - 0xDF)
    ///
    /// Pops: p: point number
    ///
    /// Sets rp1 to rp0 and rp2 to p. Flag `a` also sets rp0 to p.
    pub(super) fn op_mdrp(&mut self, flags: u8) -> OpResult {
        let p = self.stack.pop()?;
        self.move_relative(p, flags & 0x10 != 0);
        Ok(())
    }

    /// Move indirect relative point.
    ///
    /// MIRP\[abcde\] (0xE0 - 0xFF)
    ///
    /// Pops: n: CVT entry number
    ///       p: point number
    pub(super) fn op_mirp(&mut self, flags: u8) -> OpResult {
        let n = self.stack.pop()?;
        let p = self.stack.pop()?;
        self.read_cvt(n)?;
        self.move_relative(p, flags & 0x10 != 0);
        Ok(())
    }

    /// Move stack indirect relative point.
    ///
    /// MSIRP\[a\] (0x3A - 0x3B)
    ///
    /// Pops: d: distance (F26Dot6)
    ///       p: point number
    pub(super) fn op_msirp(&mut self, flags: u8) -> OpResult {
        self.stack.pop()?;
        let p = self.stack.pop()?;
        self.move_relative(p, flags & 1 != 0);
        Ok(())
    }

    fn move_relative(&mut self, p: Value, set_rp0: bool) {
        self.graphics.rp1 = self.graphics.rp0;
        self.graphics.rp2 = p;
        if set_rp0 {
            self.graphics.rp0 = p;
        }
    }

    /// SHP\[a\], SHPIX[], IP[], ALIGNRP[] and FLIPPT[]
    ///
    /// Pops: p1, p2, ... ploop: point numbers
    ///
    /// SHPIX additionally pops the shift distance first. The loop counter
    /// is reset to 1 afterwards.
    pub(super) fn op_loop_points(&mut self, mnemonic: Mnemonic) -> OpResult {
        if mnemonic == Mnemonic::SHPIX {
            self.stack.pop()?;
        }
        let count = self
            .graphics
            .loop_counter
            .known()
            .ok_or(ExecutionErrorKind::UnresolvedOperand(mnemonic))?;
        self.stack.discard(count.max(0) as usize)?;
        self.graphics.loop_counter = Value::Known(1);
        Ok(())
    }

    /// Delta exceptions.
    ///
    /// DELTAP1[] (0x5D), DELTAP2[] (0x71), DELTAP3[] (0x72),
    /// DELTAC1[] (0x73), DELTAC2[] (0x74) and DELTAC3[] (0x75)
    ///
    /// Pops: n: number of pairs of exception specifications
    ///       followed by n pairs of arguments
    ///
    /// See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#delta-exception-p1>
    pub(super) fn op_delta(&mut self, mnemonic: Mnemonic) -> OpResult {
        let n = self
            .stack
            .pop()?
            .known()
            .ok_or(ExecutionErrorKind::UnresolvedOperand(mnemonic))?;
        self.stack.discard(n.max(0) as usize * 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::FunctionTable;

    #[test]
    fn reference_points() {
        let functions = FunctionTable::default();
        let mut env = Environment::new(&functions, &[0]);
        env.stack.push(7);
        env.op_mdap().unwrap();
        // MDRP[00100] leaves rp0 alone
        env.stack.push(9);
        env.op_mdrp(0b00100).unwrap();
        assert_eq!(
            [env.graphics.rp0, env.graphics.rp1, env.graphics.rp2],
            [Value::Known(7), Value::Known(7), Value::Known(9)]
        );
        // MIRP[10100] moves rp0 to the point
        env.stack.push_literals([11, 0]);
        env.op_mirp(0b10100).unwrap();
        assert_eq!(
            [env.graphics.rp0, env.graphics.rp1, env.graphics.rp2],
            [Value::Known(11), Value::Known(7), Value::Known(11)]
        );
        env.stack.push_literals([1, 1]);
        assert_eq!(env.op_miap(), Err(ExecutionErrorKind::InvalidCvtIndex(1)));
    }

    #[test]
    fn loop_and_delta() {
        let functions = FunctionTable::default();
        let mut env = Environment::new(&functions, &[]);
        env.graphics.loop_counter = Value::Known(3);
        env.stack.push_literals([1, 2, 3, 4, 64]);
        env.op_loop_points(Mnemonic::SHPIX).unwrap();
        assert_eq!(env.stack.values(), [Value::Known(1)]);
        assert_eq!(env.graphics.loop_counter, Value::Known(1));
        env.stack.push_literals([5, 6, 7, 8, 2]);
        env.op_delta(Mnemonic::DELTAP1).unwrap();
        assert_eq!(env.stack.values(), [Value::Known(1)]);
        env.stack.push(Value::Unknown);
        assert_eq!(
            env.op_delta(Mnemonic::DELTAC2),
            Err(ExecutionErrorKind::UnresolvedOperand(Mnemonic::DELTAC2))
        );
    }
}
