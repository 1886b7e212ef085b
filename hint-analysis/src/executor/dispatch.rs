//! Statement dispatch.

use super::{Executor, Flow};
use crate::{
    environment::Environment, error::ExecutionErrorKind, instruction::Statement, Mnemonic,
};

impl<'a> Executor<'a> {
    /// Applies the abstract semantics of `statement` to `env`.
    pub(super) fn dispatch(
        &mut self,
        statement: &Statement,
        env: &mut Environment<'a>,
    ) -> Result<Flow, ExecutionErrorKind> {
        use Mnemonic::*;
        let mnemonic = statement.mnemonic;
        let flags = statement.flags();
        match mnemonic {
            // Control flow and calls
            IF => return env.op_if(),
            ELSE | EIF => {}
            JMPR | JROT | JROF => {
                return Err(ExecutionErrorKind::UnsupportedControlTransfer(mnemonic))
            }
            CALL => return env.op_call(),
            LOOPCALL => return env.op_loopcall(),
            FDEF | ENDF | IDEF => return Err(ExecutionErrorKind::DefinitionInProgram(mnemonic)),
            // Stack
            PUSH | PUSHB | PUSHW | NPUSHB | NPUSHW => env.op_push(statement),
            DUP => env.stack.dup()?,
            POP => {
                env.stack.pop()?;
            }
            CLEAR => env.stack.clear(),
            SWAP => env.stack.swap()?,
            DEPTH => env.op_depth(),
            CINDEX => env.stack.copy_index()?,
            MINDEX => env.stack.move_index()?,
            ROLL => env.stack.roll()?,
            // Arithmetic and logic
            LT => env.op_lt()?,
            LTEQ => env.op_lteq()?,
            GT => env.op_gt()?,
            GTEQ => env.op_gteq()?,
            EQ => env.op_eq()?,
            NEQ => env.op_neq()?,
            ODD => env.op_odd()?,
            EVEN => env.op_even()?,
            AND => env.op_and()?,
            OR => env.op_or()?,
            NOT => env.op_not()?,
            ADD => env.op_add()?,
            SUB => env.op_sub()?,
            DIV => env.op_div()?,
            MUL => env.op_mul()?,
            ABS => env.op_abs()?,
            NEG => env.op_neg()?,
            FLOOR => env.op_floor()?,
            CEILING => env.op_ceiling()?,
            MAX => env.op_max()?,
            MIN => env.op_min()?,
            // Storage and control value table
            RS => env.op_rs()?,
            WS => env.op_ws()?,
            RCVT => env.op_rcvt()?,
            WCVTP => env.op_wcvtp()?,
            WCVTF => env.op_wcvtf()?,
            // Graphics state
            SVTCA | SPVTCA | SFVTCA => env.op_svtca(mnemonic, flags),
            SPVTL | SFVTL | SDPVTL => env.op_svtl(mnemonic)?,
            SPVFS => env.op_spvfs()?,
            SFVFS => env.op_sfvfs()?,
            GPV => env.op_gpv(),
            GFV => env.op_gfv(),
            SFVTPV => env.op_sfvtpv(),
            SRP0 => env.graphics.rp0 = env.stack.pop()?,
            SRP1 => env.graphics.rp1 = env.stack.pop()?,
            SRP2 => env.graphics.rp2 = env.stack.pop()?,
            SZP0 | SZP1 | SZP2 | SZPS => env.op_szp(mnemonic)?,
            SLOOP => env.op_sloop()?,
            RTG | RTHG | RTDG | RDTG | RUTG | ROFF => env.op_round_mode(mnemonic),
            SROUND | S45ROUND => env.op_sround(mnemonic)?,
            SMD => env.graphics.min_distance = env.stack.pop()?,
            SCVTCI => env.graphics.control_value_cutin = env.stack.pop()?,
            SSWCI => env.graphics.single_width_cutin = env.stack.pop()?,
            SSW => env.op_ssw()?,
            SDB => env.graphics.delta_base = env.stack.pop()?,
            SDS => env.graphics.delta_shift = env.stack.pop()?,
            FLIPON => env.graphics.auto_flip = true,
            FLIPOFF => env.graphics.auto_flip = false,
            SCANCTRL => env.graphics.scan_control = env.stack.pop()?,
            SCANTYPE => env.graphics.scan_type = env.stack.pop()?,
            INSTCTRL => env.op_instctrl()?,
            // Point movement
            MDAP => env.op_mdap()?,
            MIAP => env.op_miap()?,
            MDRP => env.op_mdrp(flags)?,
            MIRP => env.op_mirp(flags)?,
            MSIRP => env.op_msirp(flags)?,
            SHP | SHPIX | IP | ALIGNRP | FLIPPT => env.op_loop_points(mnemonic)?,
            DELTAP1 | DELTAP2 | DELTAP3 | DELTAC1 | DELTAC2 | DELTAC3 => {
                env.op_delta(mnemonic)?
            }
            GETVARIATION => env.op_getvariation(self.options.axis_count),
            _ => match mnemonic.stack_effect() {
                Some((pops, pushes)) => env.op_opaque(pops, pushes)?,
                None => log::warn!("{mnemonic} has no abstract semantics"),
            },
        }
        Ok(Flow::Next)
    }
}
