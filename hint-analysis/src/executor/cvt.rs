//! Managing the storage area and the control value table.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#managing-the-storage-area>
//! and <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions#managing-the-control-value-table>

use super::OpResult;
use crate::{environment::Environment, value_stack::Value};

impl Environment<'_> {
    /// Read store.
    ///
    /// RS[] (0x43)
    ///
    /// Pops: location: Storage Area location
    /// Pushes: value: Storage Area value
    pub(super) fn op_rs(&mut self) -> OpResult {
        let location = self.stack.pop()?;
        let value = self.read_storage(location)?;
        self.stack.push(value);
        Ok(())
    }

    /// Write store.
    ///
    /// WS[] (0x42)
    ///
    /// Pops: value: Storage Area value,
    ///       location: Storage Area location
    pub(super) fn op_ws(&mut self) -> OpResult {
        let value = self.stack.pop()?;
        let location = self.stack.pop()?;
        self.write_storage(location, value)
    }

    /// Read control value table.
    ///
    /// RCVT[] (0x45)
    ///
    /// Pops: location: CVT entry number
    /// Pushes: value: CVT value (F26Dot6)
    pub(super) fn op_rcvt(&mut self) -> OpResult {
        let location = self.stack.pop()?;
        let value = self.read_cvt(location)?;
        self.stack.push(value);
        Ok(())
    }

    /// Write control value table in pixel units.
    ///
    /// WCVTP[] (0x44)
    ///
    /// Pops: value: number in pixels (F26Dot6 fixed point number),
    ///       location: Control Value Table location (uint32)
    pub(super) fn op_wcvtp(&mut self) -> OpResult {
        let value = self.stack.pop()?;
        let location = self.stack.pop()?;
        self.write_cvt(location, value)
    }

    /// Write control value table in font units.
    ///
    /// WCVTF[] (0x70)
    ///
    /// Pops: value: number in FUnits,
    ///       location: Control Value Table location (uint32)
    ///
    /// The value is scaled to pixels before it is stored and the scale is
    /// not known, so the entry becomes unknown.
    pub(super) fn op_wcvtf(&mut self) -> OpResult {
        self.stack.pop()?;
        let location = self.stack.pop()?;
        self.write_cvt(location, Value::Unknown)
    }
}
