//! State carried through abstract execution.

use std::collections::BTreeMap;

use crate::{
    container::FunctionTable,
    error::ExecutionErrorKind,
    graphics::GraphicsState,
    value_stack::{Value, ValueStack},
};

/// Abstract interpreter state.
///
/// One environment flows through the control value program; each glyph
/// program then runs against its own clone so that glyphs never observe
/// each other's writes.
#[derive(Clone, Debug)]
pub struct Environment<'a> {
    pub stack: ValueStack,
    pub graphics: GraphicsState,
    cvt: Vec<Value>,
    storage: BTreeMap<usize, Value>,
    /// Value of storage locations that were never written.
    unwritten: Value,
    functions: &'a FunctionTable,
}

impl<'a> Environment<'a> {
    /// Creates an environment with an empty stack, default graphics state
    /// and a snapshot of the given control values.
    pub fn new(functions: &'a FunctionTable, cvt: &[i32]) -> Self {
        Self {
            stack: ValueStack::default(),
            graphics: GraphicsState::default(),
            cvt: cvt.iter().copied().map(Value::Known).collect(),
            storage: BTreeMap::new(),
            unwritten: Value::Known(0),
            functions,
        }
    }

    /// Returns the function table that calls resolve against.
    pub fn functions(&self) -> &'a FunctionTable {
        self.functions
    }

    pub fn cvt(&self) -> &[Value] {
        &self.cvt
    }

    /// Reads the control value at `index`.
    pub fn read_cvt(&self, index: Value) -> Result<Value, ExecutionErrorKind> {
        match index.known() {
            Some(index) => self.cvt_slot(index).map(|ix| self.cvt[ix]),
            None => Ok(Value::Unknown),
        }
    }

    /// Writes the control value at `index`.
    ///
    /// A write through an unknown index could land anywhere, so every entry
    /// becomes unknown.
    pub fn write_cvt(&mut self, index: Value, value: Value) -> Result<(), ExecutionErrorKind> {
        match index.known() {
            Some(index) => {
                let ix = self.cvt_slot(index)?;
                self.cvt[ix] = value;
            }
            None => {
                log::warn!("cvt write through an unknown index");
                self.cvt.fill(Value::Unknown);
            }
        }
        Ok(())
    }

    /// Reads the storage area at `index`.
    ///
    /// Locations that were never written read as zero until a write through
    /// an unknown index, after which they read as unknown.
    pub fn read_storage(&self, index: Value) -> Result<Value, ExecutionErrorKind> {
        match index.known() {
            Some(index) => {
                let ix = storage_slot(index)?;
                Ok(self.storage.get(&ix).copied().unwrap_or(self.unwritten))
            }
            None => Ok(Value::Unknown),
        }
    }

    /// Writes the storage area at `index`.
    ///
    /// As with the cvt, a write through an unknown index invalidates every
    /// location, written or not.
    pub fn write_storage(
        &mut self,
        index: Value,
        value: Value,
    ) -> Result<(), ExecutionErrorKind> {
        match index.known() {
            Some(index) => {
                self.storage.insert(storage_slot(index)?, value);
            }
            None => {
                log::warn!("storage write through an unknown index");
                self.storage.values_mut().for_each(|v| *v = Value::Unknown);
                self.unwritten = Value::Unknown;
            }
        }
        Ok(())
    }

    /// Returns the written storage locations in index order.
    pub fn storage(&self) -> impl Iterator<Item = (usize, Value)> + '_ {
        self.storage.iter().map(|(ix, value)| (*ix, *value))
    }

    fn cvt_slot(&self, index: i32) -> Result<usize, ExecutionErrorKind> {
        usize::try_from(index)
            .ok()
            .filter(|ix| *ix < self.cvt.len())
            .ok_or(ExecutionErrorKind::InvalidCvtIndex(index))
    }
}

fn storage_slot(index: i32) -> Result<usize, ExecutionErrorKind> {
    usize::try_from(index).map_err(|_| ExecutionErrorKind::InvalidStorageIndex(index))
}

impl core::fmt::Display for Environment<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{}", self.graphics)?;
        write!(f, "stack ({}):", self.stack.len())?;
        for value in self.stack.values() {
            write!(f, " {value}")?;
        }
        writeln!(f)?;
        write!(f, "cvt:")?;
        for (ix, value) in self.cvt.iter().enumerate() {
            write!(f, " {ix}={value}")?;
        }
        writeln!(f)?;
        write!(f, "storage:")?;
        for (ix, value) in &self.storage {
            write!(f, " {ix}={value}")?;
        }
        Ok(())
    }
}
