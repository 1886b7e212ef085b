//! Decoded representation of a hinting statement.

use crate::{Mnemonic, StatementKind};

/// One operand value attached to a statement.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Data {
    /// Integer literal, as found in the values following a push.
    Int(i32),
    /// Raw numeral text, as found between the brackets of an instruction
    /// such as `MDRP[01101]`.
    Text(String),
}

impl Data {
    /// Returns the integer reading of the operand.
    ///
    /// Raw text is read as a decimal number, so the flag bits `01101` read
    /// as 1101.
    pub fn value(&self) -> Option<i32> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(text) => text.parse().ok(),
        }
    }
}

impl core::fmt::Display for Data {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Decoded hinting statement.
///
/// Control flow edges are not stored here; they belong to the owning
/// [`Body`](crate::Body).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Statement {
    /// Instruction mnemonic.
    pub mnemonic: Mnemonic,
    /// Operands in source order. Bracketed flag digits come first, followed
    /// by any trailing data tokens.
    pub data: Vec<Data>,
    /// Sequential position of the statement in its source program.
    pub index: usize,
}

impl Statement {
    pub fn new(mnemonic: Mnemonic, index: usize) -> Self {
        Self {
            mnemonic,
            data: Vec::new(),
            index,
        }
    }

    /// Returns the statement variant.
    pub fn kind(&self) -> StatementKind {
        self.mnemonic.kind()
    }

    /// Returns the flag bits of an instruction like `MIRP[10100]`, read as
    /// a binary number.
    ///
    /// Returns 0 when the statement carries no bracketed operand.
    pub fn flags(&self) -> u8 {
        match self.data.first() {
            Some(Data::Text(bits)) => bits
                .bytes()
                .fold(0u8, |acc, bit| (acc << 1) | (bit == b'1') as u8),
            _ => 0,
        }
    }

    /// Returns the integer values of all operands.
    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        self.data.iter().filter_map(Data::value)
    }

    /// Appends the assembly form of this statement to `assembly`.
    ///
    /// Push forms are written as a generic `PUSH[ ]` followed by one line
    /// per value, leaving the choice of encoding to the assembler.
    pub fn write_assembly(&self, assembly: &mut Vec<String>) {
        if self.kind() == StatementKind::Push {
            assembly.push(push_header(self.data.len()));
            assembly.extend(self.data.iter().map(|data| data.to_string()));
        } else if self.data.is_empty() {
            assembly.push(format!("{}[ ]", self.mnemonic));
        } else {
            let operands: String = self.data.iter().map(|data| data.to_string()).collect();
            assembly.push(format!("{}[{operands}]", self.mnemonic));
        }
    }
}

/// Returns the `PUSH[ ]` line for a push of `count` values.
pub(crate) fn push_header(count: usize) -> String {
    if count > 1 {
        format!("PUSH[ ]  /* {count} values pushed */")
    } else {
        "PUSH[ ]".into()
    }
}

impl core::fmt::Display for Statement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut data = self.data.iter().peekable();
        match data.peek() {
            Some(Data::Text(bits)) => {
                write!(f, "{}[{bits}]", self.mnemonic)?;
                data.next();
            }
            _ => write!(f, "{}[ ]", self.mnemonic)?,
        }
        for value in data {
            write!(f, " {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_bits() {
        let mut mirp = Statement::new(Mnemonic::MIRP, 0);
        mirp.data.push(Data::Text("10100".into()));
        assert_eq!(mirp.flags(), 0b10100);
        assert_eq!(Statement::new(Mnemonic::IUP, 0).flags(), 0);
    }

    #[test]
    fn assembly_forms() {
        let mut assembly = vec![];
        let mut push = Statement::new(Mnemonic::NPUSHB, 0);
        push.data.extend([Data::Int(1), Data::Int(-2)]);
        push.write_assembly(&mut assembly);
        let mut svtca = Statement::new(Mnemonic::SVTCA, 1);
        svtca.data.push(Data::Text("0".into()));
        svtca.write_assembly(&mut assembly);
        Statement::new(Mnemonic::CALL, 2).write_assembly(&mut assembly);
        assert_eq!(
            assembly,
            ["PUSH[ ]  /* 2 values pushed */", "1", "-2", "SVTCA[0]", "CALL[ ]"]
        );
        assert_eq!(push.to_string(), "NPUSHB[ ] 1 -2");
        assert_eq!(svtca.to_string(), "SVTCA[0]");
    }
}
