//! Error definitions.

use thiserror::Error;

use crate::{Label, Mnemonic};

/// Errors that may occur when decoding instruction text.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum DecodeErrorKind {
    #[error("data token {0:?} precedes the first instruction")]
    LeadingData(String),
    #[error("unrecognized mnemonic {0:?}")]
    UnknownMnemonic(String),
}

/// Decoding error with the location of the offending token.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DecodeError {
    /// Tag of the program being decoded.
    pub tag: String,
    /// Zero based position of the token in the program text.
    pub token: usize,
    pub kind: DecodeErrorKind,
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} token {}: {}", self.tag, self.token, self.kind)
    }
}

impl std::error::Error for DecodeError {}

/// Errors that may occur when building control flow graphs and the function
/// table.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum BuildErrorKind {
    #[error("unsupported control transfer {0}")]
    UnsupportedControlTransfer(Mnemonic),
    #[error("ELSE without a matching IF")]
    UnmatchedElse,
    #[error("EIF without a matching IF")]
    UnmatchedEif,
    #[error("second ELSE for the same IF")]
    DuplicateElse,
    #[error("IF is never closed by EIF")]
    UnterminatedIf,
    #[error("nested function definition")]
    NestedDefinition,
    #[error("ENDF outside of a function definition")]
    UnmatchedEndf,
    #[error("no pushed label left for function definition")]
    MissingFunctionLabel,
    #[error("function definition is never closed by ENDF")]
    UnterminatedDefinition,
    #[error("instruction definitions are not supported")]
    InstructionDefinition,
}

/// Build error with additional context.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BuildError {
    /// Tag of the program containing the error.
    pub tag: String,
    /// Label of the function containing the error, if any.
    pub function: Option<Label>,
    /// Identifier of the offending statement, if any.
    pub statement: Option<String>,
    pub kind: BuildErrorKind,
}

impl BuildError {
    pub(crate) fn new(tag: &str, statement: Option<String>, kind: BuildErrorKind) -> Self {
        Self {
            tag: tag.into(),
            function: None,
            statement,
            kind,
        }
    }
}

impl core::fmt::Display for BuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.tag)?;
        if let Some(label) = self.function {
            write!(f, "[function {label}]")?;
        }
        if let Some(statement) = &self.statement {
            write!(f, "@{statement}")?;
        }
        write!(f, ": {}", self.kind)
    }
}

impl std::error::Error for BuildError {}

/// Errors that may occur during abstract execution.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum ExecutionErrorKind {
    #[error("no program with tag {0:?}")]
    UnknownProgram(String),
    #[error("call to undefined function {0}")]
    UndefinedFunction(Label),
    #[error("call target could not be resolved to a label")]
    UnresolvedCallTarget,
    #[error("recursive call chain {}", format_chain(.0))]
    RecursiveCall(Vec<Label>),
    #[error("call stack overflow in chain {}", format_chain(.0))]
    CallStackOverflow(Vec<Label>),
    #[error("too many instructions executed")]
    ExceededExecutionBudget,
    #[error("value stack underflow")]
    ValueStackUnderflow,
    #[error("operand of {0} could not be resolved")]
    UnresolvedOperand(Mnemonic),
    #[error("cvt index {0} was out of bounds")]
    InvalidCvtIndex(i32),
    #[error("storage area index {0} was invalid")]
    InvalidStorageIndex(i32),
    #[error("zone index {0} was invalid (only 0 or 1 are permitted)")]
    InvalidZoneIndex(i32),
    #[error("attempt to set the loop counter to a negative value")]
    NegativeLoopCounter,
    #[error("{0} is not permitted outside of the font program")]
    DefinitionInProgram(Mnemonic),
    #[error("unsupported control transfer {0}")]
    UnsupportedControlTransfer(Mnemonic),
}

fn format_chain(labels: &[Label]) -> String {
    labels
        .iter()
        .map(|label| label.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Execution error with additional context.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExecutionError {
    /// Tag of the program being executed.
    pub program: String,
    /// Label of the function executing when the error occurred, if any.
    pub function: Option<Label>,
    /// Identifier of the offending statement, if any.
    pub statement: Option<String>,
    pub kind: ExecutionErrorKind,
}

impl core::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.program)?;
        if let Some(label) = self.function {
            write!(f, "[function {label}]")?;
        }
        if let Some(statement) = &self.statement {
            write!(f, "@{statement}")?;
        }
        write!(f, ": {}", self.kind)
    }
}

impl std::error::Error for ExecutionError {}

/// Any error produced by this crate.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("cvt position {0} is outside of the table")]
    InvalidCvtPosition(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_error_context() {
        let err = ExecutionError {
            program: "glyf.a".into(),
            function: Some(12),
            statement: Some("fpgm.40".into()),
            kind: ExecutionErrorKind::RecursiveCall(vec![3, 12, 3]),
        };
        assert_eq!(
            err.to_string(),
            "glyf.a[function 12]@fpgm.40: recursive call chain 3 -> 12 -> 3"
        );
    }

    #[test]
    fn build_error_context() {
        let err = BuildError::new("prep", Some("prep.7".into()), BuildErrorKind::UnmatchedEif);
        assert_eq!(err.to_string(), "prep@prep.7: EIF without a matching IF");
        let err: Error = err.into();
        assert!(matches!(err, Error::Build(_)));
    }
}
