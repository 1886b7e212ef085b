//! Static analysis of TrueType hinting programs.
//!
//! This crate decodes the textual (ttx assembly) form of the `fpgm`, `prep`
//! and glyph hinting programs of a font, builds a control flow graph for each
//! program and function, and abstractly executes the programs to recover the
//! call graph, peak stack depth and graphics state. The functions that are
//! never reached can then be removed from the font program, which is useful
//! when subsetting.
//!
//! ```
//! use hint_analysis::{analyze, reduce, BytecodeContainer};
//!
//! let fpgm = "PUSHB[ ] 1 0 FDEF[ ] RTG[ ] ENDF[ ] FDEF[ ] ROFF[ ] ENDF[ ]";
//! let glyph = "PUSHB[ ] 1 CALL[ ]";
//! let mut container =
//!     BytecodeContainer::new([("fpgm", fpgm), ("glyf.a", glyph)], vec![]).unwrap();
//! let analysis = analyze(&mut container, None, Default::default()).unwrap();
//! let tables = reduce(&mut container, &analysis.called_functions());
//! assert_eq!(tables.fpgm, ["PUSH[ ]", "1", "FDEF[ ]", "ROFF[ ]", "ENDF[ ]"]);
//! ```

#![forbid(unsafe_code)]

mod analysis;
mod body;
mod call_stack;
mod container;
mod decode;
mod environment;
mod error;
mod executor;
mod graphics;
mod instruction;
mod math;
mod mnemonic;
mod reduce;
mod value_stack;

#[cfg(test)]
mod test_data;

pub use analysis::{analyze, Analysis, CallGraph};
pub use body::{Body, Branch, Edges};
pub use call_stack::{CallStack, DEFAULT_MAX_CALL_DEPTH};
pub use container::{
    BytecodeContainer, Function, FunctionTable, Program, ReducedTables, CONTROL_VALUE_PROGRAM,
    FONT_PROGRAM,
};
pub use decode::{decode_all, decode_program, decode_token, tokens, Decoder, Token};
pub use environment::Environment;
pub use error::{
    BuildError, BuildErrorKind, DecodeError, DecodeErrorKind, Error, ExecutionError,
    ExecutionErrorKind,
};
pub use executor::{BranchPolicy, Executor, ExecutorOptions, DEFAULT_MAX_INSTRUCTIONS};
pub use graphics::{Axis, GraphicsState, RoundMode, RoundState};
pub use instruction::{Data, Statement};
pub use mnemonic::{JumpKind, Mnemonic, StatementKind};
pub use reduce::reduce;
pub use value_stack::{Value, ValueStack};

/// Function number, as pushed before FDEF and CALL.
pub type Label = i32;
