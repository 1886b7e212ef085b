//! TrueType instruction mnemonics.
//!
//! The mnemonic names are those used by the ttx assembly form of hinting
//! programs. Suffix flags (the `[01101]` of `MDRP[01101]`) are not part of the
//! mnemonic; the decoder attaches them to the statement as raw operand text.
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/tt_instructions>

macro_rules! mnemonics {
    ($($name:ident),+ $(,)?) => {
        /// Closed set of TrueType instruction mnemonics.
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[allow(clippy::upper_case_acronyms)]
        pub enum Mnemonic {
            $($name,)+
        }

        impl Mnemonic {
            /// Every mnemonic, in table order.
            pub const ALL: &'static [Mnemonic] = &[$(Mnemonic::$name,)+];

            /// Looks up a mnemonic by its assembly name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($name) => Some(Self::$name),)+
                    _ => None,
                }
            }

            /// Returns the assembly name of the mnemonic.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)+
                }
            }
        }
    };
}

mnemonics! {
    // Graphics state: vectors
    SVTCA, SPVTCA, SFVTCA, SPVTL, SFVTL, SDPVTL, SPVFS, SFVFS, GPV, GFV, SFVTPV,
    // Graphics state: reference points, zones and loop
    SRP0, SRP1, SRP2, SZP0, SZP1, SZP2, SZPS, SLOOP,
    // Graphics state: rounding
    RTG, RTHG, RTDG, RDTG, RUTG, ROFF, SROUND, S45ROUND,
    // Graphics state: distances and controls
    SMD, SCVTCI, SSWCI, SSW, SDB, SDS, FLIPON, FLIPOFF, SCANCTRL, SCANTYPE,
    INSTCTRL, SANGW, AA,
    // Stack management
    DUP, POP, CLEAR, SWAP, DEPTH, CINDEX, MINDEX, ROLL,
    // Pushing data
    PUSH, PUSHB, PUSHW, NPUSHB, NPUSHW,
    // Storage and control value table
    WS, RS, WCVTP, WCVTF, RCVT,
    // Outline measurement and queries
    GC, SCFS, MD, MPPEM, MPS, GETINFO, GETVARIATION,
    // Point movement
    ISECT, ALIGNPTS, UTP, MDAP, IUP, SHP, SHC, SHZ, SHPIX, IP, MSIRP, ALIGNRP,
    MIAP, MDRP, MIRP, FLIPPT, FLIPRGON, FLIPRGOFF,
    DELTAP1, DELTAP2, DELTAP3, DELTAC1, DELTAC2, DELTAC3,
    // Arithmetic and logic
    LT, LTEQ, GT, GTEQ, EQ, NEQ, ODD, EVEN, AND, OR, NOT,
    ADD, SUB, DIV, MUL, ABS, NEG, FLOOR, CEILING, MAX, MIN, ROUND, NROUND,
    // Flow of control
    IF, ELSE, EIF, JMPR, JROT, JROF,
    // Definitions and calls
    FDEF, ENDF, IDEF, CALL, LOOPCALL,
    DEBUG,
}

/// Computed jumps that the structured control flow model cannot express.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum JumpKind {
    /// JMPR[]: unconditional relative jump.
    Relative,
    /// JROT[]: relative jump on true.
    OnTrue,
    /// JROF[]: relative jump on false.
    OnFalse,
}

/// Statement variants relevant to control flow and function extraction.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StatementKind {
    /// Any instruction with a single fall-through successor.
    Generic,
    If,
    Else,
    Eif,
    Fdef,
    Endf,
    /// One of the push forms; all operands are pushed values.
    Push,
    /// A computed jump.
    Jump(JumpKind),
}

impl Mnemonic {
    /// Classifies the mnemonic into its statement variant.
    pub fn kind(self) -> StatementKind {
        use Mnemonic::*;
        match self {
            IF => StatementKind::If,
            ELSE => StatementKind::Else,
            EIF => StatementKind::Eif,
            FDEF => StatementKind::Fdef,
            ENDF => StatementKind::Endf,
            PUSH | PUSHB | PUSHW | NPUSHB | NPUSHW => StatementKind::Push,
            JMPR => StatementKind::Jump(JumpKind::Relative),
            JROT => StatementKind::Jump(JumpKind::OnTrue),
            JROF => StatementKind::Jump(JumpKind::OnFalse),
            _ => StatementKind::Generic,
        }
    }

    /// Returns true for instructions that pop `loop` point numbers and reset
    /// the loop counter.
    pub fn uses_loop_counter(self) -> bool {
        use Mnemonic::*;
        matches!(self, SHP | SHPIX | IP | ALIGNRP | FLIPPT)
    }

    /// Returns `(pops, pushes)` for instructions whose only abstract effect
    /// is on the value stack.
    ///
    /// Outline measurements and point movement have no trackable effect
    /// beyond the operands they consume and the unknown results they produce.
    /// Returns `None` for every other instruction.
    pub fn stack_effect(self) -> Option<(usize, usize)> {
        use Mnemonic::*;
        Some(match self {
            MPPEM | MPS => (0, 1),
            GC | GETINFO | ROUND | NROUND => (1, 1),
            MD => (2, 1),
            UTP | SHC | SHZ | SANGW | AA | DEBUG => (1, 0),
            SCFS | ALIGNPTS | FLIPRGON | FLIPRGOFF => (2, 0),
            ISECT => (5, 0),
            IUP => (0, 0),
            _ => return None,
        })
    }
}

impl core::fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
