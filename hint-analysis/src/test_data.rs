//! Hinting programs shared by tests.

/// Push, graphics state and call instructions in ttx assembly.
pub const PUSH_AND_CALL: &str = "\
NPUSHB[ ]  /* 3 values pushed */
1 2 3
SVTCA[1]  /* SetFPVectorToAxis */
PUSHB[ ]  /* 1 value pushed */
5
CALL[ ]  /* CallFunction */
MDRP[01101]  /* MoveDirectRelPt */
";

/// 0: PUSHB, 1: IF, 2: RTG, 3: RTHG, 4: EIF, 5: ROFF
pub const IF_WITHOUT_ELSE: &str = "\
PUSHB[ ]
1
IF[ ]
RTG[ ]
RTHG[ ]
EIF[ ]
ROFF[ ]
";

/// 0: PUSHB, 1: IF, 2: RTG, 3: ELSE, 4: RTHG, 5: EIF, 6: ROFF
pub const IF_WITH_ELSE: &str = "\
PUSHB[ ]
1
IF[ ]
RTG[ ]
ELSE[ ]
RTHG[ ]
EIF[ ]
ROFF[ ]
";

/// 0: PUSHB, 1: IF, 2: PUSHB, 3: RTG, 4: IF, 5: RTHG, 6: EIF, 7: ELSE,
/// 8: ROFF, 9: EIF
pub const NESTED_IFS: &str = "\
PUSHB[ ]
1
IF[ ]
PUSHB[ ]
0
RTG[ ]
IF[ ]
RTHG[ ]
EIF[ ]
ELSE[ ]
ROFF[ ]
EIF[ ]
";

/// Defines functions 3, 4 and 5.
///
/// Function 3 sets the minimum distance, function 4 copies cvt[0] into
/// cvt[1] and function 5 sets the x axis and the first reference point.
pub const FPGM: &str = "\
PUSHB[ ]  /* 3 values pushed */
5 4 3
FDEF[ ]
PUSHB[ ]
96
SMD[ ]
ENDF[ ]
FDEF[ ]
PUSHB[ ]
0
RCVT[ ]
PUSHB[ ]
1
SWAP[ ]
WCVTP[ ]
ENDF[ ]
FDEF[ ]
SVTCA[1]
PUSHB[ ]
3
SRP0[ ]
ENDF[ ]
";

/// Calls function 4.
pub const PREP: &str = "\
NPUSHB[ ]  /* 4 values pushed */
10 20 30 4
CALL[ ]
CLEAR[ ]
";

/// Calls function 5.
pub const GLYPH_A: &str = "\
PUSHB[ ]
5
CALL[ ]
";

/// No calls.
pub const GLYPH_B: &str = "\
SVTCA[0]
PUSHB[ ]
2
SRP1[ ]
";

pub const CVT: &[i32] = &[64, 128, 256];
