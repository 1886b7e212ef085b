//! Control flow graphs over statement sequences.

use crate::{
    error::{BuildError, BuildErrorKind},
    instruction::Statement,
    StatementKind,
};

/// Successor and predecessor edges of a single statement.
///
/// Edges are indices into the statement list of the owning body.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Edges {
    pub successors: Vec<usize>,
    pub predecessors: Vec<usize>,
}

/// Structure of a resolved IF statement.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Branch {
    /// Index of the IF statement.
    pub if_ix: usize,
    /// Index of the ELSE statement, if present.
    pub else_ix: Option<usize>,
    /// Index of the EIF statement where both arms merge.
    pub eif_ix: usize,
}

/// An IF waiting for its ELSE or EIF during construction.
struct PendingIf {
    if_ix: usize,
    else_ix: Option<usize>,
}

/// Ordered statement sequence with control flow edges.
///
/// The entry point is the first statement. Every IF has exactly two
/// successors, `[then, else]`, where the else successor is the ELSE
/// statement when present and the EIF otherwise. The last statement of each
/// arm links to the EIF.
#[derive(Clone, Debug)]
pub struct Body {
    tag: String,
    statements: Vec<Statement>,
    edges: Vec<Edges>,
    // Sorted by IF index.
    branches: Vec<Branch>,
}

impl Body {
    /// Links the statements of the program with the given tag into a
    /// control flow graph.
    pub fn new(tag: &str, statements: Vec<Statement>) -> Result<Self, BuildError> {
        let mut edges = vec![Edges::default(); statements.len()];
        let mut branches = Vec::new();
        let mut pending: Vec<PendingIf> = Vec::new();
        let id = |ix: usize| Some(format!("{tag}.{}", statements[ix].index));
        for (ix, statement) in statements.iter().enumerate() {
            let kind = statement.kind();
            if let StatementKind::Jump(_) = kind {
                return Err(BuildError::new(
                    tag,
                    id(ix),
                    BuildErrorKind::UnsupportedControlTransfer(statement.mnemonic),
                ));
            }
            let falls_through = statements.get(ix + 1).is_some_and(|next| {
                !matches!(next.kind(), StatementKind::Else | StatementKind::Eif)
            });
            if falls_through {
                link(&mut edges, ix, ix + 1);
            }
            match kind {
                StatementKind::If => pending.push(PendingIf {
                    if_ix: ix,
                    else_ix: None,
                }),
                StatementKind::Else => {
                    let top = pending.last_mut().ok_or_else(|| {
                        BuildError::new(tag, id(ix), BuildErrorKind::UnmatchedElse)
                    })?;
                    if top.else_ix.is_some() {
                        return Err(BuildError::new(tag, id(ix), BuildErrorKind::DuplicateElse));
                    }
                    top.else_ix = Some(ix);
                }
                StatementKind::Eif => {
                    let PendingIf { if_ix, else_ix } = pending
                        .pop()
                        .ok_or_else(|| BuildError::new(tag, id(ix), BuildErrorKind::UnmatchedEif))?;
                    // The statement before the ELSE (or before this EIF when
                    // there is no ELSE) ends the THEN arm. If that is the IF
                    // itself the arm is empty and control goes straight to
                    // the merge point.
                    let then_tail = else_ix.unwrap_or(ix) - 1;
                    if then_tail == if_ix {
                        link(&mut edges, if_ix, ix);
                    } else {
                        link(&mut edges, then_tail, ix);
                    }
                    link(&mut edges, if_ix, else_ix.unwrap_or(ix));
                    if else_ix.is_some() {
                        link(&mut edges, ix - 1, ix);
                    }
                    branches.push(Branch {
                        if_ix,
                        else_ix,
                        eif_ix: ix,
                    });
                }
                _ => {}
            }
        }
        if let Some(unclosed) = pending.last() {
            return Err(BuildError::new(
                tag,
                id(unclosed.if_ix),
                BuildErrorKind::UnterminatedIf,
            ));
        }
        branches.sort_unstable_by_key(|branch| branch.if_ix);
        Ok(Self {
            tag: tag.into(),
            statements,
            edges,
            branches,
        })
    }

    /// Returns the tag of the program the statements were decoded from.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Returns the index of the entry statement.
    pub fn entry(&self) -> Option<usize> {
        (!self.statements.is_empty()).then_some(0)
    }

    pub fn successors(&self, ix: usize) -> &[usize] {
        self.edges
            .get(ix)
            .map(|edges| edges.successors.as_slice())
            .unwrap_or_default()
    }

    pub fn predecessors(&self, ix: usize) -> &[usize] {
        self.edges
            .get(ix)
            .map(|edges| edges.predecessors.as_slice())
            .unwrap_or_default()
    }

    /// Returns the branch structure for the IF statement at `if_ix`.
    pub fn branch(&self, if_ix: usize) -> Option<&Branch> {
        self.branches
            .binary_search_by_key(&if_ix, |branch| branch.if_ix)
            .ok()
            .map(|found| &self.branches[found])
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Returns the identifier of the statement at `ix`, in the form
    /// `<tag>.<index>`.
    pub fn statement_id(&self, ix: usize) -> String {
        match self.statements.get(ix) {
            Some(statement) => format!("{}.{}", self.tag, statement.index),
            None => format!("{}.?", self.tag),
        }
    }

    /// Returns true if `to` can be reached from `from` by following
    /// successor edges.
    pub fn reaches(&self, from: usize, to: usize) -> bool {
        let mut seen = vec![false; self.statements.len()];
        let mut stack = vec![from];
        while let Some(ix) = stack.pop() {
            if ix == to {
                return true;
            }
            if core::mem::replace(&mut seen[ix], true) {
                continue;
            }
            stack.extend_from_slice(self.successors(ix));
        }
        false
    }

    /// Appends the assembly form of all statements to `assembly`.
    pub fn write_assembly(&self, assembly: &mut Vec<String>) {
        for statement in &self.statements {
            statement.write_assembly(assembly);
        }
    }
}

fn link(edges: &mut [Edges], from: usize, to: usize) {
    edges[from].successors.push(to);
    let predecessors = &mut edges[to].predecessors;
    if !predecessors.contains(&from) {
        predecessors.push(from);
    }
}

/// Pretty printed dump of the statements, indented by IF nesting, with
/// successors listed wherever control does not simply fall through.
impl core::fmt::Display for Body {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut depth = 1usize;
        for (ix, statement) in self.statements.iter().enumerate() {
            let kind = statement.kind();
            if matches!(kind, StatementKind::Else | StatementKind::Eif) {
                depth = depth.saturating_sub(1).max(1);
            }
            write!(
                f,
                "{:indent$}{} {statement}",
                "",
                self.statement_id(ix),
                indent = depth * 3
            )?;
            let successors = self.successors(ix);
            if successors != [ix + 1] {
                let targets: Vec<_> = successors
                    .iter()
                    .map(|&target| self.statement_id(target))
                    .collect();
                if targets.is_empty() {
                    write!(f, " -> (end)")?;
                } else {
                    write!(f, " -> {}", targets.join(", "))?;
                }
            }
            writeln!(f)?;
            if matches!(kind, StatementKind::If | StatementKind::Else) {
                depth += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode::decode_program, test_data};
    use pretty_assertions::assert_eq;

    fn body(text: &str) -> Body {
        Body::new("prep", decode_program("prep", text).unwrap()).unwrap()
    }

    fn build_error(text: &str) -> BuildErrorKind {
        Body::new("prep", decode_program("prep", text).unwrap())
            .unwrap_err()
            .kind
    }

    #[test]
    fn straight_line() {
        let body = body("PUSHB[ ] 1 RTG[ ] POP[ ]");
        assert_eq!(body.successors(0), [1]);
        assert_eq!(body.successors(1), [2]);
        assert!(body.successors(2).is_empty());
        assert_eq!(body.predecessors(2), [1]);
        assert_eq!(body.entry(), Some(0));
    }

    #[test]
    fn if_without_else() {
        // 0: PUSHB 1, 1: IF, 2: RTG, 3: RTHG, 4: EIF, 5: ROFF
        let body = body(test_data::IF_WITHOUT_ELSE);
        assert_eq!(body.successors(1), [2, 4]);
        assert_eq!(body.successors(3), [4]);
        assert_eq!(body.successors(4), [5]);
        assert_eq!(body.predecessors(4), [3, 1]);
        assert_eq!(
            body.branch(1),
            Some(&Branch {
                if_ix: 1,
                else_ix: None,
                eif_ix: 4
            })
        );
    }

    #[test]
    fn if_with_else() {
        // 0: PUSHB 1, 1: IF, 2: RTG, 3: ELSE, 4: RTHG, 5: EIF, 6: ROFF
        let body = body(test_data::IF_WITH_ELSE);
        assert_eq!(body.successors(1), [2, 3]);
        assert_eq!(body.successors(2), [5]);
        assert_eq!(body.successors(3), [4]);
        assert_eq!(body.successors(4), [5]);
        assert_eq!(body.predecessors(3), [1]);
        assert!(body.reaches(2, 5));
        assert!(body.reaches(3, 5));
    }

    #[test]
    fn empty_arms() {
        let body = body("PUSHB[ ] 0 IF[ ] EIF[ ] RTG[ ]");
        // both arms go straight to the merge point
        assert_eq!(body.successors(1), [2, 2]);
        assert_eq!(body.predecessors(2), [1]);
        // 0: PUSHB, 1: IF, 2: RTG, 3: ELSE, 4: EIF, 5: RTHG
        let body = self::body("PUSHB[ ] 0 IF[ ] RTG[ ] ELSE[ ] EIF[ ] RTHG[ ]");
        assert_eq!(body.successors(1), [2, 3]);
        assert_eq!(body.successors(2), [4]);
        assert_eq!(body.successors(3), [4]);
        assert_eq!(body.successors(4), [5]);
    }

    #[test]
    fn nested_ifs() {
        let body = body(test_data::NESTED_IFS);
        assert_eq!(body.branches().len(), 2);
        for branch in body.branches() {
            let successors = body.successors(branch.if_ix);
            assert_eq!(successors.len(), 2);
            assert!(body.reaches(successors[0], branch.eif_ix));
            assert!(body.reaches(successors[1], branch.eif_ix));
        }
        // the inner EIF ends the outer THEN arm
        let outer = body.branch(1).unwrap();
        let inner = body.branch(4).unwrap();
        assert!(inner.eif_ix < outer.else_ix.unwrap());
        assert_eq!(body.successors(inner.eif_ix), [outer.eif_ix]);
    }

    #[test]
    fn structural_errors() {
        assert_eq!(build_error("ELSE[ ]"), BuildErrorKind::UnmatchedElse);
        assert_eq!(build_error("RTG[ ] EIF[ ]"), BuildErrorKind::UnmatchedEif);
        assert_eq!(
            build_error("PUSHB[ ] 1 IF[ ] RTG[ ]"),
            BuildErrorKind::UnterminatedIf
        );
        assert_eq!(
            build_error("PUSHB[ ] 1 IF[ ] ELSE[ ] ELSE[ ] EIF[ ]"),
            BuildErrorKind::DuplicateElse
        );
    }

    #[test]
    fn computed_jumps_are_rejected() {
        let err = Body::new(
            "glyf.a",
            decode_program("glyf.a", "PUSHB[ ] 4 1 JROT[ ] RTG[ ]").unwrap(),
        )
        .unwrap_err();
        assert_eq!(
            err.kind,
            BuildErrorKind::UnsupportedControlTransfer(crate::Mnemonic::JROT)
        );
        assert_eq!(err.statement.as_deref(), Some("glyf.a.1"));
    }

    #[test]
    fn dump() {
        let body = body(test_data::IF_WITH_ELSE);
        let expected = "   prep.0 PUSHB[ ] 1
   prep.1 IF[ ] -> prep.2, prep.3
      prep.2 RTG[ ] -> prep.5
   prep.3 ELSE[ ]
      prep.4 RTHG[ ]
   prep.5 EIF[ ]
   prep.6 ROFF[ ] -> (end)
";
        assert_eq!(body.to_string(), expected);
    }
}
