//! Dead function elimination.

use std::collections::BTreeSet;

use crate::{
    container::{BytecodeContainer, ReducedTables},
    Label,
};

/// Removes every function not in `used` and returns the regenerated tables.
///
/// `used` is normally [`Analysis::called_functions`](crate::Analysis::called_functions).
/// Reducing again with the same set leaves the container unchanged.
pub fn reduce(container: &mut BytecodeContainer, used: &BTreeSet<Label>) -> ReducedTables {
    let unused: BTreeSet<Label> = container
        .functions()
        .labels()
        .filter(|label| !used.contains(label))
        .collect();
    let removed = container.remove_functions(&unused);
    if removed.is_empty() {
        log::info!("all {} functions are in use", container.functions().len());
    } else {
        log::info!(
            "removed {} unused functions: {removed:?}, {} remain",
            removed.len(),
            container.functions().len()
        );
    }
    container.to_tables()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data;
    use pretty_assertions::assert_eq;

    fn container() -> BytecodeContainer {
        BytecodeContainer::new(
            [
                ("fpgm", test_data::FPGM),
                ("prep", test_data::PREP),
                ("glyf.a", test_data::GLYPH_A),
            ],
            test_data::CVT.to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn keeps_used_functions() {
        let mut container = container();
        let tables = reduce(&mut container, &BTreeSet::from([4, 5]));
        assert_eq!(container.functions().labels().collect::<Vec<_>>(), [4, 5]);
        assert_eq!(
            tables.fpgm,
            [
                "PUSH[ ]  /* 2 values pushed */",
                "5",
                "4",
                "FDEF[ ]",
                "PUSH[ ]",
                "0",
                "RCVT[ ]",
                "PUSH[ ]",
                "1",
                "SWAP[ ]",
                "WCVTP[ ]",
                "ENDF[ ]",
                "FDEF[ ]",
                "SVTCA[1]",
                "PUSH[ ]",
                "3",
                "SRP0[ ]",
                "ENDF[ ]",
            ]
        );
        assert_eq!(tables.cvt, test_data::CVT);
    }

    #[test]
    fn idempotent() {
        let used = BTreeSet::from([3]);
        let mut once = container();
        let first = reduce(&mut once, &used);
        let second = reduce(&mut once, &used);
        assert_eq!(first, second);
        assert_eq!(first.fpgm[0], "PUSH[ ]");
    }

    #[test]
    fn empty_table_emits_no_text() {
        let mut container = container();
        let tables = reduce(&mut container, &BTreeSet::new());
        assert!(container.functions().is_empty());
        assert!(tables.fpgm.is_empty());
        assert_eq!(tables.cvt.len(), 3);
    }
}
