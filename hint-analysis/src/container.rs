//! Programs, functions and the control value table of a font.

use std::collections::{BTreeMap, BTreeSet};

use fnv::FnvHashMap;

use crate::{
    body::Body,
    decode::decode_program,
    error::{BuildError, BuildErrorKind, Error},
    instruction::{push_header, Statement},
    Label, Mnemonic, StatementKind,
};

/// Tag of the font program that holds function definitions.
pub const FONT_PROGRAM: &str = "fpgm";

/// Tag of the control value program.
pub const CONTROL_VALUE_PROGRAM: &str = "prep";

/// A compiled hinting program, such as `prep` or `glyf.<name>`.
#[derive(Clone, Debug)]
pub struct Program {
    body: Body,
    called_functions: BTreeSet<Label>,
}

impl Program {
    pub fn new(tag: &str, statements: Vec<Statement>) -> Result<Self, BuildError> {
        Ok(Self {
            body: Body::new(tag, statements)?,
            called_functions: BTreeSet::new(),
        })
    }

    pub fn tag(&self) -> &str {
        self.body.tag()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Returns the labels of all functions this program (transitively)
    /// called during its last analysis.
    pub fn called_functions(&self) -> &BTreeSet<Label> {
        &self.called_functions
    }
}

/// A function defined in the font program.
#[derive(Clone, Debug)]
pub struct Function {
    label: Label,
    body: Body,
}

impl Function {
    pub fn new(label: Label, body: Body) -> Self {
        Self { label, body }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Returns the statements between FDEF and ENDF.
    pub fn instructions(&self) -> &[Statement] {
        self.body.statements()
    }
}

/// Map of label to function that preserves definition order.
#[derive(Clone, Default, Debug)]
pub struct FunctionTable {
    functions: Vec<Function>,
    index: FnvHashMap<Label, usize>,
}

impl FunctionTable {
    /// Adds a function.
    ///
    /// Redefining a label replaces the previous function in place.
    pub fn insert(&mut self, function: Function) {
        match self.index.get(&function.label) {
            Some(&ix) => self.functions[ix] = function,
            None => {
                self.index.insert(function.label, self.functions.len());
                self.functions.push(function);
            }
        }
    }

    pub fn get(&self, label: Label) -> Option<&Function> {
        self.index.get(&label).map(|&ix| &self.functions[ix])
    }

    pub fn contains(&self, label: Label) -> bool {
        self.index.contains_key(&label)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Returns an iterator over the functions in definition order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Function> + Clone + '_ {
        self.functions.iter()
    }

    /// Returns an iterator over the labels in definition order.
    pub fn labels(&self) -> impl DoubleEndedIterator<Item = Label> + '_ {
        self.functions.iter().map(|function| function.label)
    }

    /// Removes every function for which `keep` returns false and returns
    /// the removed labels.
    pub fn retain(&mut self, mut keep: impl FnMut(&Function) -> bool) -> Vec<Label> {
        let mut removed = Vec::new();
        self.functions.retain(|function| {
            let kept = keep(function);
            if !kept {
                removed.push(function.label);
            }
            kept
        });
        if !removed.is_empty() {
            self.index = self
                .functions
                .iter()
                .enumerate()
                .map(|(ix, function)| (function.label, ix))
                .collect();
        }
        removed
    }

    /// Builds the table from the statements of the font program.
    ///
    /// Labels pushed outside of a definition are bound to the FDEF/ENDF
    /// regions in last-in first-out order, matching the stack machine where
    /// each FDEF pops its function number.
    pub fn from_font_program(statements: Vec<Statement>) -> Result<Self, BuildError> {
        let error = |statement: &Statement, kind| {
            BuildError::new(
                FONT_PROGRAM,
                Some(format!("{FONT_PROGRAM}.{}", statement.index)),
                kind,
            )
        };
        let mut table = Self::default();
        let mut labels: Vec<Label> = Vec::new();
        // Statements of the definition being collected, along with its FDEF.
        let mut current: Option<(Statement, Vec<Statement>)> = None;
        for statement in statements {
            let kind = statement.kind();
            if statement.mnemonic == Mnemonic::IDEF {
                return Err(error(&statement, BuildErrorKind::InstructionDefinition));
            }
            let Some((fdef, instructions)) = current.as_mut() else {
                match kind {
                    StatementKind::Push => labels.extend(statement.values()),
                    StatementKind::Fdef => current = Some((statement, Vec::new())),
                    StatementKind::Endf => {
                        return Err(error(&statement, BuildErrorKind::UnmatchedEndf))
                    }
                    _ => {}
                }
                continue;
            };
            match kind {
                StatementKind::Fdef => {
                    return Err(error(&statement, BuildErrorKind::NestedDefinition))
                }
                StatementKind::Endf => {
                    let label = labels
                        .pop()
                        .ok_or_else(|| error(fdef, BuildErrorKind::MissingFunctionLabel))?;
                    let instructions = core::mem::take(instructions);
                    let body = Body::new(FONT_PROGRAM, instructions).map_err(|mut err| {
                        err.function = Some(label);
                        err
                    })?;
                    table.insert(Function::new(label, body));
                    current = None;
                }
                _ => instructions.push(statement),
            }
        }
        if let Some((fdef, _)) = current {
            return Err(error(&fdef, BuildErrorKind::UnterminatedDefinition));
        }
        Ok(table)
    }

    /// Returns the font program text that defines all functions in the
    /// table.
    ///
    /// A single push lists the labels in reverse table order so that each
    /// FDEF, in table order, pops its own label.
    pub fn to_assembly(&self) -> Vec<String> {
        let mut assembly = Vec::new();
        if self.functions.is_empty() {
            return assembly;
        }
        assembly.push(push_header(self.functions.len()));
        assembly.extend(self.labels().rev().map(|label| label.to_string()));
        for function in &self.functions {
            assembly.push("FDEF[ ]".into());
            function.body.write_assembly(&mut assembly);
            assembly.push("ENDF[ ]".into());
        }
        assembly
    }
}

/// Tables handed back to the font writer after reduction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReducedTables {
    /// Assembly for the font program, one instruction or value per line.
    pub fpgm: Vec<String>,
    /// Control values by position.
    pub cvt: Vec<i32>,
}

/// All hinting bytecode of a font.
#[derive(Clone, Debug)]
pub struct BytecodeContainer {
    programs: BTreeMap<String, Program>,
    functions: FunctionTable,
    cvt: Vec<i32>,
}

impl BytecodeContainer {
    /// Decodes and builds all programs.
    ///
    /// The `fpgm` program is consumed to build the function table; every
    /// other tag becomes a [`Program`].
    pub fn new<I, T, S>(programs: I, cvt: Vec<i32>) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (T, S)>,
        T: AsRef<str>,
        S: AsRef<str>,
    {
        let mut container = Self {
            programs: BTreeMap::new(),
            functions: FunctionTable::default(),
            cvt,
        };
        for (tag, text) in programs {
            let tag = tag.as_ref();
            let statements = decode_program(tag, text.as_ref())?;
            if tag == FONT_PROGRAM {
                container.functions = FunctionTable::from_font_program(statements)?;
                log::debug!("{} functions defined", container.functions.len());
            } else {
                container
                    .programs
                    .insert(tag.into(), Program::new(tag, statements)?);
            }
        }
        Ok(container)
    }

    pub fn programs(&self) -> impl Iterator<Item = &Program> + '_ {
        self.programs.values()
    }

    pub fn program(&self, tag: &str) -> Option<&Program> {
        self.programs.get(tag)
    }

    /// Returns the tags of all programs other than `prep`.
    pub fn glyph_tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.programs
            .keys()
            .map(String::as_str)
            .filter(|tag| *tag != CONTROL_VALUE_PROGRAM)
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn cvt(&self) -> &[i32] {
        &self.cvt
    }

    /// Replaces the control value at `position`.
    pub fn set_cvt(&mut self, position: usize, value: i32) -> Result<(), Error> {
        let entry = self
            .cvt
            .get_mut(position)
            .ok_or(Error::InvalidCvtPosition(position))?;
        *entry = value;
        Ok(())
    }

    /// Records the functions called by the program with the given tag.
    pub(crate) fn set_called_functions(&mut self, tag: &str, called: BTreeSet<Label>) {
        if let Some(program) = self.programs.get_mut(tag) {
            program.called_functions = called;
        }
    }

    /// Removes the functions with the given labels, returning the labels
    /// that were present.
    pub fn remove_functions(&mut self, labels: &BTreeSet<Label>) -> Vec<Label> {
        self.functions
            .retain(|function| !labels.contains(&function.label()))
    }

    /// Returns the tables to persist in the font.
    pub fn to_tables(&self) -> ReducedTables {
        ReducedTables {
            fpgm: self.functions.to_assembly(),
            cvt: self.cvt.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode::decode_program, test_data};
    use pretty_assertions::assert_eq;

    fn table(text: &str) -> Result<FunctionTable, BuildError> {
        FunctionTable::from_font_program(decode_program(FONT_PROGRAM, text).unwrap())
    }

    #[test]
    fn labels_bind_last_in_first_out() {
        let table = table(test_data::FPGM).unwrap();
        assert_eq!(table.labels().collect::<Vec<_>>(), [3, 4, 5]);
        let f3 = table.get(3).unwrap();
        assert_eq!(f3.instructions().len(), 2);
        assert_eq!(f3.instructions()[1].mnemonic, Mnemonic::SMD);
        let f5 = table.get(5).unwrap();
        assert_eq!(f5.instructions()[0].mnemonic, Mnemonic::SVTCA);
        assert_eq!(f5.body().tag(), FONT_PROGRAM);
        assert!(table.get(6).is_none());
    }

    #[test]
    fn separate_pushes() {
        let table = table("PUSHB[ ] 7 FDEF[ ] RTG[ ] ENDF[ ] PUSHB[ ] 9 FDEF[ ] ENDF[ ]").unwrap();
        assert_eq!(table.labels().collect::<Vec<_>>(), [7, 9]);
        assert!(table.get(9).unwrap().body().is_empty());
    }

    #[test]
    fn definition_errors() {
        let kind = |text| table(text).unwrap_err().kind;
        assert_eq!(
            kind("PUSHB[ ] 1 2 FDEF[ ] FDEF[ ] ENDF[ ] ENDF[ ]"),
            BuildErrorKind::NestedDefinition
        );
        assert_eq!(kind("ENDF[ ]"), BuildErrorKind::UnmatchedEndf);
        assert_eq!(
            kind("FDEF[ ] RTG[ ] ENDF[ ]"),
            BuildErrorKind::MissingFunctionLabel
        );
        assert_eq!(
            kind("PUSHB[ ] 1 FDEF[ ] RTG[ ]"),
            BuildErrorKind::UnterminatedDefinition
        );
        assert_eq!(
            kind("PUSHB[ ] 1 IDEF[ ] ENDF[ ]"),
            BuildErrorKind::InstructionDefinition
        );
    }

    #[test]
    fn function_body_errors_name_the_label() {
        let err = table("PUSHB[ ] 8 FDEF[ ] EIF[ ] ENDF[ ]").unwrap_err();
        assert_eq!(err.function, Some(8));
        assert_eq!(err.statement.as_deref(), Some("fpgm.2"));
        assert_eq!(err.kind, BuildErrorKind::UnmatchedEif);
    }

    #[test]
    fn redefinition_replaces_in_place() {
        let table = table(
            "PUSHB[ ] 2 1 FDEF[ ] RTG[ ] ENDF[ ] FDEF[ ] ENDF[ ] PUSHB[ ] 1 FDEF[ ] ROFF[ ] ENDF[ ]",
        )
        .unwrap();
        assert_eq!(table.labels().collect::<Vec<_>>(), [1, 2]);
        assert_eq!(
            table.get(1).unwrap().instructions()[0].mnemonic,
            Mnemonic::ROFF
        );
    }

    #[test]
    fn assembly_round_trip() {
        let table = table(test_data::FPGM).unwrap();
        let assembly = table.to_assembly();
        assert_eq!(
            &assembly[..6],
            ["PUSH[ ]  /* 3 values pushed */", "5", "4", "3", "FDEF[ ]", "PUSH[ ]"]
        );
        let reparsed = self::table(&assembly.join("\n")).unwrap();
        assert_eq!(
            reparsed.labels().collect::<Vec<_>>(),
            table.labels().collect::<Vec<_>>()
        );
        for (a, b) in table.iter().zip(reparsed.iter()) {
            assert_eq!(a.instructions().len(), b.instructions().len());
            for (a, b) in a.instructions().iter().zip(b.instructions()) {
                // push forms are written generically
                if a.kind() == StatementKind::Push {
                    assert_eq!(b.kind(), StatementKind::Push);
                } else {
                    assert_eq!(a.mnemonic, b.mnemonic);
                }
                assert_eq!(a.data, b.data);
            }
        }
    }

    #[test]
    fn container_programs() {
        let mut container = BytecodeContainer::new(
            [
                ("fpgm", test_data::FPGM),
                ("prep", test_data::PREP),
                ("glyf.a", test_data::GLYPH_A),
                ("glyf.b", test_data::GLYPH_B),
            ],
            test_data::CVT.to_vec(),
        )
        .unwrap();
        assert!(container.program(FONT_PROGRAM).is_none());
        assert_eq!(container.functions().len(), 3);
        assert_eq!(
            container.glyph_tags().collect::<Vec<_>>(),
            ["glyf.a", "glyf.b"]
        );
        assert_eq!(container.program("prep").unwrap().body().len(), 3);
        container.set_cvt(2, 7).unwrap();
        assert_eq!(container.cvt(), [64, 128, 7]);
        assert_eq!(
            container.set_cvt(3, 0),
            Err(Error::InvalidCvtPosition(3))
        );
    }

    #[test]
    fn decode_errors_propagate() {
        let err = BytecodeContainer::new([("glyf.x", "5 CALL[ ]")], vec![]).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
