use qsve_common::isa::Instruction;

/// One instruction of a compiled program, paired with the comment that
/// appears next to it in the human-readable listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramEntry {
    pub instruction: Instruction,
    pub comment: String,
}

/// An ordered, append-only instruction stream produced by the compiler.
///
/// The final entry of a complete program is always a halt instruction; the
/// upload codec sends `bytes()` to the engine, while the listing renderer
/// serializes the entries with their comments for debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    entries: Vec<ProgramEntry>,
}

impl Program {
    pub fn entries(&self) -> &[ProgramEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn instructions(&self) -> impl Iterator<Item = Instruction> + '_ {
        self.entries.iter().map(|entry| entry.instruction)
    }

    /// The raw instruction bytes in program order.
    pub fn bytes(&self) -> Vec<u8> {
        self.entries
            .iter()
            .map(|entry| entry.instruction.byte())
            .collect()
    }

    pub(crate) fn push(&mut self, instruction: Instruction, comment: impl Into<String>) {
        self.entries.push(ProgramEntry {
            instruction,
            comment: comment.into(),
        });
    }
}
