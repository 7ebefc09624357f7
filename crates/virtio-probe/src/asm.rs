//! Text segment assembler with symbolic labels.
//!
//! Branches and jumps name a [`Label`] instead of a byte offset. A label may
//! be referenced before it is bound; such references are recorded as pending
//! fixups and patched when the label is bound. Instructions are kept in
//! structured form and only encoded by [`TextAssembler::finish`], which also
//! fails on labels that were referenced but never bound.

use core::fmt;

use riscv32_encoder::{Gpr, Inst};

use crate::{error::GenError, pseudo::load_constant};

/// A position in the text segment, bound with [`TextAssembler::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Special offset value meaning "label not yet bound"
const UNKNOWN_LABEL_OFFSET: u32 = u32::MAX;

/// Branch waiting for its target label to be bound
#[derive(Debug, Clone, Copy)]
struct PendingFixup {
    /// Index of the branch instruction
    inst_idx: usize,
    target: Label,
}

/// Accumulates the instructions of a text segment.
#[derive(Debug, Default)]
pub struct TextAssembler {
    insts: Vec<Inst>,
    label_offsets: Vec<u32>,
    pending_fixups: Vec<PendingFixup>,
}

/// An assembled text segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// Instructions with all branch offsets resolved.
    pub insts: Vec<Inst>,
    /// Encoded instruction words, one per entry of `insts`.
    pub words: Vec<u32>,
    label_offsets: Vec<u32>,
}

impl Text {
    /// Byte offset of `label` from the start of the text.
    pub fn label_offset(&self, label: Label) -> Option<u32> {
        self.label_offsets.get(label.index()).copied()
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.words.len() * Inst::SIZE as usize
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Little-endian machine code.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }
}

impl TextAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte offset at which the next instruction will be placed.
    pub fn cur_offset(&self) -> u32 {
        self.insts.len() as u32 * Inst::SIZE
    }

    /// Create a new, unbound label.
    pub fn new_label(&mut self) -> Label {
        let label = Label(self.label_offsets.len() as u32);
        self.label_offsets.push(UNKNOWN_LABEL_OFFSET);
        label
    }

    /// Bind `label` to the current offset and patch branches already
    /// targeting it.
    pub fn bind(&mut self, label: Label) -> Result<(), GenError> {
        if self.bound_offset(label)? != UNKNOWN_LABEL_OFFSET {
            return Err(GenError::LabelRebound(label));
        }
        let offset = self.cur_offset();
        log::debug!("bind {} at 0x{:x}", label, offset);
        self.label_offsets[label.index()] = offset;
        self.resolve_pending_fixups(label, offset);
        Ok(())
    }

    /// Offset `label` is bound to, or `UNKNOWN_LABEL_OFFSET`. Labels not
    /// created by this assembler are rejected.
    fn bound_offset(&self, label: Label) -> Result<u32, GenError> {
        self.label_offsets
            .get(label.index())
            .copied()
            .ok_or(GenError::ForeignLabel(label))
    }

    /// Append a single instruction.
    pub fn emit(&mut self, inst: Inst) {
        self.insts.push(inst);
    }

    /// Append the expansion of `li rd, value`.
    pub fn li(&mut self, rd: Gpr, value: u32) {
        for inst in load_constant(rd, value) {
            self.emit(inst);
        }
    }

    pub fn beq_to(&mut self, rs1: Gpr, rs2: Gpr, target: Label) -> Result<(), GenError> {
        self.emit_branch(Inst::Beq { rs1, rs2, imm: 0 }, target)
    }

    pub fn bne_to(&mut self, rs1: Gpr, rs2: Gpr, target: Label) -> Result<(), GenError> {
        self.emit_branch(Inst::Bne { rs1, rs2, imm: 0 }, target)
    }

    pub fn jal_to(&mut self, rd: Gpr, target: Label) -> Result<(), GenError> {
        self.emit_branch(Inst::Jal { rd, imm: 0 }, target)
    }

    /// `j target` == `jal zero, target`
    pub fn j_to(&mut self, target: Label) -> Result<(), GenError> {
        self.jal_to(Gpr::ZERO, target)
    }

    fn emit_branch(&mut self, inst: Inst, target: Label) -> Result<(), GenError> {
        // nothing is emitted for a foreign label
        let target_offset = self.bound_offset(target)?;
        let inst_idx = self.insts.len();
        self.insts.push(inst);
        self.resolve_or_record_fixup(inst_idx, target, target_offset);
        Ok(())
    }

    /// Patch immediately if `target` is bound, otherwise record for later.
    fn resolve_or_record_fixup(&mut self, inst_idx: usize, target: Label, target_offset: u32) {
        if target_offset != UNKNOWN_LABEL_OFFSET {
            self.patch_branch(inst_idx, target_offset);
        } else {
            self.pending_fixups.push(PendingFixup { inst_idx, target });
        }
    }

    fn resolve_pending_fixups(&mut self, label: Label, label_offset: u32) {
        let mut i = 0;
        while i < self.pending_fixups.len() {
            if self.pending_fixups[i].target == label {
                let fixup = self.pending_fixups.remove(i);
                self.patch_branch(fixup.inst_idx, label_offset);
            } else {
                i += 1;
            }
        }
    }

    /// Offsets are relative to the branch itself; range is checked at encode.
    fn patch_branch(&mut self, inst_idx: usize, target_offset: u32) {
        let branch_offset = inst_idx as u32 * Inst::SIZE;
        let delta = target_offset as i32 - branch_offset as i32;
        self.insts[inst_idx] = self.insts[inst_idx].with_offset(delta);
    }

    /// Resolve and encode. Fails on an unbound label or an immediate that
    /// does not fit its field.
    pub fn finish(self) -> Result<Text, GenError> {
        if let Some(fixup) = self.pending_fixups.first() {
            return Err(GenError::UnboundLabel(fixup.target));
        }
        let words = self
            .insts
            .iter()
            .map(|inst| inst.encode())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Text {
            insts: self.insts,
            words,
            label_offsets: self.label_offsets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_and_backward_branches() {
        let mut asm = TextAssembler::new();
        let top = asm.new_label();
        let end = asm.new_label();
        asm.bind(top).unwrap();
        asm.beq_to(Gpr::T2, Gpr::ZERO, end).unwrap();
        asm.emit(Inst::Addi {
            rd: Gpr::T0,
            rs1: Gpr::T0,
            imm: 1,
        });
        asm.j_to(top).unwrap();
        asm.bind(end).unwrap();
        let text = asm.finish().unwrap();

        assert_eq!(text.insts[0].branch_offset(), Some(12));
        assert_eq!(text.insts[2].branch_offset(), Some(-8));
        assert_eq!(text.label_offset(end), Some(12));
        assert_eq!(text.len(), 12);
    }

    #[test]
    fn test_self_jump() {
        let mut asm = TextAssembler::new();
        let halt = asm.new_label();
        asm.bind(halt).unwrap();
        asm.j_to(halt).unwrap();
        let text = asm.finish().unwrap();
        assert_eq!(text.words, vec![0x0000_006f]);
    }

    #[test]
    fn test_unbound_label() {
        let mut asm = TextAssembler::new();
        let nowhere = asm.new_label();
        asm.bne_to(Gpr::T4, Gpr::T5, nowhere).unwrap();
        assert!(matches!(asm.finish(), Err(GenError::UnboundLabel(l)) if l == nowhere));
    }

    #[test]
    fn test_label_rebound() {
        let mut asm = TextAssembler::new();
        let label = asm.new_label();
        asm.bind(label).unwrap();
        asm.emit(Inst::Jal {
            rd: Gpr::ZERO,
            imm: 0,
        });
        assert!(matches!(asm.bind(label), Err(GenError::LabelRebound(_))));
    }

    #[test]
    fn test_branch_out_of_range() {
        let mut asm = TextAssembler::new();
        let far = asm.new_label();
        asm.bne_to(Gpr::T4, Gpr::T5, far).unwrap();
        for _ in 0..1024 {
            asm.emit(Inst::Addi {
                rd: Gpr::ZERO,
                rs1: Gpr::ZERO,
                imm: 0,
            });
        }
        // 4100 bytes away
        asm.bind(far).unwrap();
        assert!(matches!(asm.finish(), Err(GenError::Encode(_))));
    }

    #[test]
    fn test_label_from_other_assembler() {
        let mut a = TextAssembler::new();
        a.new_label();
        let other = a.new_label();

        let mut b = TextAssembler::new();
        b.new_label();
        assert!(matches!(b.bind(other), Err(GenError::ForeignLabel(l)) if l == other));
        assert!(matches!(b.j_to(other), Err(GenError::ForeignLabel(_))));
        assert!(matches!(
            b.bne_to(Gpr::T4, Gpr::T5, other),
            Err(GenError::ForeignLabel(_))
        ));
        assert_eq!(b.cur_offset(), 0);
    }

    #[test]
    fn test_li_expands() {
        let mut asm = TextAssembler::new();
        asm.li(Gpr::T5, 0x7472_6976);
        assert_eq!(asm.cur_offset(), 8);
        asm.li(Gpr::T0, 0x8000_1000);
        assert_eq!(asm.cur_offset(), 12);
    }
}
