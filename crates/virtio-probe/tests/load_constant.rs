//! `li` expansion: the emitted instructions rebuild every 32-bit constant.

use proptest::prelude::*;
use riscv32_emulator::debug_riscv32_ops;
use riscv32_encoder::{Gpr, Inst};
use virtio_probe::{load_constant, split_constant};

/// Evaluate a `lui`/`addi` sequence on a register file that starts at zero.
fn evaluate(insts: &[Inst], rd: Gpr) -> u32 {
    let mut regs = [0u32; 32];
    for inst in insts {
        match *inst {
            Inst::Lui { rd, imm } => regs[rd.num() as usize] = imm << 12,
            Inst::Addi { rd, rs1, imm } => {
                regs[rd.num() as usize] = regs[rs1.num() as usize].wrapping_add(imm as u32)
            }
            other => panic!("unexpected {:?} in li expansion", other),
        }
        regs[0] = 0;
    }
    regs[rd.num() as usize]
}

/// Run the expansion in the emulator and read back `rd`.
fn execute(value: u32) -> u32 {
    let mut ops = load_constant(Gpr::A0, value);
    ops.push(Inst::Jal {
        rd: Gpr::ZERO,
        imm: 0,
    });
    let mut emu = debug_riscv32_ops(&ops).unwrap();
    emu.run_until_halt().unwrap();
    emu.get_register(Gpr::A0) as u32
}

#[test]
fn test_reference_constants() {
    for value in [0, 1, u32::MAX, 0x7472_6976, 0x8000_1000, 0x7fff_ffff] {
        let insts = load_constant(Gpr::T5, value);
        assert_eq!(evaluate(&insts, Gpr::T5), value, "value 0x{:08x}", value);
        assert_eq!(execute(value), value, "value 0x{:08x}", value);
        assert_eq!(split_constant(value).reconstruct(), value);
    }
}

#[test]
fn test_reference_forms() {
    // 0: addi only
    assert_eq!(
        load_constant(Gpr::T0, 0),
        vec![Inst::Addi {
            rd: Gpr::T0,
            rs1: Gpr::ZERO,
            imm: 0
        }]
    );
    // -1: lower part carries everything
    assert_eq!(
        load_constant(Gpr::T0, u32::MAX),
        vec![Inst::Addi {
            rd: Gpr::T0,
            rs1: Gpr::ZERO,
            imm: -1
        }]
    );
    // 0x80001000: lui only
    assert_eq!(
        load_constant(Gpr::T0, 0x8000_1000),
        vec![Inst::Lui {
            rd: Gpr::T0,
            imm: 0x80001
        }]
    );
    // 0x7fffffff: upper rounds up, lower is -1
    assert_eq!(
        load_constant(Gpr::T0, 0x7fff_ffff),
        vec![
            Inst::Lui {
                rd: Gpr::T0,
                imm: 0x80000
            },
            Inst::Addi {
                rd: Gpr::T0,
                rs1: Gpr::T0,
                imm: -1
            },
        ]
    );
}

proptest! {
    #[test]
    fn prop_split_reconstructs(value in any::<u32>()) {
        let split = split_constant(value);
        prop_assert!((-2048..=2047).contains(&split.lower));
        prop_assert!(split.upper <= 0xf_ffff);
        prop_assert_eq!(split.reconstruct(), value);
    }

    #[test]
    fn prop_load_constant_reconstructs(value in any::<u32>()) {
        let insts = load_constant(Gpr::T5, value);
        prop_assert!(!insts.is_empty() && insts.len() <= 2);
        for inst in &insts {
            prop_assert!(inst.encode().is_ok());
        }
        prop_assert_eq!(evaluate(&insts, Gpr::T5), value);
    }
}
