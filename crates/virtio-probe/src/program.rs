//! The probe program.
//!
//! ```text
//!         li   t3, VIRTIO_BASE
//!         lw   t4, 0(t3)          # magic register
//!         li   t5, EXPECTED_MAGIC
//!         bne  t4, t5, fail
//!         li   t0, pass_message
//!         j    print
//! fail:   li   t0, fail_message
//! print:  li   t1, UART_BASE
//! loop:   lb   t2, 0(t0)
//!         beq  t2, zero, done
//!         sb   t2, 0(t1)
//!         addi t0, t0, 1
//!         j    loop
//! done:   j    done
//! ```

use riscv32_encoder::{Gpr, Inst};

use crate::{
    asm::{Label, TextAssembler},
    config::ProbeConfig,
    error::GenError,
    strings::StringTable,
};

/// Labels bound while emitting the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeLabels {
    pub fail: Label,
    pub print: Label,
    pub print_loop: Label,
    pub done: Label,
}

/// Emit the string print loop followed by the final self-loop.
///
/// Expects the string address in the cursor register. Binds `print` at the
/// first instruction and returns the loop and halt labels.
pub fn emit_puts(
    asm: &mut TextAssembler,
    cfg: &ProbeConfig,
    print: Label,
) -> Result<(Label, Label), GenError> {
    let r = cfg.regs;
    let print_loop = asm.new_label();
    let done = asm.new_label();

    asm.bind(print)?;
    asm.li(r.port, cfg.uart_base);

    asm.bind(print_loop)?;
    asm.emit(Inst::Lb {
        rd: r.byte,
        rs1: r.cursor,
        imm: 0,
    });
    asm.beq_to(r.byte, Gpr::ZERO, done)?;
    asm.emit(Inst::Sb {
        rs1: r.port,
        rs2: r.byte,
        imm: 0,
    });
    asm.emit(Inst::Addi {
        rd: r.cursor,
        rs1: r.cursor,
        imm: 1,
    });
    asm.j_to(print_loop)?;

    // halt
    asm.bind(done)?;
    asm.j_to(done)?;

    Ok((print_loop, done))
}

/// Emit the whole probe program, interning its messages into `strings`.
pub fn emit_probe(
    asm: &mut TextAssembler,
    strings: &mut StringTable,
    cfg: &ProbeConfig,
) -> Result<ProbeLabels, GenError> {
    let r = cfg.regs;
    let fail = asm.new_label();
    let print = asm.new_label();

    asm.li(r.device_base, cfg.virtio_base);
    asm.emit(Inst::Lw {
        rd: r.device_value,
        rs1: r.device_base,
        imm: 0,
    });
    asm.li(r.expected, cfg.expected_magic);

    let pass_addr = strings.intern(&cfg.pass_message);
    let fail_addr = strings.intern(&cfg.fail_message);

    asm.bne_to(r.device_value, r.expected, fail)?;
    asm.li(r.cursor, pass_addr);
    asm.j_to(print)?;

    asm.bind(fail)?;
    asm.li(r.cursor, fail_addr);

    let (print_loop, done) = emit_puts(asm, cfg, print)?;

    Ok(ProbeLabels {
        fail,
        print,
        print_loop,
        done,
    })
}
