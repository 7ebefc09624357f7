//! Text assembler for the supported subset.
//!
//! Parses lines such as `lw t4, 0(t3)` or `bne t4, t5, 12` into encoded
//! words. Branch and jump targets are numeric byte offsets; there are no
//! labels. Tests use this to state expected instruction sequences in a
//! readable form.

use alloc::{format, string::String, string::ToString, vec::Vec};

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, hex_digit1, multispace0},
    combinator::{map_res, opt},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::{inst::Inst, regs::Gpr};

/// Parse a register name.
fn parse_register(input: &str) -> IResult<&str, Gpr> {
    map_res(alphanumeric1, Gpr::from_name)(input)
}

/// Parse an integer (decimal or `0x` hex, optionally negative).
fn parse_integer(input: &str) -> IResult<&str, i64> {
    let (input, negative) = opt(char('-'))(input)?;
    let (input, magnitude) = alt((
        map_res(preceded(tag("0x"), hex_digit1), |d: &str| i64::from_str_radix(d, 16)),
        map_res(digit1, |d: &str| d.parse::<i64>()),
    ))(input)?;
    Ok((input, if negative.is_some() { -magnitude } else { magnitude }))
}

/// Parse a signed 32-bit immediate or offset.
fn parse_imm(input: &str) -> IResult<&str, i32> {
    map_res(parse_integer, |v: i64| i32::try_from(v))(input)
}

/// Parse the unsigned 20-bit field of `lui`.
fn parse_upper(input: &str) -> IResult<&str, u32> {
    map_res(parse_integer, |v: i64| u32::try_from(v))(input)
}

/// Operand separator: `,` with optional whitespace around it.
fn comma(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char(','), multispace0)(input)
}

/// Memory operand: `imm(reg)`.
fn parse_mem(input: &str) -> IResult<&str, (i32, Gpr)> {
    pair(parse_imm, delimited(char('('), parse_register, char(')')))(input)
}

fn unknown_mnemonic(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::Tag))
}

/// Parse a single instruction.
fn parse_inst(input: &str) -> IResult<&str, Inst> {
    let (input, _) = multispace0(input)?;
    let (input, mnemonic) = alpha1(input)?;
    let (input, _) = multispace0(input)?;

    match mnemonic {
        "lui" => {
            let (input, (rd, _, imm)) = tuple((parse_register, comma, parse_upper))(input)?;
            Ok((input, Inst::Lui { rd, imm }))
        }
        "addi" => {
            let (input, (rd, _, rs1, _, imm)) =
                tuple((parse_register, comma, parse_register, comma, parse_imm))(input)?;
            Ok((input, Inst::Addi { rd, rs1, imm }))
        }
        "lw" | "lb" => {
            let (input, (rd, _, (imm, rs1))) = tuple((parse_register, comma, parse_mem))(input)?;
            let inst = if mnemonic == "lw" {
                Inst::Lw { rd, rs1, imm }
            } else {
                Inst::Lb { rd, rs1, imm }
            };
            Ok((input, inst))
        }
        "sb" => {
            let (input, (rs2, _, (imm, rs1))) = tuple((parse_register, comma, parse_mem))(input)?;
            Ok((input, Inst::Sb { rs1, rs2, imm }))
        }
        "beq" | "bne" => {
            let (input, (rs1, _, rs2, _, imm)) =
                tuple((parse_register, comma, parse_register, comma, parse_imm))(input)?;
            let inst = if mnemonic == "beq" {
                Inst::Beq { rs1, rs2, imm }
            } else {
                Inst::Bne { rs1, rs2, imm }
            };
            Ok((input, inst))
        }
        "jal" => {
            let (input, (rd, _, imm)) = tuple((parse_register, comma, parse_imm))(input)?;
            Ok((input, Inst::Jal { rd, imm }))
        }
        // j offset == jal zero, offset
        "j" => {
            let (input, imm) = parse_imm(input)?;
            Ok((input, Inst::Jal { rd: Gpr::ZERO, imm }))
        }
        _ => Err(unknown_mnemonic(input)),
    }
}

/// Assemble a single instruction from assembly text.
///
/// Returns the encoded word, or an error string if parsing or encoding fails.
pub fn assemble_instruction(asm: &str) -> Result<u32, String> {
    match parse_inst(asm) {
        Ok((rest, inst)) if rest.trim().is_empty() => inst.encode().map_err(|e| e.to_string()),
        Ok((rest, _)) => Err(format!("Unexpected text after instruction: '{}'", rest)),
        Err(e) => Err(format!("Parse error in '{}': {:?}", asm.trim(), e)),
    }
}

/// Assemble multi-line assembly code into little-endian bytes.
///
/// Blank lines and `#` comments are skipped.
pub fn assemble_code(asm: &str) -> Result<Vec<u8>, String> {
    let mut code = Vec::new();
    for line in asm.lines() {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }
        let word = assemble_instruction(line)
            .map_err(|e| format!("Error at offset 0x{:04x}: {}", code.len(), e))?;
        code.extend_from_slice(&word.to_le_bytes());
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::*;

    #[test]
    fn test_assemble_lui() {
        assert_eq!(
            assemble_instruction("lui t3, 0x20000").unwrap(),
            lui(Gpr::T3, 0x20000).unwrap()
        );
    }

    #[test]
    fn test_assemble_addi_negative() {
        assert_eq!(
            assemble_instruction("addi t5, t5, -1674").unwrap(),
            addi(Gpr::T5, Gpr::T5, -1674).unwrap()
        );
    }

    #[test]
    fn test_assemble_loads_and_stores() {
        assert_eq!(assemble_instruction("lw t4, 0(t3)").unwrap(), lw(Gpr::T4, Gpr::T3, 0).unwrap());
        assert_eq!(
            assemble_instruction("lb t2, -4(t0)").unwrap(),
            lb(Gpr::T2, Gpr::T0, -4).unwrap()
        );
        assert_eq!(assemble_instruction("sb t2, 0(t1)").unwrap(), sb(Gpr::T1, Gpr::T2, 0).unwrap());
    }

    #[test]
    fn test_assemble_branches() {
        assert_eq!(
            assemble_instruction("bne t4, t5, 12").unwrap(),
            bne(Gpr::T4, Gpr::T5, 12).unwrap()
        );
        assert_eq!(
            assemble_instruction("beq t2, zero, 16").unwrap(),
            beq(Gpr::T2, Gpr::ZERO, 16).unwrap()
        );
        assert_eq!(assemble_instruction("jal zero, -16").unwrap(), 0xff1ff06f);
        assert_eq!(assemble_instruction("j 0").unwrap(), 0x0000006f);
    }

    #[test]
    fn test_assemble_hex_immediate() {
        assert_eq!(
            assemble_instruction("addi t0, t0, 0x14").unwrap(),
            addi(Gpr::T0, Gpr::T0, 20).unwrap()
        );
    }

    #[test]
    fn test_assemble_errors() {
        assert!(assemble_instruction("ecall").is_err());
        assert!(assemble_instruction("addi t0, t0, 4096").is_err());
        assert!(assemble_instruction("addi t0, q9, 1").is_err());
        assert!(assemble_instruction("lw t0, 0(t1) extra").is_err());
    }

    #[test]
    fn test_assemble_code() {
        let asm = "
            # load and spin
            lui t0, 0x80001
            addi t0, t0, 0x14   # fail message
            j 0
        ";
        let code = assemble_code(asm).unwrap();
        assert_eq!(code.len(), 12);
        assert_eq!(&code[8..12], &0x0000006fu32.to_le_bytes());
    }
}
