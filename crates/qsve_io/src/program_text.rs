use anyhow::{Context, Result, bail};
use nom::IResult;
use nom::bytes::complete::{tag, take_while_m_n};
use nom::combinator::rest;
use nom::sequence::separated_pair;

use qsve_common::isa::Instruction;
use qsve_core::program::{Program, ProgramEntry};

/// Renders a program as its `.prg` listing: one newline-terminated
/// `<8-bit binary> --<comment>` line per instruction.
pub fn render(program: &Program) -> String {
    let mut out = String::new();
    for entry in program.entries() {
        out.push_str(&format!("{} --{}\n", entry.instruction, entry.comment));
    }
    out
}

fn listing_line(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while_m_n(8, 8, |c| c == '0' || c == '1'),
        tag(" --"),
        rest,
    )(input)
}

/// Parses one listing line back to its instruction and comment.
fn parse_line(line: &str) -> Result<ProgramEntry> {
    let (remaining, (bits, comment)) = listing_line(line)
        .map_err(|e| anyhow::anyhow!("not a listing line: {e}"))?;
    if !remaining.is_empty() {
        bail!("trailing input after comment");
    }
    let byte = u8::from_str_radix(bits, 2).context("invalid binary literal")?;
    Ok(ProgramEntry {
        instruction: Instruction(byte),
        comment: comment.to_string(),
    })
}

/// Parses a full `.prg` listing. Blank lines are skipped; any malformed
/// line is a hard error, since a truncated program must never be uploaded.
pub fn parse_listing(text: &str) -> Result<Vec<ProgramEntry>> {
    let mut entries = Vec::new();
    for (line_number, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_line(line)
            .with_context(|| format!("line {}: {line:?}", line_number + 1))?;
        entries.push(entry);
    }
    if entries.is_empty() {
        bail!("listing contains no instructions");
    }
    Ok(entries)
}

/// Reconstructs the raw instruction bytes of a listing, the form the upload
/// path sends to the engine.
pub fn instruction_bytes(text: &str) -> Result<Vec<u8>> {
    Ok(parse_listing(text)?
        .into_iter()
        .map(|entry| entry.instruction.byte())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsve_core::circuit::Circuit;
    use qsve_core::compiler::{CompileOptions, compile};

    fn bell_program() -> Program {
        let mut circuit = Circuit::new(2);
        circuit.h(0);
        circuit.cnot(1, 0);
        compile(&circuit, CompileOptions::default()).unwrap()
    }

    #[test]
    fn listing_round_trips() {
        let program = bell_program();
        let text = render(&program);
        let entries = parse_listing(&text).unwrap();
        assert_eq!(entries, program.entries());
    }

    #[test]
    fn instruction_bytes_match_the_program() {
        let program = bell_program();
        let text = render(&program);
        assert_eq!(instruction_bytes(&text).unwrap(), program.bytes());
    }

    #[test]
    fn lines_are_newline_terminated_binary() {
        let program = bell_program();
        let text = render(&program);
        assert!(text.ends_with('\n'));
        let first = text.lines().next().unwrap();
        assert_eq!(first, "00000000 --Do nothing");
    }

    #[test]
    fn malformed_line_is_a_hard_error() {
        assert!(parse_listing("0001 --too short\n").is_err());
        assert!(parse_listing("00010010 -missing dashes\n").is_err());
        assert!(parse_listing("20010010 --not binary\n").is_err());
        assert!(parse_listing("").is_err());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "00000000 --Do nothing\n\n10110000 --Halt\n";
        let entries = parse_listing(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].comment, "Halt");
    }
}
