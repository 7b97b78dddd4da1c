use anyhow::{Context, Result, bail, ensure};
use nom::IResult;
use nom::character::complete::{alpha1, space1, u8 as parse_u8};
use nom::multi::separated_list1;
use nom::sequence::preceded;

use qsve_core::circuit::{Circuit, Gate};

/// Parses a circuit description.
///
/// Format: a `qubits N` header, then one gate per line (`h Q`, `x Q`,
/// `t Q`, `cnot TARGET CONTROL`, `ccnot TARGET CONTROL1 CONTROL2`).
/// Blank lines and `#` comment lines are skipped. Gate operands are
/// range-checked later, by compile/run validation.
pub fn parse(text: &str) -> Result<Circuit> {
    let mut circuit: Option<Circuit> = None;

    for (line_number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = statement(line)
            .map_err(|e| anyhow::anyhow!("unrecognized statement: {e}"))
            .and_then(|(remaining, statement)| {
                ensure!(remaining.is_empty(), "trailing input");
                Ok(statement)
            })
            .with_context(|| format!("line {}: {raw:?}", line_number + 1))?;

        match parsed {
            Statement::Qubits(n) => {
                if circuit.is_some() {
                    bail!("line {}: duplicate qubits header", line_number + 1);
                }
                circuit = Some(Circuit::new(n));
            }
            Statement::Gate(gate) => {
                let circuit = circuit
                    .as_mut()
                    .with_context(|| format!("line {}: gate before qubits header", line_number + 1))?;
                circuit.push(gate);
            }
        }
    }

    circuit.context("no qubits header found")
}

/// Renders a circuit in the same format `parse` accepts.
pub fn render(circuit: &Circuit) -> String {
    let mut out = format!("qubits {}\n", circuit.n_qubits());
    for gate in circuit.gates() {
        let line = match *gate {
            Gate::H { target } => format!("h {target}"),
            Gate::X { target } => format!("x {target}"),
            Gate::T { target } => format!("t {target}"),
            Gate::Cnot { target, control } => format!("cnot {target} {control}"),
            Gate::Ccnot {
                target,
                control1,
                control2,
            } => format!("ccnot {target} {control1} {control2}"),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

enum Statement {
    Qubits(u8),
    Gate(Gate),
}

fn statement(input: &str) -> IResult<&str, Statement> {
    let (input, keyword) = alpha1(input)?;
    let (input, operands) = preceded(space1, separated_list1(space1, parse_u8))(input)?;

    let statement = match (keyword, operands.as_slice()) {
        ("qubits", &[n]) => Statement::Qubits(n),
        ("h", &[target]) => Statement::Gate(Gate::H { target }),
        ("x", &[target]) => Statement::Gate(Gate::X { target }),
        ("t", &[target]) => Statement::Gate(Gate::T { target }),
        ("cnot", &[target, control]) => Statement::Gate(Gate::Cnot { target, control }),
        ("ccnot", &[target, control1, control2]) => Statement::Gate(Gate::Ccnot {
            target,
            control1,
            control2,
        }),
        _ => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )));
        }
    };
    Ok((input, statement))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_bell_circuit() {
        let text = "# Bell pair\nqubits 2\nh 0\ncnot 1 0\n";
        let circuit = parse(text).unwrap();
        assert_eq!(circuit.n_qubits(), 2);
        assert_eq!(
            circuit.gates(),
            &[
                Gate::H { target: 0 },
                Gate::Cnot {
                    target: 1,
                    control: 0
                }
            ]
        );
    }

    #[test]
    fn round_trips_every_gate_kind() {
        let mut circuit = Circuit::new(4);
        circuit.h(0);
        circuit.x(1);
        circuit.t(2);
        circuit.cnot(3, 0);
        circuit.ccnot(0, 1, 2);
        let text = render(&circuit);
        assert_eq!(parse(&text).unwrap(), circuit);
    }

    #[test]
    fn rejects_missing_header() {
        assert!(parse("h 0\n").is_err());
    }

    #[test]
    fn rejects_wrong_operand_count() {
        assert!(parse("qubits 2\ncnot 1\n").is_err());
        assert!(parse("qubits 2\nh 0 1\n").is_err());
    }

    #[test]
    fn rejects_unknown_gate() {
        assert!(parse("qubits 2\ns 0\n").is_err());
    }

    #[test]
    fn rejects_duplicate_header() {
        assert!(parse("qubits 2\nqubits 3\n").is_err());
    }
}
