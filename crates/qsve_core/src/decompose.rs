use crate::circuit::Gate;
use qsve_common::isa::MatrixKind;

/// One operation the engine executes in a single Calculate cycle: a 2x2
/// unitary on `target`, optionally gated by `control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementaryGate {
    pub matrix: MatrixKind,
    pub target: u8,
    pub control: Option<u8>,
}

impl ElementaryGate {
    pub fn h(target: u8) -> Self {
        Self {
            matrix: MatrixKind::H,
            target,
            control: None,
        }
    }

    pub fn x(target: u8) -> Self {
        Self {
            matrix: MatrixKind::X,
            target,
            control: None,
        }
    }

    pub fn t(target: u8) -> Self {
        Self {
            matrix: MatrixKind::T,
            target,
            control: None,
        }
    }

    pub fn cx(target: u8, control: u8) -> Self {
        Self {
            matrix: MatrixKind::X,
            target,
            control: Some(control),
        }
    }
}

/// Lowers a gate sequence to the engine's elementary gate set.
pub fn decompose(gates: &[Gate]) -> Vec<ElementaryGate> {
    let mut out = Vec::with_capacity(gates.len());
    for &gate in gates {
        decompose_gate(gate, &mut out);
    }
    out
}

/// Lowers a single gate, appending its expansion to `out`.
///
/// CCNOT expands to a relative-phase Toffoli: the sequence reproduces the
/// Toffoli truth table on computational-basis inputs and all measurement
/// probabilities, but is not phase-exact on superposed control states. The
/// hardware executes exactly this sequence, so the compiler and the
/// simulator must both use it; any deviation silently breaks parity.
pub fn decompose_gate(gate: Gate, out: &mut Vec<ElementaryGate>) {
    match gate {
        Gate::H { target } => out.push(ElementaryGate::h(target)),
        Gate::X { target } => out.push(ElementaryGate::x(target)),
        Gate::T { target } => out.push(ElementaryGate::t(target)),
        Gate::Cnot { target, control } => out.push(ElementaryGate::cx(target, control)),
        Gate::Ccnot {
            target,
            control1,
            control2,
        } => {
            out.push(ElementaryGate::h(target));
            out.push(ElementaryGate::cx(target, control2));
            for _ in 0..3 {
                out.push(ElementaryGate::t(target));
            }
            out.push(ElementaryGate::cx(target, control1));
            out.push(ElementaryGate::t(target));
            out.push(ElementaryGate::cx(target, control2));
            for _ in 0..3 {
                out.push(ElementaryGate::t(target));
            }
            out.push(ElementaryGate::cx(target, control1));
            out.push(ElementaryGate::t(target));
            out.push(ElementaryGate::t(control2));
            out.push(ElementaryGate::h(target));
            out.push(ElementaryGate::cx(control2, control1));
            out.push(ElementaryGate::t(control1));
            for _ in 0..3 {
                out.push(ElementaryGate::t(control2));
            }
            out.push(ElementaryGate::cx(control2, control1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_qubit_gates_pass_through() {
        assert_eq!(
            decompose(&[Gate::H { target: 3 }]),
            vec![ElementaryGate::h(3)]
        );
        assert_eq!(
            decompose(&[Gate::Cnot {
                target: 1,
                control: 0
            }]),
            vec![ElementaryGate::cx(1, 0)]
        );
    }

    #[test]
    fn ccnot_expands_to_the_fixed_sequence() {
        let ops = decompose(&[Gate::Ccnot {
            target: 0,
            control1: 1,
            control2: 2,
        }]);
        let expected = vec![
            ElementaryGate::h(0),
            ElementaryGate::cx(0, 2),
            ElementaryGate::t(0),
            ElementaryGate::t(0),
            ElementaryGate::t(0),
            ElementaryGate::cx(0, 1),
            ElementaryGate::t(0),
            ElementaryGate::cx(0, 2),
            ElementaryGate::t(0),
            ElementaryGate::t(0),
            ElementaryGate::t(0),
            ElementaryGate::cx(0, 1),
            ElementaryGate::t(0),
            ElementaryGate::t(2),
            ElementaryGate::h(0),
            ElementaryGate::cx(2, 1),
            ElementaryGate::t(1),
            ElementaryGate::t(2),
            ElementaryGate::t(2),
            ElementaryGate::t(2),
            ElementaryGate::cx(2, 1),
        ];
        assert_eq!(ops, expected);
    }

    #[test]
    fn ccnot_expansion_uses_only_elementary_operands() {
        let ops = decompose(&[Gate::Ccnot {
            target: 4,
            control1: 2,
            control2: 7,
        }]);
        assert_eq!(ops.len(), 21);
        for op in ops {
            if let Some(control) = op.control {
                assert_ne!(control, op.target);
                assert_eq!(op.matrix, MatrixKind::X);
            }
        }
    }
}
