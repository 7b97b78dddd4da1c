use rand::Rng;
use rand::seq::SliceRandom;

use crate::ValidationError;
use qsve_common::isa::MAX_QUBITS;

/// One gate of the circuit IR.
///
/// Qubit indices count from zero. `Cnot` and `Ccnot` are not elementary on
/// the engine; the decomposer rewrites them over {H, X, T, controlled-X}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    H { target: u8 },
    X { target: u8 },
    T { target: u8 },
    Cnot { target: u8, control: u8 },
    Ccnot { target: u8, control1: u8, control2: u8 },
}

/// An ordered gate sequence over a fixed number of qubits.
///
/// Built by append; handed read-only to the compiler and the simulator.
/// Qubit indices are validated at compile/run time, not at build time, so a
/// circuit under construction may transiently reference qubits it does not
/// have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    n_qubits: u8,
    gates: Vec<Gate>,
}

impl Circuit {
    pub fn new(n_qubits: u8) -> Self {
        Self {
            n_qubits,
            gates: Vec::new(),
        }
    }

    pub fn n_qubits(&self) -> u8 {
        self.n_qubits
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn push(&mut self, gate: Gate) {
        self.gates.push(gate);
    }

    /// Appends a Hadamard gate on `target`.
    pub fn h(&mut self, target: u8) {
        self.push(Gate::H { target });
    }

    /// Appends a Pauli-X gate on `target`.
    pub fn x(&mut self, target: u8) {
        self.push(Gate::X { target });
    }

    /// Appends a T gate on `target`.
    pub fn t(&mut self, target: u8) {
        self.push(Gate::T { target });
    }

    /// Appends a controlled-NOT with the given target and control.
    pub fn cnot(&mut self, target: u8, control: u8) {
        self.push(Gate::Cnot { target, control });
    }

    /// Appends a doubly-controlled NOT with the given target and controls.
    pub fn ccnot(&mut self, target: u8, control1: u8, control2: u8) {
        self.push(Gate::Ccnot {
            target,
            control1,
            control2,
        });
    }

    /// Appends `n_gates` gates drawn uniformly from the supported gate set,
    /// each acting on distinct randomly chosen qubits.
    ///
    /// Multi-qubit gates are only drawn when the circuit has enough qubits
    /// for distinct operands.
    pub fn push_random_gates<R: Rng + ?Sized>(&mut self, n_gates: usize, rng: &mut R) {
        let mut qubits: Vec<u8> = (0..self.n_qubits).collect();
        let kinds = match self.n_qubits {
            0 => return,
            1 => 3,
            2 => 4,
            _ => 5,
        };

        for _ in 0..n_gates {
            qubits.shuffle(rng);
            match rng.gen_range(0..kinds) {
                0 => self.h(qubits[0]),
                1 => self.x(qubits[0]),
                2 => self.t(qubits[0]),
                3 => self.cnot(qubits[0], qubits[1]),
                _ => self.ccnot(qubits[0], qubits[1], qubits[2]),
            }
        }
    }

    /// Checks the circuit against the engine's limits.
    ///
    /// Rejects a qubit count outside `1..=14`, any out-of-range qubit index,
    /// a control equal to its target, and CCNOTs with coinciding controls.
    /// Both the compiler and the simulator call this before touching any
    /// output, so they accept and reject exactly the same circuits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.n_qubits == 0 || self.n_qubits > MAX_QUBITS {
            return Err(ValidationError::QubitCountOutOfRange {
                count: self.n_qubits,
            });
        }

        for (gate_index, gate) in self.gates.iter().enumerate() {
            let (target, controls) = match *gate {
                Gate::H { target } | Gate::X { target } | Gate::T { target } => (target, [None, None]),
                Gate::Cnot { target, control } => (target, [Some(control), None]),
                Gate::Ccnot {
                    target,
                    control1,
                    control2,
                } => (target, [Some(control1), Some(control2)]),
            };

            self.check_qubit(gate_index, target)?;
            for control in controls.into_iter().flatten() {
                self.check_qubit(gate_index, control)?;
                if control == target {
                    return Err(ValidationError::ControlEqualsTarget {
                        gate_index,
                        qubit: control,
                    });
                }
            }
            if let [Some(c1), Some(c2)] = controls {
                if c1 == c2 {
                    return Err(ValidationError::DuplicateControls {
                        gate_index,
                        qubit: c1,
                    });
                }
            }
        }

        Ok(())
    }

    fn check_qubit(&self, gate_index: usize, qubit: u8) -> Result<(), ValidationError> {
        if qubit >= self.n_qubits {
            return Err(ValidationError::QubitOutOfRange {
                gate_index,
                qubit,
                n_qubits: self.n_qubits,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn builder_appends_in_order() {
        let mut circuit = Circuit::new(2);
        circuit.h(0);
        circuit.cnot(1, 0);
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
    fn validate_rejects_zero_qubits() {
        let circuit = Circuit::new(0);
        assert_eq!(
            circuit.validate(),
            Err(ValidationError::QubitCountOutOfRange { count: 0 })
        );
    }

    #[test]
    fn validate_rejects_fifteen_qubits() {
        let circuit = Circuit::new(15);
        assert_eq!(
            circuit.validate(),
            Err(ValidationError::QubitCountOutOfRange { count: 15 })
        );
    }

    #[test]
    fn validate_rejects_out_of_range_target() {
        let mut circuit = Circuit::new(2);
        circuit.x(2);
        assert_eq!(
            circuit.validate(),
            Err(ValidationError::QubitOutOfRange {
                gate_index: 0,
                qubit: 2,
                n_qubits: 2
            })
        );
    }

    #[test]
    fn validate_rejects_control_equal_to_target() {
        let mut circuit = Circuit::new(2);
        circuit.h(0);
        circuit.cnot(1, 1);
        assert_eq!(
            circuit.validate(),
            Err(ValidationError::ControlEqualsTarget {
                gate_index: 1,
                qubit: 1
            })
        );
    }

    #[test]
    fn validate_rejects_duplicate_ccnot_controls() {
        let mut circuit = Circuit::new(3);
        circuit.ccnot(0, 1, 1);
        assert_eq!(
            circuit.validate(),
            Err(ValidationError::DuplicateControls {
                gate_index: 0,
                qubit: 1
            })
        );
    }

    #[test]
    fn random_gates_produce_a_valid_circuit() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut circuit = Circuit::new(4);
        circuit.push_random_gates(100, &mut rng);
        assert_eq!(circuit.len(), 100);
        circuit.validate().unwrap();
    }

    #[test]
    fn random_gates_on_one_qubit_stay_single_qubit() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut circuit = Circuit::new(1);
        circuit.push_random_gates(50, &mut rng);
        circuit.validate().unwrap();
    }
}
