use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

use crate::ValidationError;
use crate::circuit::Circuit;
use crate::decompose::{ElementaryGate, decompose};
use qsve_common::isa::MatrixKind;

/// The complex amplitude array of an `n`-qubit register.
///
/// Index bit `i` is the value of qubit `i` (bit 0 = qubit 0, no bit
/// reversal). Allocated once per run at length `2^n` and mutated
/// gate-by-gate in place.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    n_qubits: u8,
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    /// The all-zero basis state `|0...0>`.
    pub fn new(n_qubits: u8) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << n_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            n_qubits,
            amplitudes,
        }
    }

    pub fn n_qubits(&self) -> u8 {
        self.n_qubits
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Squared magnitude of each amplitude, for measurement-style reporting.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Applies one elementary gate in place.
    ///
    /// Walks the `2^(n-1)` index pairs that differ only in bit `target` and
    /// multiplies each pair by the 2x2 unitary. For a controlled gate only
    /// pairs whose control bit is set are written; the control bit is the
    /// same for both halves of a pair since `control != target`, so a pair
    /// updates or stays together.
    pub fn apply(&mut self, op: ElementaryGate) {
        let u = matrix(op.matrix);
        for i in 0..self.amplitudes.len() / 2 {
            let (a, b) = pair_indices(i, op.target);
            if let Some(control) = op.control {
                if (a >> control) & 1 == 0 {
                    continue;
                }
            }
            let amp_a = self.amplitudes[a];
            let amp_b = self.amplitudes[b];
            self.amplitudes[a] = u[0][0] * amp_a + u[0][1] * amp_b;
            self.amplitudes[b] = u[1][0] * amp_a + u[1][1] * amp_b;
        }
    }
}

/// Runs a circuit from `|0...0>` and returns the resulting state vector.
///
/// Validates the circuit exactly as the compiler does, then applies the
/// same decomposed gate stream the compiler lowers, so simulator and
/// compiled program realize the same operator. Pure function of the
/// circuit; the input is never mutated.
pub fn run(circuit: &Circuit) -> Result<StateVector, ValidationError> {
    circuit.validate()?;
    let mut state = StateVector::new(circuit.n_qubits());
    for op in decompose(circuit.gates()) {
        state.apply(op);
    }
    Ok(state)
}

/// The index pair `(a, b)` of the `i`-th pair differing only in bit
/// `target`.
///
/// `a` keeps the low `target` bits of `i`, shifts the remaining bits up by
/// one and leaves bit `target` clear; `b` sets it. Over
/// `i in 0..2^(n-1)` this partitions all `2^n` indices into `2^(n-1)`
/// disjoint pairs, for every `target` and every `n`.
pub fn pair_indices(i: usize, target: u8) -> (usize, usize) {
    let mask = (1usize << target) - 1;
    let a = ((i & !mask) << 1) | (i & mask);
    (a, a | (1 << target))
}

fn matrix(kind: MatrixKind) -> [[Complex64; 2]; 2] {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    match kind {
        MatrixKind::H => [[h, h], [h, -h]],
        MatrixKind::X => [
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        ],
        MatrixKind::T => [
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::from_polar(1.0, FRAC_PI_4)],
        ],
    }
}
