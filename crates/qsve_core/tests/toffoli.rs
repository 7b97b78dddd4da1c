//! Cross-checks the relative-phase CCNOT decomposition against the
//! matrix-defined Toffoli on every computational basis input.

use qsve_core::circuit::Circuit;
use qsve_core::simulator::run;

/// Applies the textbook Toffoli truth table to a 3-bit basis index:
/// the target bit flips when both control bits are set.
fn toffoli_truth(index: usize, target: u8, control1: u8, control2: u8) -> usize {
    if (index >> control1) & 1 == 1 && (index >> control2) & 1 == 1 {
        index ^ (1 << target)
    } else {
        index
    }
}

#[test]
fn ccnot_reproduces_the_toffoli_truth_table() {
    for basis in 0..8usize {
        let mut circuit = Circuit::new(3);
        // Prepare |basis> with X gates, then apply the CCNOT under test.
        for qubit in 0..3u8 {
            if (basis >> qubit) & 1 == 1 {
                circuit.x(qubit);
            }
        }
        circuit.ccnot(0, 1, 2);

        let probabilities = run(&circuit).unwrap().probabilities();
        let expected = toffoli_truth(basis, 0, 1, 2);

        for (index, p) in probabilities.iter().enumerate() {
            let want = if index == expected { 1.0 } else { 0.0 };
            assert!(
                (p - want).abs() < 1e-9,
                "input |{basis:03b}>: probability of |{index:03b}> is {p}, expected {want}"
            );
        }
    }
}

#[test]
fn ccnot_respects_arbitrary_operand_order() {
    // Same truth-table check with the target in the middle of the register.
    for basis in 0..8usize {
        let mut circuit = Circuit::new(3);
        for qubit in 0..3u8 {
            if (basis >> qubit) & 1 == 1 {
                circuit.x(qubit);
            }
        }
        circuit.ccnot(1, 2, 0);

        let probabilities = run(&circuit).unwrap().probabilities();
        let expected = toffoli_truth(basis, 1, 2, 0);
        assert!(
            (probabilities[expected] - 1.0).abs() < 1e-9,
            "input |{basis:03b}> did not map to |{expected:03b}>"
        );
    }
}

#[test]
fn compiled_and_simulated_gate_streams_are_identical() {
    // The compiler and the simulator must lower CCNOT through the same
    // shared decomposition; this pins the shared test vector.
    use qsve_core::circuit::Gate;
    use qsve_core::decompose::decompose;

    let ops = decompose(&[Gate::Ccnot {
        target: 0,
        control1: 1,
        control2: 2,
    }]);
    assert_eq!(ops.len(), 21);
    assert_eq!(ops.iter().filter(|op| op.control.is_some()).count(), 6);
}
