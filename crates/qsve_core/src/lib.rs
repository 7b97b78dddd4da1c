//! Core circuit lowering and simulation for the state-vector engine.
//!
//! This crate provides the gate-circuit intermediate representation, the
//! shared CCNOT decomposition, the ISA code generator that lowers circuits
//! to engine instruction streams, and the software state-vector simulator
//! used as an independent oracle for the generated programs. Compiler and
//! simulator consume the same decomposed gate stream, so both realize the
//! same unitary by construction.

use thiserror::Error;

/// Gate-circuit intermediate representation.
///
/// A circuit is an ordered gate list plus a qubit count, built incrementally
/// by append and consumed read-only by the decomposer, the compiler and the
/// simulator.
pub mod circuit;

/// Lowering of the circuit IR to elementary gates.
///
/// Rewrites every gate into the {H, X, T, controlled-X} set the engine
/// executes, including the fixed relative-phase Toffoli expansion of CCNOT.
/// This is the single source of gate semantics shared by the compiler and
/// the simulator.
pub mod decompose;

/// The ISA code generator.
///
/// Lowers a decomposed gate stream into an engine instruction stream,
/// tracking the coprocessor's configured target, matrix and control in an
/// emission state so that redundant configuration instructions are never
/// emitted.
pub mod compiler;

/// The compiled program: an ordered instruction stream with per-instruction
/// listing comments, finalized by a halt instruction.
pub mod program;

/// Software state-vector simulator.
///
/// Applies the same elementary-gate semantics as the engine directly to a
/// complex amplitude array via bit-indexed pair selection. Deterministic and
/// side-effect free; used to validate compiled programs against an
/// independent implementation of the same operator.
pub mod simulator;

/// Rejection of an ill-formed circuit.
///
/// Raised by both [`compiler::compile`] and [`simulator::run`] before any
/// instruction is emitted or any amplitude mutated, so an error never leaves
/// a partial program or a half-evolved state behind. Each variant names the
/// offending gate by its position in the circuit.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The qubit count is outside `1..=14`.
    ///
    /// The hardware count field is four bits wide, and a zero-qubit engine
    /// run is meaningless, so zero is rejected as well.
    #[error("qubit count {count} is outside the supported range 1..={max}", max = qsve_common::isa::MAX_QUBITS)]
    QubitCountOutOfRange { count: u8 },

    /// A gate references a qubit at or above the circuit's qubit count.
    #[error("gate {gate_index}: qubit {qubit} is out of range for a {n_qubits}-qubit circuit")]
    QubitOutOfRange {
        gate_index: usize,
        qubit: u8,
        n_qubits: u8,
    },

    /// A controlled gate names its own target as a control.
    #[error("gate {gate_index}: control qubit {qubit} equals the target qubit")]
    ControlEqualsTarget { gate_index: usize, qubit: u8 },

    /// A CCNOT names the same qubit as both controls.
    #[error("gate {gate_index}: control qubits must be distinct, both are {qubit}")]
    DuplicateControls { gate_index: usize, qubit: u8 },
}
