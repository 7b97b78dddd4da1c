//! Binary wire-protocol codec and text formats for the state-vector engine.
//!
//! Provides the fixed-point complex-number codec, the byte-framing scheme
//! used in both link directions (program upload and amplitude stream), and
//! the two text formats of the toolchain: the human-readable program
//! listing and the circuit description language the CLI consumes.

/// Fixed-point codec for the engine's 32-bit amplitude components.
///
/// The hardware streams each complex amplitude as two 32-bit fixed-point
/// fields (real, then imaginary) covering `[-2, 2 - 2^-30]`. Encoding is
/// only used by tests and tooling; the engine itself is the producer.
pub mod fixed_point;

/// Framing layer of the serial protocol.
///
/// A streaming decoder for the sentinel-delimited amplitude frames the
/// engine emits, and the encoder that brackets a program upload with its
/// start/end marker bytes.
pub mod frame;

/// The `.prg` program listing format.
///
/// One line per instruction, `<8-bit binary> --<comment>`. A debugging
/// serialization of a compiled program; the upload path parses it back to
/// raw instruction bytes.
pub mod program_text;

/// The circuit description format consumed by the CLI.
///
/// A qubit-count header followed by one gate per line. Round-trips through
/// `render` so generated circuits can be written back out.
pub mod circuit_text;
