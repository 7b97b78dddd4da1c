//! End-to-end upload path: compile, render the listing, parse it back and
//! frame it for the wire, as the host does when uploading a `.prg` file.

use qsve_core::circuit::Circuit;
use qsve_core::compiler::{CompileOptions, compile};
use qsve_io::{frame, program_text};

#[test]
fn compiled_listing_uploads_as_k_plus_two_bytes() {
    let mut circuit = Circuit::new(3);
    circuit.h(0);
    circuit.ccnot(2, 0, 1);
    circuit.cnot(1, 2);
    let program = compile(&circuit, CompileOptions::default()).unwrap();

    let listing = program_text::render(&program);
    let bytes = program_text::instruction_bytes(&listing).unwrap();
    assert_eq!(bytes, program.bytes());

    let wire = frame::encode_program_upload(&bytes);
    assert_eq!(wire.len(), program.len() + 2);
    assert_eq!(&wire[1..wire.len() - 1], &bytes[..]);
}
