use crate::ValidationError;
use crate::circuit::Circuit;
use crate::decompose::{ElementaryGate, decompose};
use crate::program::Program;
use qsve_common::isa::{AddressAction, Instruction, MatrixKind, Opcode, TimerAction};

/// Caller-controlled knobs of a compilation session.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    /// Bracket the gate stream with timer reset/start/stop instructions so
    /// the engine counts the cycles spent on the computation itself.
    pub timer: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { timer: true }
    }
}

/// Lowers a circuit to an engine program.
///
/// The circuit is validated up front; on success the program is complete and
/// halt-terminated, on failure no instructions exist at all. Layout:
/// a leading no-op (boot delay), the optional timer bracket, the qubit
/// count, the deduplicated gate stream, the four-instruction streaming
/// epilogue that drains all `2^n` amplitudes over serial, and a final halt.
pub fn compile(circuit: &Circuit, options: CompileOptions) -> Result<Program, ValidationError> {
    circuit.validate()?;

    let mut emitter = Emitter::new(circuit.n_qubits());
    emitter.nop();
    if options.timer {
        emitter.timer(TimerAction::Reset);
        emitter.timer(TimerAction::Start);
    }
    emitter.set_qubit_count();

    for op in decompose(circuit.gates()) {
        emitter.apply_gate(op);
    }

    if options.timer {
        emitter.timer(TimerAction::Stop);
    }
    emitter.transmit_state_vector();
    emitter.halt();

    Ok(emitter.finish())
}

/// The compiler's working memory of what the engine has been configured to.
///
/// Mirrors the coprocessor's (target, matrix, control) registers so that a
/// configuration instruction is only emitted when the next gate actually
/// changes something. Lives for one compilation session.
struct EmissionState {
    n_qubits: u8,
    target_qubit: Option<u8>,
    target_matrix: Option<MatrixKind>,
    control_qubit: Option<u8>,
    control_active: bool,
}

struct Emitter {
    program: Program,
    state: EmissionState,
}

impl Emitter {
    fn new(n_qubits: u8) -> Self {
        Self {
            program: Program::default(),
            state: EmissionState {
                n_qubits,
                target_qubit: None,
                target_matrix: None,
                control_qubit: None,
                control_active: false,
            },
        }
    }

    fn finish(self) -> Program {
        self.program
    }

    /// Emits the instruction diff for one elementary gate, then a Calculate.
    ///
    /// Each of target, matrix and control is re-sent only when it differs
    /// from the emission state; a previously active control is deactivated
    /// when the gate has none. This is the compiler's core optimization:
    /// consecutive gates that share parameters cost one instruction each.
    fn apply_gate(&mut self, op: ElementaryGate) {
        if self.state.target_qubit != Some(op.target) {
            self.set_target_qubit(op.target);
        }
        if self.state.target_matrix != Some(op.matrix) {
            self.set_target_matrix(op.matrix);
        }
        match op.control {
            Some(control) => {
                if self.state.control_qubit != Some(control) || !self.state.control_active {
                    self.set_control_qubit(control);
                }
            }
            None => {
                if self.state.control_active {
                    self.deactivate_control();
                }
            }
        }
        self.calculate();
    }

    fn nop(&mut self) {
        self.push(Instruction::new(Opcode::Nop, 0), "Do nothing");
    }

    fn set_qubit_count(&mut self) {
        let n = self.state.n_qubits;
        self.push(
            Instruction::new(Opcode::SetQubitCount, n),
            format!("Set number of qubits to {n}"),
        );
    }

    fn set_target_qubit(&mut self, qubit: u8) {
        self.state.target_qubit = Some(qubit);
        self.push(
            Instruction::new(Opcode::SetTargetQubit, qubit),
            format!("Set target qubit to {qubit}"),
        );
    }

    fn set_target_matrix(&mut self, matrix: MatrixKind) {
        self.state.target_matrix = Some(matrix);
        self.push(
            Instruction::new(Opcode::SetTargetMatrix, matrix as u8),
            format!("Set target matrix to {matrix}"),
        );
    }

    fn set_control_qubit(&mut self, qubit: u8) {
        self.state.control_qubit = Some(qubit);
        self.state.control_active = true;
        self.push(
            Instruction::new(Opcode::SetControlQubit, qubit),
            format!("Set control qubit to {qubit}"),
        );
    }

    fn deactivate_control(&mut self) {
        self.state.control_active = false;
        self.push(
            Instruction::new(Opcode::DeactivateControl, 0),
            "Deactivate control qubit",
        );
    }

    fn calculate(&mut self) {
        self.push(Instruction::new(Opcode::Calculate, 0), "Calculate state vector");
    }

    fn timer(&mut self, action: TimerAction) {
        self.push(
            Instruction::new(Opcode::Timer, action as u8),
            format!("{action} timer"),
        );
    }

    fn set_address_register(&mut self, action: AddressAction) {
        self.push(
            Instruction::new(Opcode::SetAddressRegister, action as u8),
            format!("{action} address register"),
        );
    }

    fn serial_transmit_number(&mut self) {
        self.push(
            Instruction::new(Opcode::SerialTransmitNumber, 0),
            "sends one number with index of addressRegister over serial",
        );
    }

    /// The streaming epilogue: a four-instruction hardware loop that emits
    /// all `2^n` amplitudes without per-amplitude unrolling. The loop
    /// instruction jumps back over SetAddressRegister and
    /// SerialTransmitNumber until the address register saturates.
    fn transmit_state_vector(&mut self) {
        self.set_address_register(AddressAction::Zero);
        self.serial_transmit_number();
        self.set_address_register(AddressAction::Increment);
        self.loop_decrement_pc(3);
    }

    fn loop_decrement_pc(&mut self, n: u8) {
        let limit = (1u32 << self.state.n_qubits) - 1;
        self.push(
            Instruction::new(Opcode::LoopDecrementPc, n),
            format!("Decrement program counter by {n} if value in addressRegister < {limit}"),
        );
    }

    fn halt(&mut self) {
        self.push(Instruction::new(Opcode::Halt, 0), "Halt");
    }

    fn push(&mut self, instruction: Instruction, comment: impl Into<String>) {
        self.program.push(instruction, comment);
    }
}
