//! Common definitions shared across the state-vector engine toolchain.
//!
//! This crate defines the instruction set architecture of the FPGA-resident
//! state-vector engine and the constants of its serial wire protocol. The
//! compiler, the binary codec, and the host link all encode against these
//! definitions; they must match the hardware bit-for-bit.

/// Instruction set architecture of the state-vector engine.
///
/// Every instruction is a single byte: a 4-bit opcode in the high nibble and
/// a 4-bit parameter in the low nibble. The opcode space is fixed and closed;
/// the engine is a fixed-function coprocessor and ignores reserved encodings.
pub mod isa {
    use core::fmt;

    /// Largest qubit count the engine supports.
    ///
    /// The parameter field of [`Opcode::SetQubitCount`] is four bits wide, so
    /// the count is capped at 14 to keep `2^n` amplitude addresses plus the
    /// address-register sentinel value representable on the hardware side.
    pub const MAX_QUBITS: u8 = 14;

    /// Operation codes understood by the engine.
    ///
    /// The numeric values are the 4-bit encodings placed in the high nibble
    /// of an instruction byte. Encodings 0101, 0110, 1010 and 1111 are
    /// reserved and never emitted.
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Opcode {
        /// Do nothing for one cycle.
        ///
        /// Also emitted as the first instruction of every program to give
        /// the engine time to come out of reset before configuration starts.
        Nop = 0b0000,
        /// Set the number of qubits. Parameter: unsigned count, 1 to 14.
        SetQubitCount = 0b0001,
        /// Set the target qubit. Parameter: unsigned qubit index.
        SetTargetQubit = 0b0010,
        /// Select the 2x2 unitary applied on the next Calculate.
        /// Parameter: a [`MatrixKind`] encoding.
        SetTargetMatrix = 0b0011,
        /// Apply the configured (target, matrix, control) to the state vector.
        Calculate = 0b0100,
        /// Transmit the amplitude at the current address-register index
        /// over the serial link, framed as one fixed-point complex number.
        SerialTransmitNumber = 0b0111,
        /// Modify the address register. Parameter: an [`AddressAction`].
        SetAddressRegister = 0b1000,
        /// Move the program counter back by `parameter` instructions while
        /// the address register is below `2^n - 1`, else fall through.
        /// The engine's sole control-flow primitive.
        LoopDecrementPc = 0b1001,
        /// Stop execution.
        Halt = 0b1011,
        /// Control the cycle-count timer. Parameter: a [`TimerAction`].
        Timer = 0b1100,
        /// Set the control qubit and activate control mode.
        /// Parameter: unsigned qubit index.
        SetControlQubit = 0b1101,
        /// Deactivate control mode.
        DeactivateControl = 0b1110,
    }

    impl Opcode {
        /// Decodes a 4-bit opcode value. Reserved encodings yield `None`.
        pub fn from_bits(bits: u8) -> Option<Self> {
            Some(match bits {
                0b0000 => Self::Nop,
                0b0001 => Self::SetQubitCount,
                0b0010 => Self::SetTargetQubit,
                0b0011 => Self::SetTargetMatrix,
                0b0100 => Self::Calculate,
                0b0111 => Self::SerialTransmitNumber,
                0b1000 => Self::SetAddressRegister,
                0b1001 => Self::LoopDecrementPc,
                0b1011 => Self::Halt,
                0b1100 => Self::Timer,
                0b1101 => Self::SetControlQubit,
                0b1110 => Self::DeactivateControl,
                _ => return None,
            })
        }
    }

    /// The three elementary 2x2 unitaries realized in hardware.
    ///
    /// The numeric values are the parameter encodings of
    /// [`Opcode::SetTargetMatrix`]. A controlled-X is the same `X` encoding
    /// executed with control mode active; every other gate the toolchain
    /// accepts is decomposed into these.
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MatrixKind {
        H = 0b0001,
        T = 0b0010,
        X = 0b0011,
    }

    impl MatrixKind {
        pub fn from_param(bits: u8) -> Option<Self> {
            Some(match bits {
                0b0001 => Self::H,
                0b0010 => Self::T,
                0b0011 => Self::X,
                _ => return None,
            })
        }
    }

    impl fmt::Display for MatrixKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(match self {
                Self::H => "H",
                Self::T => "T",
                Self::X => "X",
            })
        }
    }

    /// Parameter encodings of [`Opcode::SetAddressRegister`].
    ///
    /// Any parameter other than zero, increment or decrement sets the
    /// register to `2^n`; `Max` carries the canonical encoding for that.
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum AddressAction {
        /// Reset the register to zero.
        Zero = 0b0000,
        /// Set the register to `2^n`.
        Max = 0b0001,
        /// Increment the register by one.
        Increment = 0b0010,
        /// Decrement the register by one.
        Decrement = 0b0011,
    }

    impl AddressAction {
        pub fn from_param(bits: u8) -> Self {
            match bits {
                0b0000 => Self::Zero,
                0b0010 => Self::Increment,
                0b0011 => Self::Decrement,
                _ => Self::Max,
            }
        }
    }

    impl fmt::Display for AddressAction {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(match self {
                Self::Zero => "zero",
                Self::Max => "max",
                Self::Increment => "increment",
                Self::Decrement => "decrement",
            })
        }
    }

    /// Parameter encodings of [`Opcode::Timer`].
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TimerAction {
        Reset = 0b0000,
        Start = 0b0001,
        Stop = 0b0010,
    }

    impl fmt::Display for TimerAction {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(match self {
                Self::Reset => "reset",
                Self::Start => "start",
                Self::Stop => "stop",
            })
        }
    }

    /// One engine instruction: 4-bit opcode, 4-bit parameter, packed
    /// MSB-first into a single byte.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Instruction(pub u8);

    impl Instruction {
        /// Packs an opcode and a 4-bit parameter. Parameter bits above the
        /// field width are masked off.
        pub fn new(opcode: Opcode, param: u8) -> Self {
            Self(((opcode as u8) << 4) | (param & 0x0F))
        }

        /// The raw instruction byte as sent on the wire.
        pub fn byte(self) -> u8 {
            self.0
        }

        /// The decoded opcode, or `None` for a reserved encoding.
        pub fn opcode(self) -> Option<Opcode> {
            Opcode::from_bits(self.0 >> 4)
        }

        /// The 4-bit parameter field.
        pub fn param(self) -> u8 {
            self.0 & 0x0F
        }
    }

    impl fmt::Display for Instruction {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:08b}", self.0)
        }
    }
}

/// Constants of the serial wire protocol.
///
/// Two independent directions share the link: program upload (host to
/// engine) and the amplitude stream (engine to host). Each has its own
/// sentinel bytes; nothing else about the two directions overlaps.
pub mod wire {
    use core::time::Duration;

    /// Sentinel byte bracketing a program upload on both ends.
    pub const UPLOAD_MARKER: u8 = 0b1111_1111;

    /// Start-of-number marker in the amplitude stream. Resets the
    /// receiver's bit accumulator.
    pub const FRAME_START: u8 = 0b0000_0001;

    /// End-of-number marker in the amplitude stream. Closes the frame.
    pub const FRAME_END: u8 = 0b1000_0001;

    /// Usable bits per payload byte of an amplitude frame.
    pub const PAYLOAD_BITS: usize = 7;

    /// Bits accumulated by a well-formed frame: ten payload bytes of seven
    /// bits each. Any other length at [`FRAME_END`] is malformed.
    pub const FRAME_BITS: usize = 70;

    /// Meaningful bits of a frame: one fixed-point complex number. The
    /// trailing `FRAME_BITS - AMPLITUDE_BITS` bits are padding.
    pub const AMPLITUDE_BITS: usize = 64;

    /// Width of one fixed-point component (real or imaginary).
    pub const COMPONENT_BITS: usize = 32;

    /// Silence on the link longer than this while a transmission is in
    /// progress is treated as end-of-transmission.
    pub const IDLE_TIMEOUT: Duration = Duration::from_millis(500);

    /// Default threshold below which a decoded component is snapped to zero.
    pub const DEFAULT_SNAP_THRESHOLD: f64 = 1e-9;
}
