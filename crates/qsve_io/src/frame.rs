use bitvec::prelude::*;
use num_complex::Complex64;

use crate::fixed_point;
use qsve_common::wire::{AMPLITUDE_BITS, FRAME_BITS, FRAME_END, FRAME_START, PAYLOAD_BITS, UPLOAD_MARKER};

/// One amplitude decoded off the wire, tagged with its position in the
/// transmission. The index restarts at zero for each transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedAmplitude {
    pub index: usize,
    pub value: Complex64,
}

/// Streaming decoder for the engine's amplitude frames.
///
/// Fed one byte at a time. A start marker resets the bit accumulator, a
/// payload byte contributes its low seven bits, and an end marker closes
/// the frame: exactly 70 accumulated bits decode to one fixed-point complex
/// number (the trailing six bits are padding), anything else is discarded
/// as malformed and the stream resumes at the next start marker. Garbage
/// before a start marker is ignored the same way.
#[derive(Debug)]
pub struct FrameDecoder {
    bits: BitVec<u8, Msb0>,
    next_index: usize,
    threshold: f64,
}

impl FrameDecoder {
    /// Creates a decoder that snaps components within `threshold` of zero.
    pub fn new(threshold: f64) -> Self {
        Self {
            bits: BitVec::with_capacity(FRAME_BITS),
            next_index: 0,
            threshold,
        }
    }

    /// Consumes one byte off the wire, yielding an amplitude when it closes
    /// a well-formed frame.
    pub fn push_byte(&mut self, byte: u8) -> Option<DecodedAmplitude> {
        match byte {
            FRAME_START => {
                self.bits.clear();
                None
            }
            FRAME_END => {
                if self.bits.len() != FRAME_BITS {
                    log::warn!(
                        "discarding malformed frame: {} bits accumulated, expected {FRAME_BITS}",
                        self.bits.len()
                    );
                    self.bits.clear();
                    return None;
                }

                let mut raw = 0u64;
                for bit in self.bits[..AMPLITUDE_BITS].iter().by_vals() {
                    raw = (raw << 1) | u64::from(bit);
                }
                self.bits.clear();

                let value = fixed_point::snap(fixed_point::decode_amplitude(raw), self.threshold);
                let index = self.next_index;
                self.next_index += 1;
                Some(DecodedAmplitude { index, value })
            }
            _ => {
                for shift in (0..PAYLOAD_BITS).rev() {
                    self.bits.push((byte >> shift) & 1 == 1);
                }
                None
            }
        }
    }

    /// Bits accumulated towards the current frame.
    pub fn pending_bits(&self) -> usize {
        self.bits.len()
    }

    /// Drops any partial frame and restarts amplitude indexing.
    ///
    /// Invoked by the link layer when the idle threshold declares the
    /// transmission over.
    pub fn reset(&mut self) {
        self.bits.clear();
        self.next_index = 0;
    }
}

/// Brackets a program's instruction bytes with the upload marker.
///
/// The wire image of a `k`-instruction program is exactly `k + 2` bytes.
pub fn encode_program_upload(instructions: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(instructions.len() + 2);
    bytes.push(UPLOAD_MARKER);
    bytes.extend_from_slice(instructions);
    bytes.push(UPLOAD_MARKER);
    bytes
}

/// Encodes one amplitude as a complete frame, as the engine would emit it.
///
/// Tooling/test helper; the hardware is the producer on real links. The 64
/// amplitude bits plus six padding zeros are split into ten 7-bit groups,
/// one payload byte each. A group equal to 0000001 cannot be represented
/// because both candidate bytes are shadowed by the frame markers; callers
/// pick amplitudes that avoid it.
pub fn encode_amplitude_frame(value: Complex64) -> Vec<u8> {
    let raw = fixed_point::encode_amplitude(value);
    let mut bits: BitVec<u8, Msb0> = BitVec::with_capacity(FRAME_BITS);
    for shift in (0..AMPLITUDE_BITS).rev() {
        bits.push((raw >> shift) & 1 == 1);
    }
    bits.resize(FRAME_BITS, false);

    let mut frame = Vec::with_capacity(FRAME_BITS / PAYLOAD_BITS + 2);
    frame.push(FRAME_START);
    for group in bits.chunks(PAYLOAD_BITS) {
        let mut byte = 0u8;
        for bit in group.iter().by_vals() {
            byte = (byte << 1) | u8::from(bit);
        }
        debug_assert_ne!(byte, FRAME_START, "payload group shadowed by frame marker");
        frame.push(byte);
    }
    frame.push(FRAME_END);
    frame
}
