use num_complex::Complex64;
use qsve_common::wire::COMPONENT_BITS;

/// Fractional bits of one component. The field reads as a two's-complement
/// integer scaled by `2^-30`: the sign bit contributes -2 when set, and the
/// bit at position `i` below it contributes `2^-i` counting from the top.
pub const FRACTIONAL_BITS: u32 = 30;

/// Smallest representable step.
pub const RESOLUTION: f64 = 1.0 / (1u64 << FRACTIONAL_BITS) as f64;

/// Decodes one 32-bit component field.
///
/// Range `[-2, 2 - 2^-30]`. The bit-wise rule (sign bit worth -2, bit
/// `i + 1` from the top worth `2^-i`) is exactly two's-complement
/// interpretation divided by `2^30`.
pub fn decode_component(field: u32) -> f64 {
    (field as i32) as f64 * RESOLUTION
}

/// Encodes a value to the nearest representable component field, clamped to
/// the representable range.
pub fn encode_component(value: f64) -> u32 {
    let scaled = (value / RESOLUTION).round();
    scaled.clamp(i32::MIN as f64, i32::MAX as f64) as i32 as u32
}

/// Decodes a 64-bit amplitude: the first (most significant) 32 bits are the
/// real component, the remaining 32 the imaginary one.
pub fn decode_amplitude(bits: u64) -> Complex64 {
    let real = decode_component((bits >> COMPONENT_BITS) as u32);
    let imaginary = decode_component(bits as u32);
    Complex64::new(real, imaginary)
}

/// Encodes an amplitude as a 64-bit field, real component first.
pub fn encode_amplitude(value: Complex64) -> u64 {
    ((encode_component(value.re) as u64) << COMPONENT_BITS) | encode_component(value.im) as u64
}

/// Snaps components within `threshold` of zero to exactly zero.
///
/// The engine's fixed-point arithmetic leaves tiny residues on amplitudes
/// that are analytically zero; readout applies this before reporting.
pub fn snap(value: Complex64, threshold: f64) -> Complex64 {
    let clean = |c: f64| if c.abs() < threshold { 0.0 } else { c };
    Complex64::new(clean(value.re), clean(value.im))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The bit-sum definition of the format, written out literally.
    fn decode_by_bit_rule(field: u32) -> f64 {
        let mut value = if field & (1 << 31) != 0 { -2.0 } else { 0.0 };
        for i in 0..31u32 {
            if field & (1 << (30 - i)) != 0 {
                value += 2.0_f64.powi(-(i as i32));
            }
        }
        value
    }

    #[test]
    fn decode_matches_the_bit_rule() {
        for field in [
            0x0000_0000,
            0x4000_0000, // 1.0
            0x8000_0000, // -2.0
            0xC000_0000, // -1.0
            0x2000_0000, // 0.5
            0x7FFF_FFFF, // 2 - 2^-30
            0x0000_0001, // 2^-30
            0xDEAD_BEEF,
            0x1234_5678,
        ] {
            assert_eq!(decode_component(field), decode_by_bit_rule(field));
        }
    }

    #[test]
    fn extremes_of_the_range() {
        assert_eq!(decode_component(0x8000_0000), -2.0);
        assert_eq!(decode_component(0x7FFF_FFFF), 2.0 - RESOLUTION);
    }

    #[test]
    fn encode_decode_round_trips_on_the_grid() {
        for value in [0.0, 1.0, -1.0, 0.5, -2.0, 2.0 - RESOLUTION, 0.125, -0.75] {
            assert_eq!(decode_component(encode_component(value)), value);
        }
    }

    #[test]
    fn encode_rounds_to_the_nearest_step() {
        let value = 0.3;
        let decoded = decode_component(encode_component(value));
        assert!((decoded - value).abs() <= RESOLUTION / 2.0);
    }

    #[test]
    fn encode_clamps_out_of_range_values() {
        assert_eq!(encode_component(3.0), 0x7FFF_FFFF);
        assert_eq!(encode_component(-3.0), 0x8000_0000);
    }

    #[test]
    fn amplitude_places_real_in_the_high_half() {
        let amplitude = Complex64::new(1.0, -0.5);
        let bits = encode_amplitude(amplitude);
        assert_eq!((bits >> 32) as u32, encode_component(1.0));
        assert_eq!(bits as u32, encode_component(-0.5));
        assert_eq!(decode_amplitude(bits), amplitude);
    }

    #[test]
    fn snap_zeroes_small_components_independently() {
        let value = Complex64::new(1e-12, 0.25);
        let snapped = snap(value, 1e-9);
        assert_eq!(snapped, Complex64::new(0.0, 0.25));
    }
}
