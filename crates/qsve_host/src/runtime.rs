//! Conversion of the engine's timer readout to wall-clock time.
//!
//! The timer instructions make the engine count the clock cycles spent on
//! the bracketed gate stream; the count is read back as a hex word. With
//! the clock frequency known, that converts directly to seconds.

use anyhow::{Context, Result};

/// Default engine clock in Hz.
pub const DEFAULT_CLOCK_HZ: u64 = 100_000_000;

/// Converts a hex cycle count to seconds at the given clock frequency.
pub fn cycles_to_seconds(hex_cycles: &str, clock_hz: u64) -> Result<f64> {
    let cycles = u64::from_str_radix(hex_cycles.trim_start_matches("0x"), 16)
        .with_context(|| format!("{hex_cycles:?} is not a hex cycle count"))?;
    anyhow::ensure!(clock_hz > 0, "clock frequency must be nonzero");
    Ok(cycles as f64 / clock_hz as f64)
}

/// Prints a run-time report for a timer readout.
pub fn report(hex_cycles: &str, clock_hz: u64) -> Result<()> {
    let seconds = cycles_to_seconds(hex_cycles, clock_hz)?;
    println!("Clock frequency: {} MHz", clock_hz as f64 / 1e6);
    println!("Program took {seconds} s ({} ms) to run", seconds * 1e3);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_cycles_at_the_default_clock() {
        // 0x5F5E100 cycles = 100_000_000 cycles = 1 s at 100 MHz.
        let seconds = cycles_to_seconds("5F5E100", DEFAULT_CLOCK_HZ).unwrap();
        assert_eq!(seconds, 1.0);
    }

    #[test]
    fn accepts_a_0x_prefix() {
        let seconds = cycles_to_seconds("0x64", 100).unwrap();
        assert_eq!(seconds, 1.0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(cycles_to_seconds("xyz", DEFAULT_CLOCK_HZ).is_err());
        assert!(cycles_to_seconds("64", 0).is_err());
    }
}
