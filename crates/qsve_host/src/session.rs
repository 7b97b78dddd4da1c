//! One-shot link sessions behind the CLI's upload/send/listen commands.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::link::{Link, LinkEvent};
use qsve_io::program_text;

/// Uploads a `.prg` listing, then prints the state vector the engine
/// streams back, until the idle threshold declares the run over.
pub fn upload(addr: &str, program_path: &Path, show_all: bool, threshold: f64) -> Result<()> {
    let listing = fs::read_to_string(program_path)
        .with_context(|| format!("failed to read {}", program_path.display()))?;
    let instructions = program_text::instruction_bytes(&listing)
        .with_context(|| format!("malformed listing {}", program_path.display()))?;

    let mut link = Link::connect(addr, threshold)?;
    link.upload(&instructions)?;
    println!("Uploaded {} instructions", instructions.len());

    print_transmission(&link, show_all)?;
    link.shutdown();
    Ok(())
}

/// Sends a single raw byte, given as an 8-bit binary string.
pub fn send(addr: &str, byte: &str, threshold: f64) -> Result<()> {
    anyhow::ensure!(byte.len() == 8, "{byte:?} is not an 8-bit binary string");
    let value = u8::from_str_radix(byte, 2)
        .with_context(|| format!("{byte:?} is not an 8-bit binary string"))?;

    let mut link = Link::connect(addr, threshold)?;
    link.send_byte(value)?;
    println!("Sent byte {value:08b}");
    link.shutdown();
    Ok(())
}

/// Prints decoded amplitudes as they arrive, until one full transmission
/// has been received.
pub fn listen(addr: &str, show_all: bool, threshold: f64) -> Result<()> {
    let link = Link::connect(addr, threshold)?;
    println!("Listening on {addr}");
    print_transmission(&link, show_all)?;
    link.shutdown();
    Ok(())
}

/// Drains one transmission off the link, printing each amplitude.
///
/// Zero amplitudes are suppressed unless `show_all` is set, mirroring the
/// engine's habit of streaming the entire `2^n` vector even when most of
/// it is zero.
fn print_transmission(link: &Link, show_all: bool) -> Result<()> {
    let mut started = false;
    for event in link.events().iter() {
        match event {
            LinkEvent::Amplitude(amplitude) => {
                if !started {
                    println!("Start of data");
                    started = true;
                }
                if show_all || amplitude.value.re != 0.0 || amplitude.value.im != 0.0 {
                    println!("{} {}", amplitude.index, amplitude.value);
                }
            }
            LinkEvent::EndOfTransmission => {
                println!("End of data");
                return Ok(());
            }
        }
    }
    // The receive loop exited (peer closed or shutdown) before the idle
    // threshold fired; nothing more will arrive.
    Ok(())
}
