//! Duplex byte link to the engine's serial bridge.
//!
//! The physical serial adapter is exposed to the host as a TCP endpoint;
//! this module owns the connection and splits it into the two activities
//! the protocol needs: a background receive loop that drains bytes into the
//! frame decoder as they arrive, and a caller-driven issue path for uploads
//! and single-byte sends. The two never block each other; decoded
//! amplitudes come back to the caller over a channel.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use qsve_io::frame::{DecodedAmplitude, FrameDecoder, encode_program_upload};
use qsve_common::wire::IDLE_TIMEOUT;

/// Events the receive loop reports back to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkEvent {
    /// One amplitude decoded off the wire.
    Amplitude(DecodedAmplitude),
    /// The link went quiet past the idle threshold while a transmission
    /// was in progress; the decoder has been reset.
    EndOfTransmission,
}

/// A live connection to the engine bridge.
///
/// Writes go through the owned stream handle and are caller-serialized;
/// reads happen on a background thread that runs until `shutdown` or until
/// the peer closes the connection. Termination is cooperative: a shared
/// flag plus join, no polling loops beyond the read timeout tick.
pub struct Link {
    stream: TcpStream,
    events: Receiver<LinkEvent>,
    running: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

/// Read timeout of the receive loop. Short enough to notice shutdown and
/// the idle threshold promptly, long enough to stay off the scheduler.
const READ_TICK: Duration = Duration::from_millis(50);

impl Link {
    /// Connects to the bridge and starts the receive loop.
    pub fn connect(addr: &str, snap_threshold: f64) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .with_context(|| format!("failed to connect to engine bridge at {addr}"))?;
        stream.set_nodelay(true)?;

        let reader_stream = stream.try_clone().context("failed to clone link stream")?;
        reader_stream.set_read_timeout(Some(READ_TICK))?;

        let running = Arc::new(AtomicBool::new(true));
        let (tx, rx) = unbounded();
        let reader_running = running.clone();
        let reader = thread::spawn(move || {
            receive_loop(reader_stream, tx, reader_running, snap_threshold);
        });

        Ok(Self {
            stream,
            events: rx,
            running,
            reader: Some(reader),
        })
    }

    /// Decoded amplitudes and end-of-transmission events, in arrival order.
    pub fn events(&self) -> &Receiver<LinkEvent> {
        &self.events
    }

    /// Uploads a program's instruction bytes, bracketed by the upload
    /// marker. Not resumable: any write error aborts the whole upload.
    pub fn upload(&mut self, instructions: &[u8]) -> Result<()> {
        let wire = encode_program_upload(instructions);
        self.stream
            .write_all(&wire)
            .context("upload aborted: write to engine bridge failed")?;
        self.stream.flush()?;
        log::info!(
            "uploaded {} instructions ({} bytes on the wire)",
            instructions.len(),
            wire.len()
        );
        Ok(())
    }

    /// Sends one raw byte down the link.
    pub fn send_byte(&mut self, byte: u8) -> Result<()> {
        self.stream
            .write_all(&[byte])
            .context("write to engine bridge failed")?;
        self.stream.flush()?;
        Ok(())
    }

    /// Stops the receive loop and joins it.
    pub fn shutdown(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

fn receive_loop(
    mut stream: TcpStream,
    events: Sender<LinkEvent>,
    running: Arc<AtomicBool>,
    snap_threshold: f64,
) {
    let mut decoder = FrameDecoder::new(snap_threshold);
    let mut buffer = [0u8; 512];
    let mut last_data = Instant::now();
    let mut transmitting = false;

    while running.load(Ordering::Relaxed) {
        match stream.read(&mut buffer) {
            Ok(0) => {
                log::info!("engine bridge closed the connection");
                break;
            }
            Ok(n) => {
                if !transmitting {
                    log::debug!("start of transmission");
                    transmitting = true;
                }
                last_data = Instant::now();
                for &byte in &buffer[..n] {
                    if let Some(amplitude) = decoder.push_byte(byte) {
                        if events.send(LinkEvent::Amplitude(amplitude)).is_err() {
                            return;
                        }
                    }
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                if transmitting && last_data.elapsed() > IDLE_TIMEOUT {
                    log::debug!("idle threshold reached, end of transmission");
                    transmitting = false;
                    decoder.reset();
                    if events.send(LinkEvent::EndOfTransmission).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                // Transient or fatal is the channel's business; the loop
                // resets frame state and keeps draining until shutdown.
                log::error!("read from engine bridge failed: {e}");
                transmitting = false;
                decoder.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use qsve_io::frame::encode_amplitude_frame;
    use std::net::TcpListener;

    /// Spawns a fake bridge that writes `payload` to the first client.
    fn fake_bridge(payload: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            socket.write_all(&payload).unwrap();
            // Keep the socket open past the idle threshold so the timeout,
            // not the disconnect, ends the transmission.
            thread::sleep(IDLE_TIMEOUT * 3);
        });
        addr
    }

    #[test]
    fn decodes_a_streamed_state_vector() {
        let amplitudes = [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.25)];
        let mut payload = Vec::new();
        for &a in &amplitudes {
            payload.extend(encode_amplitude_frame(a));
        }

        let addr = fake_bridge(payload);
        let link = Link::connect(&addr, 1e-9).unwrap();

        for (index, &expected) in amplitudes.iter().enumerate() {
            match link.events().recv_timeout(Duration::from_secs(5)).unwrap() {
                LinkEvent::Amplitude(got) => {
                    assert_eq!(got.index, index);
                    assert_eq!(got.value, expected);
                }
                other => panic!("expected amplitude, got {other:?}"),
            }
        }

        // Silence past the idle threshold ends the transmission.
        let event = link
            .events()
            .recv_timeout(IDLE_TIMEOUT * 4)
            .unwrap();
        assert_eq!(event, LinkEvent::EndOfTransmission);
        link.shutdown();
    }

    #[test]
    fn upload_sends_the_bracketed_program() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut received = vec![0u8; 5];
            socket.read_exact(&mut received).unwrap();
            received
        });

        let mut link = Link::connect(&addr, 1e-9).unwrap();
        link.upload(&[0x00, 0x12, 0xB0]).unwrap();
        let received = server.join().unwrap();
        assert_eq!(received, vec![0xFF, 0x00, 0x12, 0xB0, 0xFF]);
        link.shutdown();
    }
}
