mod link;
mod runtime;
mod session;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::path::{Path, PathBuf};

use qsve_common::wire::DEFAULT_SNAP_THRESHOLD;
use qsve_core::circuit::Circuit;
use qsve_core::compiler::{CompileOptions, compile};
use qsve_core::simulator;
use qsve_io::{circuit_text, program_text};

#[derive(Parser)]
#[command(about = "Host toolchain for the FPGA state-vector engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower a circuit description to an engine program listing.
    Compile {
        #[arg(short, long)]
        circuit: PathBuf,
        #[arg(short, long, default_value = "program.prg")]
        out: PathBuf,
        /// Bracket the gate stream with cycle-counting timer instructions.
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        timer: bool,
    },
    /// Run a circuit on the software simulator and print the state vector.
    Sim {
        #[arg(short, long)]
        circuit: PathBuf,
        /// Print zero amplitudes too.
        #[arg(long)]
        all: bool,
    },
    /// Generate a random circuit description.
    Random {
        #[arg(short, long, default_value_t = 3)]
        qubits: u8,
        #[arg(short, long, default_value_t = 10)]
        gates: usize,
        #[arg(short, long, default_value = "random.circ")]
        out: PathBuf,
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Upload a program listing to the engine and print the returned
    /// state vector.
    Upload {
        #[arg(short, long)]
        addr: String,
        #[arg(short, long)]
        program: PathBuf,
        #[arg(long)]
        all: bool,
        #[arg(long, default_value_t = DEFAULT_SNAP_THRESHOLD)]
        threshold: f64,
    },
    /// Send one raw byte, given as an 8-bit binary string.
    Send {
        #[arg(short, long)]
        addr: String,
        #[arg(short, long)]
        byte: String,
    },
    /// Print amplitudes as the engine streams them.
    Listen {
        #[arg(short, long)]
        addr: String,
        #[arg(long)]
        all: bool,
        #[arg(long, default_value_t = DEFAULT_SNAP_THRESHOLD)]
        threshold: f64,
    },
    /// Convert a timer readout (hex cycle count) to wall-clock time.
    Runtime {
        hex: String,
        #[arg(long, default_value_t = runtime::DEFAULT_CLOCK_HZ)]
        clk_hz: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Compile {
            circuit,
            out,
            timer,
        } => cmd_compile(&circuit, &out, timer),
        Commands::Sim { circuit, all } => cmd_sim(&circuit, all),
        Commands::Random {
            qubits,
            gates,
            out,
            seed,
        } => cmd_random(qubits, gates, &out, seed),
        Commands::Upload {
            addr,
            program,
            all,
            threshold,
        } => session::upload(&addr, &program, all, threshold),
        Commands::Send { addr, byte } => session::send(&addr, &byte, DEFAULT_SNAP_THRESHOLD),
        Commands::Listen {
            addr,
            all,
            threshold,
        } => session::listen(&addr, all, threshold),
        Commands::Runtime { hex, clk_hz } => runtime::report(&hex, clk_hz),
    }
}

fn load_circuit(path: &Path) -> Result<Circuit> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    circuit_text::parse(&text).with_context(|| format!("invalid circuit {}", path.display()))
}

fn cmd_compile(circuit_path: &Path, out: &Path, timer: bool) -> Result<()> {
    let circuit = load_circuit(circuit_path)?;
    let program = compile(&circuit, CompileOptions { timer })?;
    fs::write(out, program_text::render(&program))
        .with_context(|| format!("failed to write {}", out.display()))?;
    println!(
        "Compiled {} gates on {} qubits to {} instructions ({})",
        circuit.len(),
        circuit.n_qubits(),
        program.len(),
        out.display()
    );
    Ok(())
}

fn cmd_sim(circuit_path: &Path, all: bool) -> Result<()> {
    let circuit = load_circuit(circuit_path)?;
    let state = simulator::run(&circuit)?;
    for (index, amplitude) in state.amplitudes().iter().enumerate() {
        if all || amplitude.re != 0.0 || amplitude.im != 0.0 {
            println!("{index} {amplitude}");
        }
    }
    Ok(())
}

fn cmd_random(qubits: u8, gates: usize, out: &Path, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let mut circuit = Circuit::new(qubits);
    circuit.push_random_gates(gates, &mut rng);
    circuit.validate()?;
    fs::write(out, circuit_text::render(&circuit))
        .with_context(|| format!("failed to write {}", out.display()))?;
    println!("Wrote a {gates}-gate circuit on {qubits} qubits to {}", out.display());
    Ok(())
}
