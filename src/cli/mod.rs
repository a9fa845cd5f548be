// CLI - Command Line Interface for the Glacier node
// Principle: Simple, clear, composable commands

pub mod config;
pub mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Glacier verifier node - freezes one block per height
#[derive(Parser, Debug)]
#[command(name = "glacier-node")]
#[command(author = "Glacier Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Glacier verifier node - unfrozen-block consensus core")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the verifier node
    Run(RunCmd),

    /// Key management
    Key(KeyCmd),
}

/// Arguments for the run command
#[derive(clap::Args, Debug)]
pub struct RunCmd {
    /// Node name (random if omitted)
    #[arg(long)]
    pub name: Option<String>,

    /// Start a new network in the genesis cycle
    #[arg(long, default_value = "false")]
    pub genesis: bool,

    /// Verifier key file (JSON or raw hex); a fresh key is generated if omitted
    #[arg(long)]
    pub key: Option<PathBuf>,

    /// Cycle length used outside the genesis cycle
    #[arg(long, default_value = "8")]
    pub cycle_length: u32,

    /// Mesh size reported during the genesis cycle
    #[arg(long, default_value = "4")]
    pub mesh_size: u32,

    /// Consensus tick interval in milliseconds
    #[arg(long, default_value = "1000")]
    pub tick_ms: u64,

    /// How many ticks between missing-block sweeps
    #[arg(long, default_value = "4")]
    pub sweep_every: u32,
}

#[derive(clap::Args, Debug)]
pub struct KeyCmd {
    #[command(subcommand)]
    pub subcommand: KeySubcommand,
}

#[derive(Subcommand, Debug)]
pub enum KeySubcommand {
    /// Generate a new verifier keypair
    Generate {
        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json or hex
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Inspect a key given as hex
    Inspect {
        /// Secret key as hex (with or without 0x prefix)
        key: String,
    },
}
