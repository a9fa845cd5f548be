// CLI Configuration - Convert CLI args to node config
// Principle: Clear mapping between user input and internal configuration

use crate::cli::RunCmd;
use std::path::PathBuf;
use std::time::Duration;

/// Complete node configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Node name
    pub name: String,

    /// Genesis mode - start a new network in the genesis cycle
    pub genesis_mode: bool,

    /// Cycle length used outside the genesis cycle
    pub cycle_length: u32,

    /// Mesh size reported during the genesis cycle
    pub mesh_size: u32,

    /// Consensus tick interval
    pub tick_interval: Duration,

    /// How many ticks between missing-block sweeps
    pub sweep_every: u32,

    /// Verifier secret seed loaded from the key file, if one was given
    pub key_seed: Option<[u8; 32]>,
}

impl NodeConfig {
    /// Create configuration from CLI run command
    pub fn from_run_cmd(cmd: &RunCmd) -> Result<Self, ConfigError> {
        if cmd.sweep_every == 0 {
            return Err(ConfigError::InvalidSweepPeriod);
        }

        let key_seed = match &cmd.key {
            Some(path) => Some(Self::load_key_seed(path)?),
            None => None,
        };

        // Node names are cosmetic; non-cryptographic randomness is fine here
        let name = cmd.name.clone().unwrap_or_else(|| {
            use rand::Rng;
            let mut rng = rand::thread_rng();
            let adjectives = ["Polar", "Silent", "Steady", "Boreal", "Deep"];
            let nouns = ["Floe", "Crevasse", "Serac", "Moraine", "Cirque"];
            let adj = adjectives[rng.gen_range(0..adjectives.len())];
            let noun = nouns[rng.gen_range(0..nouns.len())];
            let id: u16 = rng.gen();
            format!("{}-{}-{}", adj, noun, id)
        });

        Ok(Self {
            name,
            genesis_mode: cmd.genesis,
            cycle_length: cmd.cycle_length,
            mesh_size: cmd.mesh_size,
            tick_interval: Duration::from_millis(cmd.tick_ms),
            sweep_every: cmd.sweep_every,
            key_seed,
        })
    }

    /// Load a 32-byte secret seed from a key file, JSON or raw hex
    fn load_key_seed(key_path: &PathBuf) -> Result<[u8; 32], ConfigError> {
        let content = std::fs::read_to_string(key_path)
            .map_err(|e| ConfigError::KeyLoadError(format!("Failed to read key file: {}", e)))?;

        // Try to parse as JSON with a secretKey field
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&content) {
            let secret_hex = json
                .get("secretKey")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    ConfigError::KeyLoadError("Key file missing 'secretKey' field".to_string())
                })?;
            return Self::seed_from_hex(secret_hex);
        }

        // Otherwise raw hex
        Self::seed_from_hex(content.trim())
    }

    fn seed_from_hex(hex_str: &str) -> Result<[u8; 32], ConfigError> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let key_bytes = hex::decode(hex_str)
            .map_err(|e| ConfigError::KeyLoadError(format!("Invalid hex: {}", e)))?;

        if key_bytes.len() != 32 {
            return Err(ConfigError::KeyLoadError(format!(
                "Invalid key length: {} bytes",
                key_bytes.len()
            )));
        }

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&key_bytes);
        Ok(seed)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Key load error: {0}")]
    KeyLoadError(String),

    #[error("Sweep period must be at least one tick")]
    InvalidSweepPeriod,
}
