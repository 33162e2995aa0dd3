use anyhow::{Context, Result};
use caramba_inbound::ValidationPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_PATHS: [&str; 2] = ["/etc/caramba/synth.toml", "./synth.toml"];

/// Host policy for the synthesizer: which ports belong to other services
/// and how short a user-supplied secret may be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthConfig {
    #[serde(default = "default_reserved_ports")]
    pub reserved_ports: Vec<u16>,
    #[serde(default = "default_min_secret_len")]
    pub min_secret_len: usize,
}

fn default_reserved_ports() -> Vec<u16> {
    ValidationPolicy::default().reserved_ports.into_iter().collect()
}

fn default_min_secret_len() -> usize {
    ValidationPolicy::default().min_secret_len
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            reserved_ports: default_reserved_ports(),
            min_secret_len: default_min_secret_len(),
        }
    }
}

impl SynthConfig {
    /// An explicit path must exist. Otherwise the first readable file of
    /// `/etc/caramba/synth.toml` and `./synth.toml` wins, falling back to
    /// the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for path in CONFIG_PATHS {
            if let Ok(contents) = fs::read_to_string(path) {
                tracing::info!("Loading config from {}", path);
                return toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path));
            }
        }

        tracing::debug!("No config file found, reading environment");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        tracing::info!("Loading config from {}", path.display());
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Builds the config from `SYNTH_RESERVED_PORTS` (comma separated) and
    /// `SYNTH_MIN_SECRET_LEN`. Unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("SYNTH_RESERVED_PORTS") {
            config.reserved_ports = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<u16>().with_context(|| format!("SYNTH_RESERVED_PORTS: bad port {:?}", s)))
                .collect::<Result<_>>()?;
        }
        if let Some(raw) = lookup("SYNTH_MIN_SECRET_LEN") {
            config.min_secret_len = raw
                .trim()
                .parse()
                .with_context(|| format!("SYNTH_MIN_SECRET_LEN: not a number: {:?}", raw))?;
        }
        Ok(config)
    }

    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            reserved_ports: self.reserved_ports.iter().copied().collect(),
            min_secret_len: self.min_secret_len,
        }
    }
}
