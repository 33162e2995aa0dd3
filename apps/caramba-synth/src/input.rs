use anyhow::{Context, Result, bail};
use caramba_inbound::InboundSpec;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SpecFile {
    #[serde(default)]
    inbounds: Vec<InboundSpec>,
}

/// Reads a spec file. `.json` files are parsed as JSON, anything else as
/// TOML; both use a top-level `inbounds` list.
pub fn load_specs(path: &Path) -> Result<Vec<InboundSpec>> {
    let contents = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let file: SpecFile = if is_json {
        serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))?
    } else {
        toml::from_str(&contents).with_context(|| format!("Invalid TOML in {}", path.display()))?
    };

    if file.inbounds.is_empty() {
        bail!("{} does not define any inbounds", path.display());
    }
    tracing::debug!("Read {} inbound spec(s) from {}", file.inbounds.len(), path.display());
    Ok(file.inbounds)
}
