//! Chain profile file loading.
//!
//! The chain file is a JSON array of [`ChainProfile`] records. Order is
//! preserved: it is the order in which chains appear in aggregated reports.
use crate::config::ConfigFileError;
use std::{collections::HashSet, fs, path::Path};

mod chain;
pub use chain::*;

/// Parses and validates chain profiles from a JSON document.
pub fn parse_chains(raw: &str) -> Result<Vec<ChainProfile>, ConfigFileError> {
    let chains: Vec<ChainProfile> = serde_json::from_str(raw)?;
    validate_chains(&chains)?;
    Ok(chains)
}

/// Reads, parses and validates the chain file at `path`.
pub fn load_chains(path: impl AsRef<Path>) -> Result<Vec<ChainProfile>, ConfigFileError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .map_err(|e| ConfigFileError::FileRead(format!("{}: {}", path.display(), e)))?;
    parse_chains(&raw)
}

fn validate_chains(chains: &[ChainProfile]) -> Result<(), ConfigFileError> {
    if chains.is_empty() {
        return Err(ConfigFileError::MissingField("chains".into()));
    }

    let mut seen = HashSet::new();
    for chain in chains {
        chain.validate()?;
        if !seen.insert(chain.key.as_str()) {
            return Err(ConfigFileError::DuplicateKey(chain.key.clone()));
        }
    }
    Ok(())
}
