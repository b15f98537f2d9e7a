use std::fs;
use std::path::Path;

use tracing::info;
use xroute_core::{ChainRegistry, PortError};

const BUNDLED_REGISTRY: &str = include_str!("../data/registry.json");

/// Chain metadata compiled into the binary.
pub fn bundled_registry() -> Result<ChainRegistry, PortError> {
    ChainRegistry::from_json(BUNDLED_REGISTRY)
}

/// Loads the registry from `path`, or the bundled copy when none is given.
pub fn load_registry(path: Option<&str>) -> Result<ChainRegistry, PortError> {
    let Some(path) = path else {
        return bundled_registry();
    };
    let raw = fs::read_to_string(Path::new(path))
        .map_err(|e| PortError::NotFound(format!("chain registry {path}: {e}")))?;
    let registry = ChainRegistry::from_json(&raw)?;
    info!(path, chains = registry.len(), "loaded chain registry");
    Ok(registry)
}
