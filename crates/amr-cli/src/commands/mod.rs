//! Command handler modules for amr-collect.
//!
//! Shared config loading lives here; command-specific logic lives in the
//! submodules.

pub mod checksum;
pub mod config;
pub mod run;

use amr_config::{report_unused_keys, LoadedConfig, UnusedKeyPolicy};
use anyhow::Result;
use tracing::warn;

/// Layered YAML in merge order, or an empty config when no paths are given.
pub fn load_config(config_paths: &[String]) -> Result<LoadedConfig> {
    if config_paths.is_empty() {
        return LoadedConfig::empty();
    }
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    amr_config::load_layered_yaml(&path_refs)
}

/// Unused keys are a warning, never fatal.
pub fn warn_unused_keys(loaded: &LoadedConfig) -> Result<()> {
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    for p in report.unused_leaf_pointers.iter().take(50) {
        warn!(pointer = %p, "CONFIG_UNUSED_KEYS");
    }
    let extra = report.unused_leaf_pointers.len().saturating_sub(50);
    if extra > 0 {
        warn!(extra, "CONFIG_UNUSED_KEYS: more unused keys not shown");
    }
    Ok(())
}
