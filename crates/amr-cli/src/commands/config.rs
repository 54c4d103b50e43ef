//! `amr-collect config`: print the config hash and the effective settings.

use amr_config::{resolve_collect_config, ProcessEnv};
use anyhow::Result;

use super::{load_config, warn_unused_keys};

pub fn print_config(config_paths: Vec<String>) -> Result<()> {
    let loaded = load_config(&config_paths)?;
    warn_unused_keys(&loaded)?;
    let cfg = resolve_collect_config(&loaded.config_json, &ProcessEnv)?;

    println!("config_hash={}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    // Debug output redacts the password.
    println!("{:#?}", cfg);
    Ok(())
}
