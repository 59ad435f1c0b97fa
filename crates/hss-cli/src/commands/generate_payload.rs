//! `hss generate-payload <config_file> <payload_name>` — build a payload
//! image with the HSS payload generator.
//!
//! Looks for the generator below the working directory (or on `PATH`),
//! unpacking it from the fetched blob if needed, then runs it on the YAML
//! config.

use std::path::Path;

use anyhow::{Context, Result};
use hss_client::generator;
use tracing::info;

use crate::config::Config;

/// Generate `payload_name` from `config_file`, both relative to the working directory.
pub async fn run(config_file: &Path, payload_name: &Path, cfg: &Config) -> Result<()> {
    let base = std::env::current_dir().context("cannot determine working directory")?;

    let config = generator::verify_config(&base, config_file)?;
    println!("found configuration file: {}", config.display());

    let exe = generator::locate_generator(&base, &cfg.generator.archive)?;
    println!("found payload generator executable: {}", exe.display());

    generator::run_generator(&exe, &config, payload_name).await?;
    info!(payload = %payload_name.display(), "payload generated");

    Ok(())
}
