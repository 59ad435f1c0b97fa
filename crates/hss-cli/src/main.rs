//! hss — flash payloads onto a PIC64GX board through the Hart Software Services.
//!
//! `flash-payload` walks the operator through the whole procedure: power on,
//! interrupt the HSS, export the eMMC over USB, confirm the block device,
//! write the payload with elevated privileges and boot it.
//! `generate-payload` builds the payload image with the vendor generator.

mod commands;
mod config;
mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

/// hss — HSS eMMC provisioning
#[derive(Parser)]
#[command(name = "hss", version, about = "Flash payloads onto a PIC64GX board's eMMC through the HSS console")]
struct Cli {
    /// Config file path (default: ~/.hss/config.toml)
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactively flash a payload onto the board's eMMC
    FlashPayload {
        /// Payload binary, e.g. output.bin
        payload: PathBuf,
        /// The UART serial port for the HSS, e.g. /dev/ttyUSB1
        serial: String,
    },

    /// Generate a payload with the HSS payload generator
    GeneratePayload {
        /// The payload generator's YAML configuration file
        config_file: PathBuf,
        /// Name of the payload to generate
        payload_name: PathBuf,
    },

    /// Copy a payload onto a block device (run with elevated privileges)
    #[command(name = "write-emmc", hide = true)]
    WriteEmmc {
        /// The payload to write, e.g. output.bin
        payload: PathBuf,
        /// The block device name (or devlink)
        block_device: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing.
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("hss=debug,hss_cli=debug,hss_client=debug,hss_core=debug")
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("hss=warn,hss_cli=warn,hss_client=warn")
            .with_target(false)
            .init();
    }

    let config_path = cli.config.clone().unwrap_or_else(config::default_path);

    let result = match config::Config::load(&config_path) {
        Err(e) => Err(e),
        Ok(cfg) => match cli.command {
            Command::FlashPayload { payload, serial } => {
                commands::flash_payload::run(&payload, &serial, &cfg).await
            }
            Command::GeneratePayload {
                config_file,
                payload_name,
            } => commands::generate_payload::run(&config_file, &payload_name, &cfg).await,
            Command::WriteEmmc {
                payload,
                block_device,
            } => commands::write_emmc::run(&payload, &block_device).map(|_| ()),
        },
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("hss: {e:#}");
        std::process::exit(1);
    }
}
