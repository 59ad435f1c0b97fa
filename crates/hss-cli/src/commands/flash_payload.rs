//! `hss flash-payload <payload> <serial>` — flash a payload onto the eMMC.
//!
//! Opens the HSS console, asks the operator to power the board on, exports
//! the eMMC over USB, writes the payload with elevated privileges and boots
//! it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hss_client::{open_serial, Flasher, SudoCopy, UdevInventory};
use tracing::info;

use crate::config::Config;
use crate::prompt::{Dots, TerminalOperator};

/// Subcommand this binary exposes as the privileged write helper.
pub const HELPER_SUBCOMMAND: &str = "write-emmc";

/// Flash `payload` through the HSS on `serial`.
pub async fn run(payload: &Path, serial: &str, cfg: &Config) -> Result<()> {
    let payload = payload
        .canonicalize()
        .with_context(|| format!("payload {} not found", payload.display()))?;
    info!(payload = %payload.display(), serial, "flash-payload");

    let copier = elevated_copier(cfg)?;
    let console = open_serial(serial, cfg.serial.baud_rate)?;

    let report = Flasher::new(console, &payload, cfg.flash_options())
        .run(&mut TerminalOperator, &UdevInventory::default(), &copier, Dots)
        .await?;

    info!(
        device = %report.device.devname.display(),
        attempts = report.write_attempts,
        states = report.states.len(),
        "flash-payload finished"
    );
    println!("how about that!");

    Ok(())
}

/// The elevated copy: the configured helper, or this binary's hidden
/// `write-emmc` subcommand.
fn elevated_copier(cfg: &Config) -> Result<SudoCopy> {
    let copier = match &cfg.writer.helper {
        Some(helper) => SudoCopy::new(&cfg.writer.elevate, helper),
        None => {
            let exe: PathBuf =
                std::env::current_exe().context("cannot locate the hss executable")?;
            SudoCopy::new(&cfg.writer.elevate, exe).with_helper_args([HELPER_SUBCOMMAND])
        }
    };
    Ok(copier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_helper_is_this_binary() {
        let copier = elevated_copier(&Config::default()).unwrap();
        assert_eq!(copier.elevate, "sudo");
        assert_eq!(copier.helper_args, vec![HELPER_SUBCOMMAND.to_string()]);
    }

    #[test]
    fn configured_helper_takes_no_extra_args() {
        let mut cfg = Config::default();
        cfg.writer.helper = Some(PathBuf::from("/usr/local/bin/write-emmc"));
        cfg.writer.elevate = "doas".into();

        let copier = elevated_copier(&cfg).unwrap();
        assert_eq!(copier.helper, PathBuf::from("/usr/local/bin/write-emmc"));
        assert!(copier.helper_args.is_empty());
    }

    #[tokio::test]
    async fn missing_payload_fails_before_touching_the_port() {
        let err = run(Path::new("/nonexistent/output.bin"), "/dev/null", &Config::default())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("payload /nonexistent/output.bin not found"));
    }
}
