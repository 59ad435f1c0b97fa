//! The flash orchestrator.
//!
//! `Flasher` owns everything one provisioning run needs (the console
//! session, the payload path and the timing options) and drives the run
//! front to back:
//!
//! 1. wait for power-on while prompting the operator,
//! 2. interrupt the HSS and export the eMMC over USB,
//! 3. let the host enumerate it and have the operator confirm the device,
//! 4. write the payload, retrying on a rejected password,
//! 5. leave mass-storage mode and boot.
//!
//! Nothing is rolled back on failure; the operator power-cycles and re-runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hss_core::error::HssResult;
use hss_core::phrases::DEVICE_MODEL;
use hss_core::script::ConsoleState;
use hss_core::transport::ConsoleTransport;
use tokio::time;
use tracing::info;

use crate::device::{resolve_device, BlockInventory, CandidateDevice};
use crate::operator::Operator;
use crate::power_on::{wait_for_power_on, Progress, DEFAULT_PROMPT_BUDGET};
use crate::session::{ConsoleSession, ConsoleTiming};
use crate::writer::{write_payload, ElevatedCopy};

/// Tunables for a flash run.
#[derive(Debug, Clone)]
pub struct FlashOptions {
    pub timing: ConsoleTiming,
    /// How long the power-on prompt prints before going quiet.
    pub power_on_budget: Duration,
    /// Pause for the host to pick up (or let go of) the USB disk.
    pub host_settle: Duration,
    /// udev `ID_MODEL` of the exported eMMC.
    pub model: String,
}

impl Default for FlashOptions {
    fn default() -> Self {
        Self {
            timing: ConsoleTiming::default(),
            power_on_budget: DEFAULT_PROMPT_BUDGET,
            host_settle: Duration::from_secs(5),
            model: DEVICE_MODEL.to_string(),
        }
    }
}

/// What a successful run did.
#[derive(Debug, Clone)]
pub struct FlashReport {
    pub device: CandidateDevice,
    pub write_attempts: u32,
    pub states: Vec<ConsoleState>,
}

/// One provisioning run against one board.
pub struct Flasher<T> {
    session: ConsoleSession<T>,
    payload: PathBuf,
    options: FlashOptions,
}

impl<T: ConsoleTransport> Flasher<T> {
    pub fn new(transport: T, payload: impl Into<PathBuf>, options: FlashOptions) -> Self {
        Self {
            session: ConsoleSession::new(transport, options.timing.clone()),
            payload: payload.into(),
            options,
        }
    }

    pub fn payload(&self) -> &Path {
        &self.payload
    }

    /// Run the whole flash. The console is closed when this returns `Ok`.
    pub async fn run<O, I, C, P>(
        mut self,
        operator: &mut O,
        inventory: &I,
        copier: &C,
        progress: P,
    ) -> HssResult<FlashReport>
    where
        O: Operator + ?Sized,
        I: BlockInventory + ?Sized,
        C: ElevatedCopy,
        P: Progress,
    {
        info!(payload = %self.payload.display(), "starting flash");

        operator.say("power on your device:");
        wait_for_power_on(&mut self.session, progress, self.options.power_on_budget).await?;

        self.session.export_emmc().await?;
        time::sleep(self.options.host_settle).await;

        let device = resolve_device(inventory, operator, &self.options.model)?;
        let write_attempts = write_payload(copier, operator, &self.payload, &device.devname).await?;

        time::sleep(self.options.host_settle).await;
        self.session.boot().await?;

        let report = FlashReport {
            device,
            write_attempts,
            states: self.session.history().to_vec(),
        };
        info!(
            device = %report.device.devname.display(),
            attempts = report.write_attempts,
            "flash complete"
        );

        self.session.close().await?;
        Ok(report)
    }
}
