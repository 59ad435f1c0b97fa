//! The HSS console session.
//!
//! A `ConsoleSession` owns the console transport for the whole run and walks
//! the command scripts from `hss_core::script`, recording every state it
//! enters.

use std::time::Duration;

use hss_core::error::{HssError, HssResult};
use hss_core::phrases::printable;
use hss_core::script::{Action, ConsoleState, Step, BOOT_SCRIPT, EXPORT_SCRIPT, POWER_ON};
use hss_core::transport::ConsoleTransport;
use tokio::time;
use tracing::{debug, info};

use crate::matcher::read_phrase;

/// Lower bound on the pause after every console write. Without it commands
/// get dropped on slow consoles.
pub const MIN_WRITE_FLOOR: Duration = Duration::from_secs(1);

/// Delays and limits applied while talking to the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleTiming {
    /// Pause after every write, on top of `settle`. Never below [`MIN_WRITE_FLOOR`].
    pub write_floor: Duration,
    /// Time the console gets to act on a command.
    pub settle: Duration,
    /// Give up on a phrase after this long. `None` waits forever.
    pub phrase_timeout: Option<Duration>,
}

impl Default for ConsoleTiming {
    fn default() -> Self {
        Self {
            write_floor: MIN_WRITE_FLOOR,
            settle: Duration::from_secs(5),
            phrase_timeout: None,
        }
    }
}

impl ConsoleTiming {
    /// Total pause after a write.
    pub fn after_write(&self) -> Duration {
        self.write_floor.max(MIN_WRITE_FLOOR) + self.settle
    }
}

/// Exclusive owner of the console for one provisioning run.
pub struct ConsoleSession<T> {
    transport: T,
    timing: ConsoleTiming,
    history: Vec<ConsoleState>,
}

impl<T: ConsoleTransport> ConsoleSession<T> {
    pub fn new(transport: T, timing: ConsoleTiming) -> Self {
        Self {
            transport,
            timing,
            history: Vec::new(),
        }
    }

    /// Block until the board prints its first boot banner.
    pub async fn await_banner(&mut self) -> HssResult<String> {
        self.run_script(POWER_ON)
            .await?
            .ok_or_else(|| HssError::Other("power-on script matched nothing".into()))
    }

    /// Interrupt the boot, select the MMC source and export the eMMC over USB.
    pub async fn export_emmc(&mut self) -> HssResult<()> {
        self.run_script(EXPORT_SCRIPT).await?;
        Ok(())
    }

    /// Leave mass-storage mode and boot. Nothing is awaited afterwards; the
    /// board is on its own from here.
    pub async fn boot(&mut self) -> HssResult<()> {
        self.run_script(BOOT_SCRIPT).await?;
        Ok(())
    }

    /// Run `steps` in order, returning the last line matched (if any).
    pub async fn run_script(&mut self, steps: &[Step]) -> HssResult<Option<String>> {
        let mut matched = None;
        for step in steps {
            if let Some(line) = self.run_step(step).await? {
                matched = Some(line);
            }
        }
        Ok(matched)
    }

    async fn run_step(&mut self, step: &Step) -> HssResult<Option<String>> {
        debug!(state = %step.state, "entering");
        self.history.push(step.state);

        self.send(step.action).await?;

        match step.expect {
            Some(phrase) => {
                let line = read_phrase(&mut self.transport, phrase, self.timing.phrase_timeout).await?;
                Ok(Some(line))
            }
            None => Ok(None),
        }
    }

    async fn send(&mut self, action: Action) -> HssResult<()> {
        if action == Action::None {
            return Ok(());
        }

        let bytes = action.bytes();
        let shown = printable(&bytes);
        let written = self.transport.write(&bytes).await?;
        if written == 0 {
            return Err(HssError::Write { what: shown });
        }

        info!(sent = %shown, "console write");
        println!("sent: {shown}");
        time::sleep(self.timing.after_write()).await;
        Ok(())
    }

    /// States entered so far, in order.
    pub fn history(&self) -> &[ConsoleState] {
        &self.history
    }

    /// The most recent state.
    pub fn state(&self) -> Option<ConsoleState> {
        self.history.last().copied()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Close the console, consuming the session.
    pub async fn close(mut self) -> HssResult<()> {
        debug!(port = self.transport.name(), "closing console");
        self.transport.close().await
    }
}
