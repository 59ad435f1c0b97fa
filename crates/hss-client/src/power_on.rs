//! The power-on race.
//!
//! While the operator switches the board on, a prompt loop prints one
//! progress mark per second and the console session waits for the boot
//! banner. Only the banner ends the race. When it arrives the prompt loop is
//! signalled over a oneshot channel and joined, so nothing is printed once
//! this function returns. If the prompt budget runs out first the loop just
//! goes quiet and the banner wait carries on.

use std::time::Duration;

use hss_core::error::HssResult;
use hss_core::transport::ConsoleTransport;
use tokio::sync::oneshot;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::session::ConsoleSession;

/// How long the prompt loop keeps printing.
pub const DEFAULT_PROMPT_BUDGET: Duration = Duration::from_secs(60);

const PROMPT_INTERVAL: Duration = Duration::from_secs(1);

/// Operator-facing output of the prompt loop.
pub trait Progress: Send + 'static {
    /// Called once before the first tick.
    fn start(&mut self) {}

    fn tick(&mut self);
}

/// Wait for the board to power on, showing progress meanwhile.
///
/// Returns the banner line.
pub async fn wait_for_power_on<T, P>(
    session: &mut ConsoleSession<T>,
    progress: P,
    budget: Duration,
) -> HssResult<String>
where
    T: ConsoleTransport,
    P: Progress,
{
    let (done_tx, done_rx) = oneshot::channel();
    let prompt = tokio::spawn(prompt_loop(progress, budget, done_rx));

    let banner = session.await_banner().await;

    // Banner wait won (or failed): stop the prompt loop before going on.
    let _ = done_tx.send(());
    if let Err(e) = prompt.await {
        warn!("prompt loop ended abnormally: {e}");
    }

    banner
}

async fn prompt_loop<P: Progress>(mut progress: P, budget: Duration, mut done: oneshot::Receiver<()>) {
    progress.start();

    let deadline = Instant::now() + budget;
    let mut ticker = time::interval_at(Instant::now() + PROMPT_INTERVAL, PROMPT_INTERVAL);

    loop {
        tokio::select! {
            biased;
            _ = &mut done => {
                debug!("prompt loop cancelled");
                return;
            }
            at = ticker.tick() => {
                if at > deadline {
                    break;
                }
                progress.tick();
            }
        }
    }

    debug!("prompt budget exhausted, still waiting for the board");
    let _ = done.await;
}
