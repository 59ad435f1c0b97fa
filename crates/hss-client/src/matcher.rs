//! Phrase matching: the synchronization primitive of the console protocol.
//!
//! The HSS has no acknowledgements, so the only way to know a command took
//! effect is to wait for the text it prints. With no timeout configured a
//! missing phrase blocks the caller forever. That mirrors the assumption that
//! the bootloader is deterministic, and it is a real hazard on flaky hardware;
//! set a phrase timeout in the console config to bound it.

use std::time::Duration;

use hss_core::error::{HssError, HssResult};
use hss_core::transport::ConsoleTransport;
use tokio::time;
use tracing::{debug, info};

/// Read lines until one contains `phrase`, and return that whole line.
///
/// Lines before the match are consumed and discarded; nothing after it is
/// read. `timeout` of `None` waits indefinitely.
pub async fn read_phrase<T: ConsoleTransport>(
    transport: &mut T,
    phrase: &str,
    timeout: Option<Duration>,
) -> HssResult<String> {
    let line = match timeout {
        None => scan(transport, phrase).await?,
        Some(after) => time::timeout(after, scan(transport, phrase))
            .await
            .map_err(|_| HssError::PhraseTimeout {
                phrase: phrase.to_string(),
                after,
            })??,
    };

    info!(phrase, "matched");
    println!("\nhss: {phrase}");
    Ok(line)
}

async fn scan<T: ConsoleTransport>(transport: &mut T, phrase: &str) -> HssResult<String> {
    loop {
        match transport.read_line().await? {
            Some(line) if line.contains(phrase) => return Ok(line),
            Some(line) => debug!(line = %line, "skipped"),
            None => {
                return Err(HssError::ConsoleClosed {
                    phrase: phrase.to_string(),
                })
            }
        }
    }
}
