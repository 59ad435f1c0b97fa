//! Test doubles shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hss_core::error::HssResult;
use hss_core::transport::ConsoleTransport;
use tokio::time::{self, Instant};

/// Something observed on a [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Read(String),
    Write(Vec<u8>),
}

/// Shared, timestamped log of transport traffic.
pub type EventLog = Arc<Mutex<Vec<(Instant, Event)>>>;

/// In-memory console that replays canned lines, each after a delay.
///
/// Once the script is exhausted it either blocks forever, like a silent
/// board, or reports end of stream.
pub struct ScriptedTransport {
    lines: VecDeque<(Duration, String)>,
    log: EventLog,
    hang_when_done: bool,
    refuse_writes: bool,
}

impl ScriptedTransport {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(|l| (Duration::ZERO, l.into()))
                .collect(),
            log: Arc::new(Mutex::new(Vec::new())),
            hang_when_done: true,
            refuse_writes: false,
        }
    }

    /// Queue a line that only arrives after `delay`.
    pub fn push_delayed(&mut self, delay: Duration, line: impl Into<String>) {
        self.lines.push_back((delay, line.into()));
    }

    /// Report end of stream instead of blocking once the script runs out.
    pub fn close_when_done(mut self) -> Self {
        self.hang_when_done = false;
        self
    }

    /// Make every write report zero bytes accepted.
    pub fn refuse_writes(mut self) -> Self {
        self.refuse_writes = true;
        self
    }

    pub fn log(&self) -> EventLog {
        self.log.clone()
    }

    fn record(&self, event: Event) {
        self.log.lock().unwrap().push((Instant::now(), event));
    }
}

impl ConsoleTransport for ScriptedTransport {
    async fn read_line(&mut self) -> HssResult<Option<String>> {
        match self.lines.pop_front() {
            Some((delay, line)) => {
                if !delay.is_zero() {
                    time::sleep(delay).await;
                }
                self.record(Event::Read(line.clone()));
                Ok(Some(line))
            }
            None if self.hang_when_done => future::pending().await,
            None => Ok(None),
        }
    }

    async fn write(&mut self, data: &[u8]) -> HssResult<usize> {
        if self.refuse_writes {
            return Ok(0);
        }
        self.record(Event::Write(data.to_vec()));
        Ok(data.len())
    }

    async fn close(&mut self) -> HssResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// All reads in the log, in order.
pub fn reads(log: &EventLog) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|(_, e)| match e {
            Event::Read(line) => Some(line.clone()),
            Event::Write(_) => None,
        })
        .collect()
}

/// All writes in the log, in order.
pub fn writes(log: &EventLog) -> Vec<Vec<u8>> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|(_, e)| match e {
            Event::Write(bytes) => Some(bytes.clone()),
            Event::Read(_) => None,
        })
        .collect()
}
