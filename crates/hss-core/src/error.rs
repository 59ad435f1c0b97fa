use std::time::Duration;
use thiserror::Error;

/// Errors produced while provisioning a board through the HSS console.
#[derive(Debug, Error)]
pub enum HssError {
    /// The serial port could not be opened or configured.
    #[error("please check your serial connection: {port}: {reason}")]
    Transport { port: String, reason: String },

    /// A console write reported that nothing was written.
    #[error("failed to write {what} to the console")]
    Write { what: String },

    /// The console stream ended while a phrase was still expected.
    #[error("console closed while waiting for '{phrase}'")]
    ConsoleClosed { phrase: String },

    #[error("timed out after {after:?} waiting for '{phrase}'")]
    PhraseTimeout { phrase: String, after: Duration },

    #[error("could not find eMMC mass storage device (model {model})")]
    DeviceNotFound { model: String },

    #[error("block device query failed: {0}")]
    Inventory(String),

    /// The elevated copy failed for a reason other than a rejected credential.
    #[error(
        "failure to write to eMMC. Check connections and power cycle before trying again\n{diagnostic}"
    )]
    WriteFailed { diagnostic: String },

    #[error("payload generator: {0}")]
    Generator(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type HssResult<T> = Result<T, HssError>;
