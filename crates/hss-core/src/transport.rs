//! Abstract console transport.
//!
//! The serial port implementation lives in `hss-client`; tests substitute
//! scripted transports.

use crate::error::HssResult;

/// A line-oriented, bidirectional console channel.
#[allow(async_fn_in_trait)]
pub trait ConsoleTransport: Send {
    /// Read the next complete line, without its terminator.
    ///
    /// Returns `Ok(None)` once the channel has ended.
    async fn read_line(&mut self) -> HssResult<Option<String>>;

    /// Write bytes and return how many were accepted.
    async fn write(&mut self, data: &[u8]) -> HssResult<usize>;

    /// Close the channel.
    async fn close(&mut self) -> HssResult<()>;

    /// Human-readable name of the channel (the port path for serial).
    fn name(&self) -> &str;
}
