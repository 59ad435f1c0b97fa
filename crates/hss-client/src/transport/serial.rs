//! The HSS UART, opened through `tokio-serial`.

use hss_core::error::{HssError, HssResult};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::info;

use super::StreamTransport;

/// Console transport over a serial port.
pub type SerialTransport = StreamTransport<SerialStream>;

/// Open `port` at `baud_rate` (8N1, no flow control).
///
/// Must be called from within a tokio runtime.
pub fn open_serial(port: &str, baud_rate: u32) -> HssResult<SerialTransport> {
    let stream = tokio_serial::new(port, baud_rate)
        .open_native_async()
        .map_err(|e| HssError::Transport {
            port: port.to_string(),
            reason: e.to_string(),
        })?;

    info!(port, baud_rate, "serial port open");
    Ok(StreamTransport::new(port, stream))
}
