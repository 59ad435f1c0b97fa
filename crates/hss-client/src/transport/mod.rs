//! Console transports.
//!
//! [`StreamTransport`] turns any async byte stream into a line-oriented
//! [`ConsoleTransport`]; the serial port is one instance of it.

pub mod serial;

pub use serial::{open_serial, SerialTransport};

use hss_core::codec::LineDecoder;
use hss_core::error::HssResult;
use hss_core::transport::ConsoleTransport;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

const READ_CHUNK: usize = 512;

/// A line-framed console over an async byte stream.
pub struct StreamTransport<S> {
    name: String,
    stream: S,
    decoder: LineDecoder,
    eof: bool,
}

impl<S> StreamTransport<S> {
    pub fn new(name: impl Into<String>, stream: S) -> Self {
        Self {
            name: name.into(),
            stream,
            decoder: LineDecoder::new(),
            eof: false,
        }
    }
}

impl<S> ConsoleTransport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn read_line(&mut self) -> HssResult<Option<String>> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            if let Some(line) = self.decoder.next_line() {
                debug!(port = %self.name, line = %line, "rx");
                return Ok(Some(line));
            }
            if self.eof {
                return Ok(self.decoder.finish());
            }

            let n = self.stream.read(&mut buf).await?;
            if n == 0 {
                debug!(port = %self.name, "console stream ended");
                self.eof = true;
            } else {
                self.decoder.feed(&buf[..n]);
            }
        }
    }

    async fn write(&mut self, data: &[u8]) -> HssResult<usize> {
        let n = self.stream.write(data).await?;
        if n == 0 {
            return Ok(0);
        }
        // Short writes are finished off so a command is never split.
        self.stream.write_all(&data[n..]).await?;
        self.stream.flush().await?;
        Ok(data.len())
    }

    async fn close(&mut self) -> HssResult<()> {
        self.stream.shutdown().await?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
