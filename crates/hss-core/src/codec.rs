//! Line framing for the HSS console stream.
//!
//! The console emits newline-terminated text. Reads from a serial port hand
//! back arbitrary chunks, so bytes are accumulated until a `\n` arrives.

use std::collections::VecDeque;

/// Streaming line decoder: accumulates bytes and yields complete lines.
///
/// Lines are returned without their `\n` / `\r\n` terminator. Invalid UTF-8
/// (line noise during power-up is common) is replaced, not rejected.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
    lines: VecDeque<String>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the decoder, queueing every line they complete.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.lines.push_back(decode_line(&raw));
        }
    }

    /// Pop the oldest complete line, if any.
    pub fn next_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    /// Flush an unterminated trailing line (used when the stream ends).
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.buffer);
        Some(decode_line(&raw))
    }

    /// Number of bytes waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    while end > 0 && matches!(raw[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
