//! hss-core: shared vocabulary for driving the Hart Software Services console.
//!
//! Provides the phrase/command table, the console state scripts, line
//! framing, the abstract console transport trait and the error type.

pub mod codec;
pub mod error;
pub mod phrases;
pub mod script;
pub mod transport;

// Re-export commonly used items at crate root.
pub use codec::LineDecoder;
pub use error::{HssError, HssResult};
pub use script::{Action, ConsoleState, Step, BOOT_SCRIPT, EXPORT_SCRIPT, POWER_ON};
pub use transport::ConsoleTransport;
