//! hss-client: provisions a PIC64GX board's eMMC through the HSS console.
//!
//! Drives the Hart Software Services over a serial line: waits for the board
//! to power on, interrupts the boot, exports the eMMC as a USB disk, writes a
//! payload to it with elevated privileges and boots it.
//!
//! # Quick Start
//!
//! ```no_run
//! use hss_client::{open_serial, FlashOptions, Flasher, SudoCopy, UdevInventory};
//! # use hss_client::{Operator, Progress};
//! # async fn example(operator: &mut impl Operator, dots: impl Progress) -> hss_client::HssResult<()> {
//! let console = open_serial("/dev/ttyUSB1", 115_200)?;
//! let copier = SudoCopy::new("sudo", "/usr/local/bin/hss").with_helper_args(["write-emmc"]);
//!
//! let report = Flasher::new(console, "output.bin", FlashOptions::default())
//!     .run(operator, &UdevInventory::default(), &copier, dots)
//!     .await?;
//! println!("wrote {}", report.device.devname.display());
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod flasher;
pub mod generator;
pub mod matcher;
pub mod operator;
pub mod power_on;
pub mod session;
pub mod transport;
pub mod writer;

#[cfg(test)]
mod testing;

// Re-export primary public types.
pub use device::{BlockInventory, CandidateDevice, UdevInventory};
pub use flasher::{FlashOptions, FlashReport, Flasher};
pub use operator::{confirm, Operator};
pub use power_on::{wait_for_power_on, Progress};
pub use session::{ConsoleSession, ConsoleTiming};
pub use transport::{open_serial, SerialTransport, StreamTransport};
pub use writer::{Credential, ElevatedCopy, SudoCopy, WriteAttempt};

// Re-export hss-core error types for convenience.
pub use hss_core::{HssError, HssResult};
