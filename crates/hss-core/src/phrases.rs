//! Everything the tool says to, or listens for from, the HSS console.
//!
//! The bootloader has no machine-readable protocol; progress is detected by
//! exact, case-sensitive substrings of its console output. Keep every literal
//! here so a new HSS release only needs this table touched.

/// Console baud rate of the HSS UART.
pub const BAUD_RATE: u32 = 115_200;

/// First line the HSS prints after power-on.
pub const BANNER: &str = "HSS: decompressing from eNVM to L2 Scratch ... Passed";

/// Boot countdown offering a drop into the CLI.
pub const INTERRUPT_PROMPT: &str = "Press a key to enter CLI, ESC to skip";

/// Printed once the CLI has taken over.
pub const CLI_READY: &str = "Type HELP for list of commands";

/// Reply to [`SELECT_MMC`].
pub const MMC_FALLBACK: &str = "Selecting SDCARD/MMC (fallback) as boot source";

/// Reply to [`EXPORT_USB`].
pub const EMMC_EXPORT: &str = "Attempting to select eMMC";

/// Any key stops the boot countdown.
pub const INTERRUPT: &[u8] = b"c\r\n";

pub const SELECT_MMC: &[u8] = b"mmc\r\n";

/// Export the eMMC as a USB mass-storage device.
pub const EXPORT_USB: &[u8] = b"usbdmsc\r\n";

pub const BOOT: &[u8] = b"boot\r\n";

/// Ctrl+C, leaves USB mass-storage mode.
pub const CTRL_C: u8 = 0x03;

/// Model identifier udev reports for the exported eMMC.
pub const DEVICE_MODEL: &str = "PIC64GXSoC_msd";

/// Render bytes sent to the console for logs, escaping control characters.
pub fn printable(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}
