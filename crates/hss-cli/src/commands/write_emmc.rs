//! `hss write-emmc <payload> <device>` — raw copy of a payload onto a block
//! device.
//!
//! This is the privileged half of `flash-payload`: it is run through `sudo`
//! and does nothing but stream the bytes across and flush them.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Copy `payload` onto `device` and sync it. Returns the bytes written.
pub fn run(payload: &Path, device: &Path) -> Result<u64> {
    let mut src = BufReader::new(
        File::open(payload).with_context(|| format!("cannot open {}", payload.display()))?,
    );
    let mut dst = OpenOptions::new()
        .write(true)
        .create(device_may_be_created(device))
        .truncate(false)
        .open(device)
        .with_context(|| format!("cannot open {} for writing", device.display()))?;

    let written = io::copy(&mut src, &mut dst)
        .with_context(|| format!("failed writing to {}", device.display()))?;
    // An image file may be longer than the payload; block devices keep their size.
    if dst.metadata()?.is_file() {
        dst.set_len(written)
            .with_context(|| format!("failed to truncate {}", device.display()))?;
    }
    dst.sync_all()
        .with_context(|| format!("failed to sync {}", device.display()))?;

    info!(payload = %payload.display(), device = %device.display(), written, "payload copied");
    Ok(written)
}

/// Only regular-file targets (images, tests) are ever created; a missing
/// `/dev` node must stay an error.
fn device_may_be_created(device: &Path) -> bool {
    !device.starts_with("/dev")
}
