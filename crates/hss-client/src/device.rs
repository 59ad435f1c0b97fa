//! Finding the exported eMMC on the host.
//!
//! The host's udev database is queried for block devices whose model matches
//! the board's mass-storage signature; each match is shown to the operator
//! until one is accepted.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use hss_core::error::{HssError, HssResult};
use tracing::{debug, info};

use crate::operator::{confirm, Operator};

/// A block device that might be the board's eMMC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDevice {
    /// udev `ID_SERIAL`.
    pub serial: String,
    /// udev `DEVNAME`, e.g. `/dev/sdb`.
    pub devname: PathBuf,
}

impl fmt::Display for CandidateDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID_SERIAL={},\nDEVNAME={}",
            self.serial,
            self.devname.display()
        )
    }
}

/// The host's block-device inventory.
pub trait BlockInventory {
    /// Devices in `subsystem` whose `ID_MODEL` equals `model`, in database order.
    fn query(&self, subsystem: &str, model: &str) -> HssResult<Vec<CandidateDevice>>;
}

/// Inventory backed by `udevadm info --export-db`.
#[derive(Debug, Clone)]
pub struct UdevInventory {
    program: String,
}

impl Default for UdevInventory {
    fn default() -> Self {
        Self {
            program: "udevadm".to_string(),
        }
    }
}

impl BlockInventory for UdevInventory {
    fn query(&self, subsystem: &str, model: &str) -> HssResult<Vec<CandidateDevice>> {
        let output = Command::new(&self.program)
            .args(["info", "--export-db"])
            .output()
            .map_err(|e| HssError::Inventory(format!("cannot run {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(HssError::Inventory(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let db = String::from_utf8_lossy(&output.stdout);
        let found = parse_export_db(&db, subsystem, model);
        debug!(subsystem, model, count = found.len(), "udev query");
        Ok(found)
    }
}

/// Parse `udevadm info --export-db` output and keep the matching devices.
///
/// Records are separated by blank lines; properties are `E: KEY=value`.
pub fn parse_export_db(db: &str, subsystem: &str, model: &str) -> Vec<CandidateDevice> {
    let mut found = Vec::new();
    let mut props: HashMap<&str, &str> = HashMap::new();

    for line in db.lines().chain(std::iter::once("")) {
        let line = line.trim_end();
        if line.is_empty() {
            if let Some(device) = candidate_from(&props, subsystem, model) {
                found.push(device);
            }
            props.clear();
            continue;
        }
        if let Some(prop) = line.strip_prefix("E: ") {
            if let Some((key, value)) = prop.split_once('=') {
                props.insert(key, value);
            }
        }
    }

    found
}

fn candidate_from(
    props: &HashMap<&str, &str>,
    subsystem: &str,
    model: &str,
) -> Option<CandidateDevice> {
    if props.get("SUBSYSTEM") != Some(&subsystem) || props.get("ID_MODEL") != Some(&model) {
        return None;
    }
    Some(CandidateDevice {
        serial: props.get("ID_SERIAL").copied().unwrap_or_default().to_string(),
        devname: PathBuf::from(*props.get("DEVNAME")?),
    })
}

/// Walk the matching devices and return the first one the operator accepts.
///
/// Devices after the accepted one are never shown. Running out of devices is
/// fatal: it means the board is not exported or the host cannot see it.
pub fn resolve_device<I, O>(inventory: &I, operator: &mut O, model: &str) -> HssResult<CandidateDevice>
where
    I: BlockInventory + ?Sized,
    O: Operator + ?Sized,
{
    for device in inventory.query("block", model)? {
        operator.say(&format!("Found device:\n{device}\n"));
        if confirm(operator, "Choose this Device?")? {
            info!(devname = %device.devname.display(), serial = %device.serial, "device selected");
            return Ok(device);
        }
        debug!(devname = %device.devname.display(), "device rejected");
    }

    Err(HssError::DeviceNotFound {
        model: model.to_string(),
    })
}
