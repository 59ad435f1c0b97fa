//! Console states and the command scripts that walk through them.
//!
//! A script is an ordered list of [`Step`]s. Each step performs at most one
//! write and may then require a phrase before the next step may run.

use crate::phrases;
use std::fmt;

/// Where the HSS console handshake currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleState {
    AwaitBanner,
    AwaitInterruptPrompt,
    SendInterrupt,
    AwaitCliReady,
    SelectMmcSource,
    AwaitFallbackConfirm,
    ExportMassStorage,
    AwaitExportConfirm,
    SendCancel,
    SendBoot,
}

impl fmt::Display for ConsoleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a step writes to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing; the step only waits.
    None,
    /// A text command, already terminated.
    Send(&'static [u8]),
    /// A single raw control byte.
    Control(u8),
}

impl Action {
    /// The bytes this action puts on the wire.
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            Action::None => Vec::new(),
            Action::Send(cmd) => cmd.to_vec(),
            Action::Control(byte) => vec![*byte],
        }
    }
}

/// One entry of a command script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub state: ConsoleState,
    pub action: Action,
    /// Phrase that must be seen before the step is complete.
    pub expect: Option<&'static str>,
}

impl Step {
    const fn wait(state: ConsoleState, phrase: &'static str) -> Self {
        Self {
            state,
            action: Action::None,
            expect: Some(phrase),
        }
    }

    const fn write(state: ConsoleState, action: Action) -> Self {
        Self {
            state,
            action,
            expect: None,
        }
    }
}

/// Power-on: the first sign of life from the board.
pub const POWER_ON: &[Step] = &[Step::wait(ConsoleState::AwaitBanner, phrases::BANNER)];

/// Stop the boot, select the MMC source and export the eMMC over USB.
pub const EXPORT_SCRIPT: &[Step] = &[
    Step::wait(ConsoleState::AwaitInterruptPrompt, phrases::INTERRUPT_PROMPT),
    Step::write(ConsoleState::SendInterrupt, Action::Send(phrases::INTERRUPT)),
    Step::wait(ConsoleState::AwaitCliReady, phrases::CLI_READY),
    Step::write(ConsoleState::SelectMmcSource, Action::Send(phrases::SELECT_MMC)),
    Step::wait(ConsoleState::AwaitFallbackConfirm, phrases::MMC_FALLBACK),
    Step::write(ConsoleState::ExportMassStorage, Action::Send(phrases::EXPORT_USB)),
    Step::wait(ConsoleState::AwaitExportConfirm, phrases::EMMC_EXPORT),
];

/// Leave mass-storage mode and boot the freshly written payload.
pub const BOOT_SCRIPT: &[Step] = &[
    Step::write(ConsoleState::SendCancel, Action::Control(phrases::CTRL_C)),
    Step::write(ConsoleState::SendBoot, Action::Send(phrases::BOOT)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_cover_every_state_once_in_order() {
        let states: Vec<ConsoleState> = POWER_ON
            .iter()
            .chain(EXPORT_SCRIPT)
            .chain(BOOT_SCRIPT)
            .map(|s| s.state)
            .collect();
        assert_eq!(
            states,
            vec![
                ConsoleState::AwaitBanner,
                ConsoleState::AwaitInterruptPrompt,
                ConsoleState::SendInterrupt,
                ConsoleState::AwaitCliReady,
                ConsoleState::SelectMmcSource,
                ConsoleState::AwaitFallbackConfirm,
                ConsoleState::ExportMassStorage,
                ConsoleState::AwaitExportConfirm,
                ConsoleState::SendCancel,
                ConsoleState::SendBoot,
            ]
        );
    }

    #[test]
    fn boot_script_never_waits() {
        assert!(BOOT_SCRIPT.iter().all(|s| s.expect.is_none()));
    }

    #[test]
    fn cancel_is_a_raw_control_byte() {
        assert_eq!(BOOT_SCRIPT[0].action.bytes(), vec![0x03]);
        assert!(Action::None.bytes().is_empty());
    }
}
