//! Terminal-backed operator prompts.
//!
//! Implements `hss_client::Operator` with dialoguer so device confirmation
//! reads a line from the terminal and the password is read without echo.

use std::io::{self, Write as _};

use dialoguer::{Input, Password};
use hss_client::{HssError, HssResult, Operator, Progress};

/// The person at the keyboard.
pub struct TerminalOperator;

impl Operator for TerminalOperator {
    fn ask(&mut self, prompt: &str) -> HssResult<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| HssError::Other(format!("failed to read user input: {e}")))
    }

    fn secret(&mut self, prompt: &str) -> HssResult<String> {
        println!();
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| HssError::Other(format!("failed to read password: {e}")))
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Prints a dot per tick while waiting for the board.
pub struct Dots;

impl Progress for Dots {
    fn tick(&mut self) {
        print!(".");
        let _ = io::stdout().flush();
    }
}
