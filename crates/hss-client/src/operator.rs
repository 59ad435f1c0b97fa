//! The human in the loop.
//!
//! Device confirmation and the credential prompt go through [`Operator`] so
//! the CLI can back it with a terminal and tests with a script.

use hss_core::error::HssResult;

/// Interactive input and output for the operator running the flash.
pub trait Operator {
    /// Show a prompt and read one line of input.
    fn ask(&mut self, prompt: &str) -> HssResult<String>;

    /// Read a secret without echoing it.
    fn secret(&mut self, prompt: &str) -> HssResult<String>;

    /// Print a message.
    fn say(&mut self, message: &str);
}

/// Ask until the answer is `y` or `n` (any case).
pub fn confirm<O: Operator + ?Sized>(operator: &mut O, question: &str) -> HssResult<bool> {
    operator.say(question);
    loop {
        let answer = operator.ask("Please enter 'y' for yes or 'n' for no")?;
        match answer.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => operator.say("Invalid input. Please enter 'y' for yes or 'n' for no."),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::scripted::ScriptedOperator;
    use super::*;

    #[test]
    fn reprompts_until_y_or_n() {
        let mut operator = ScriptedOperator::answering(["yes", "", "maybe", "Y"]);

        assert!(confirm(&mut operator, "Choose this Device?").unwrap());
        assert_eq!(operator.asked.len(), 4);
        assert_eq!(
            operator
                .said
                .iter()
                .filter(|m| m.starts_with("Invalid input"))
                .count(),
            3
        );
    }

    #[test]
    fn n_declines() {
        let mut operator = ScriptedOperator::answering(["n"]);
        assert!(!confirm(&mut operator, "Choose this Device?").unwrap());
    }
}
