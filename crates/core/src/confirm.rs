//! Interactive yes/no confirmation, abstracted behind a trait so
//! orchestrators never touch stdin directly.
//!
//! Grounded on original_source `io.c`'s `io_confirm`: print the prompt,
//! read a line, accept a leading `y`/`Y`, reject a leading `n`/`N`,
//! otherwise reprint the prompt and read again.

use std::io::{self, BufRead, Write};

/// Asks the user to confirm an action.
pub trait Confirm {
    /// Prints `prompt` and returns whether the user accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from or writing to the underlying
    /// stream fails.
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Reads confirmation from stdin, writing the prompt to stdout. A direct
/// port of `io_confirm`'s re-prompt loop.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        let mut stdout = io::stdout();

        loop {
            write!(stdout, "{prompt}")?;
            stdout.flush()?;
            let Some(line) = lines.next() else {
                return Ok(false);
            };
            let line = line?;
            let trimmed = line.trim_start();
            if trimmed.starts_with(['y', 'Y']) {
                return Ok(true);
            }
            if trimmed.starts_with(['n', 'N']) {
                return Ok(false);
            }
        }
    }
}

/// Bypasses the prompt entirely, always accepting. Backs `--yes`/`-y`.
pub struct AlwaysYes;

impl Confirm for AlwaysYes {
    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// A scripted implementation for tests: returns each entry of `answers` in
/// turn, panicking if asked more times than it has answers for.
#[cfg(any(test, feature = "test-support"))]
pub struct ScriptedConfirm {
    answers: std::collections::VecDeque<bool>,
}

#[cfg(any(test, feature = "test-support"))]
impl ScriptedConfirm {
    /// Builds a scripted confirmer that returns each of `answers` in order.
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        Ok(self
            .answers
            .pop_front()
            .expect("ScriptedConfirm asked for more answers than it was given"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_yes_never_asks() {
        assert!(AlwaysYes.confirm("Proceed [y/n]? ").unwrap());
    }

    #[test]
    fn scripted_confirm_returns_answers_in_order() {
        let mut confirm = ScriptedConfirm::new([true, false]);
        assert!(confirm.confirm("?").unwrap());
        assert!(!confirm.confirm("?").unwrap());
    }
}
