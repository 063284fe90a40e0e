//! Operator prompts for the interactive configuration flow.

use adbloader_core::{AdbLoaderError, Result};
use std::io::{BufRead, Write};
use zeroize::Zeroizing;

/// Source of operator input.
pub trait Prompt {
    /// Reads one visible line, trimmed.
    fn line(&mut self, label: &str) -> Result<String>;

    /// Reads one line without echoing it.
    fn secret(&mut self, label: &str) -> Result<Zeroizing<String>>;
}

/// Reads from the controlling terminal; labels go to stderr.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn line(&mut self, label: &str) -> Result<String> {
        let mut stderr = std::io::stderr();
        write!(stderr, "{}", label)
            .and_then(|()| stderr.flush())
            .map_err(|e| AdbLoaderError::io("Failed to write prompt", e))?;

        let mut input = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut input)
            .map_err(|e| AdbLoaderError::io("Failed to read from the terminal", e))?;
        if read == 0 {
            return Err(AdbLoaderError::configuration(format!(
                "no input for '{}'",
                label.trim_end_matches([':', ' '])
            )));
        }
        Ok(input.trim().to_string())
    }

    fn secret(&mut self, label: &str) -> Result<Zeroizing<String>> {
        rpassword::prompt_password(label)
            .map(Zeroizing::new)
            .map_err(|e| AdbLoaderError::io("Failed to read password from the terminal", e))
    }
}

/// Asks for a value until a non-empty one is given, at most three times.
pub fn required_line(prompt: &mut dyn Prompt, label: &str) -> Result<String> {
    for _ in 0..3 {
        let value = prompt.line(label)?;
        if !value.is_empty() {
            return Ok(value);
        }
        tracing::warn!("A value is required");
    }
    Err(AdbLoaderError::configuration(format!(
        "no value given for '{}'",
        label.trim_end_matches([':', ' '])
    )))
}

/// Asks for a password twice and returns it once both entries match.
pub fn confirmed_secret(prompt: &mut dyn Prompt) -> Result<Zeroizing<String>> {
    let secret = prompt.secret("Password: ")?;
    if secret.is_empty() {
        return Err(AdbLoaderError::configuration("password cannot be empty"));
    }
    let confirmation = prompt.secret("Confirm password: ")?;
    if *secret != *confirmation {
        return Err(AdbLoaderError::configuration("passwords do not match"));
    }
    Ok(secret)
}
