//! Where passwords come from: the terminal, or `PASTECTL_PASSWORD`.

use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// A source of passwords for create and view.
pub trait PasswordSource {
    /// Obtain a password, showing `prompt` if the source is interactive.
    fn read_password(&mut self, prompt: &str) -> Result<Zeroizing<String>>;

    /// Whether asking again can yield a different answer.
    fn is_interactive(&self) -> bool {
        true
    }
}

/// Prompts on the controlling terminal without echo.
pub struct Terminal;

impl PasswordSource for Terminal {
    fn read_password(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        rpassword::prompt_password(prompt)
            .map(Zeroizing::new)
            .context("failed to read password from terminal")
    }
}

/// A fixed password supplied up front.
pub struct Preset(Zeroizing<String>);

impl Preset {
    pub fn new(password: String) -> Self {
        Self(Zeroizing::new(password))
    }
}

impl PasswordSource for Preset {
    fn read_password(&mut self, _prompt: &str) -> Result<Zeroizing<String>> {
        Ok(self.0.clone())
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// The configured password if there is one, otherwise the terminal.
pub fn from_config(password: Option<String>) -> Box<dyn PasswordSource> {
    match password {
        Some(p) => Box::new(Preset::new(p)),
        None => Box::new(Terminal),
    }
}
