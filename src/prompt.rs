use crate::error::{CloudError, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

/// Interactive questions the resolver and binder may ask.
pub trait Prompter {
    /// Ask for a free-form line of text.
    fn input(&self, message: &str) -> Result<String>;

    /// Ask the user to pick one of `items`; returns its index.
    fn select(&self, message: &str, items: &[String]) -> Result<usize>;
}

/// Terminal prompts rendered with dialoguer.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn input(&self, message: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .interact_text()
            .map_err(|e| CloudError::Prompt(e.to_string()))
    }

    fn select(&self, message: &str, items: &[String]) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(items)
            .default(0)
            .interact()
            .map_err(|e| CloudError::Prompt(e.to_string()))
    }
}
