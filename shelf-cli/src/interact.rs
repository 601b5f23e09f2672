use dialoguer::{Confirm, Input};
use eyre::{eyre, Context, Result};

pub fn user_input(prompt: &str) -> Result<String> {
    Input::new()
        .with_prompt(prompt)
        .interact_text()
        .wrap_err_with(|| eyre!("User input cancelled"))
}

pub fn user_confirm(prompt: &str) -> Result<bool> {
    Confirm::with_theme(&dialoguer::theme::ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .wrap_err_with(|| eyre!("User confirmation cancelled"))
}

/// Uses `value` when given, otherwise asks the user for it.
pub fn value_or_input(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => user_input(prompt),
    }
}
