//! Password prompts

use anyhow::Result;
use dialoguer::Password;

/// Resolve the password from the command line or an interactive prompt.
///
/// When packing the prompt asks twice so a typo cannot lock the archive.
pub fn resolve_password(
    password: Option<String>,
    ask: bool,
    confirm: bool,
) -> Result<Option<String>> {
    if !ask {
        return Ok(password);
    }

    let mut prompt = Password::new().with_prompt("Archive password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    Ok(Some(prompt.interact()?))
}
