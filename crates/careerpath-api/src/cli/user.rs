//! Account CLI commands.

use anyhow::Result;
use console::style;
use dialoguer::Password;

use crate::state::AppState;

/// Create an account with a hidden, confirmed password prompt.
///
/// # Examples
///
/// ```bash
/// cpath user create ada@example.com --name Ada
/// ```
pub async fn create_user(
    state: &AppState,
    email: &str,
    name: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt(format!("Password for {}", style(email).bold()))
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    let user = state
        .account_service
        .signup(email, &password, name)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!();
        println!(
            "  {} Created account {} ({})",
            style("✓").green().bold(),
            style(&user.email).cyan().bold(),
            style(user.id).dim()
        );
        println!();
    }

    Ok(())
}
