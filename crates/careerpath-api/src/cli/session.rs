//! Session inspection CLI commands: sessions, history, context.
//!
//! These are local administrative views and read the database directly,
//! without going through bearer token authentication.

use anyhow::{Context, Result};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use uuid::Uuid;

use careerpath_core::account::repository::UserRepository;
use careerpath_core::chat::repository::ChatRepository;
use careerpath_types::chat::MessageRole;

use crate::http::handlers::message::ContextPreview;
use crate::state::AppState;

/// List a user's sessions, most recently active first.
///
/// # Examples
///
/// ```bash
/// cpath sessions ada@example.com
/// cpath sessions ada@example.com --json
/// ```
pub async fn list_sessions(state: &AppState, email: &str, json: bool) -> Result<()> {
    let email = email.trim().to_lowercase();
    let user = state
        .account_service
        .repo()
        .get_user_by_email(&email)
        .await?
        .with_context(|| format!("No account for '{email}'"))?;

    let sessions = state
        .chat_service
        .list_sessions(&user.id, None, Some(careerpath_core::chat::service::MAX_PAGE_SIZE))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions for '{}'",
            style("i").blue().bold(),
            style(&user.email).cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Topic").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
        Cell::new("Last message").fg(Color::White),
    ]);

    for overview in &sessions {
        let session = &overview.session;
        let last = overview
            .last_message
            .as_ref()
            .map(|m| truncate(&m.content, 40))
            .unwrap_or_else(|| "(empty)".to_string());

        table.add_row(vec![
            Cell::new(session.id.to_string()).fg(Color::DarkGrey),
            Cell::new(truncate(&session.title, 40)).fg(Color::Cyan),
            Cell::new(session.topic.as_deref().unwrap_or("-")).fg(Color::White),
            Cell::new(session.updated_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::White),
            Cell::new(last).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("  Sessions for '{}'", style(&user.email).cyan().bold());
    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Print every message in a session, oldest first.
pub async fn show_history(state: &AppState, session_id: &str, json: bool) -> Result<()> {
    let session_id = parse_session_id(session_id)?;
    let repo = state.chat_service.chat_repo();

    let session = repo
        .get_session(&session_id)
        .await?
        .with_context(|| format!("Session '{session_id}' not found"))?;
    let messages = repo.get_messages(&session_id, None, None).await?;

    if json {
        let out = serde_json::json!({ "session": session, "messages": messages });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style(&session.title).cyan().bold(),
        style(format!("({} messages)", messages.len())).dim()
    );
    println!();

    for message in &messages {
        let who = match message.role {
            MessageRole::User => style("you").green().bold(),
            MessageRole::Assistant => style("counselor").magenta().bold(),
            MessageRole::System => style("system").yellow().bold(),
        };
        println!(
            "  {} {}",
            who,
            style(message.created_at.format("%Y-%m-%d %H:%M:%S")).dim()
        );
        for line in message.content.lines() {
            println!("    {line}");
        }
        println!();
    }

    Ok(())
}

/// Show the prompt list the next message would send, and how it was cut.
pub async fn show_context(
    state: &AppState,
    session_id: &str,
    budget: Option<i64>,
    json: bool,
) -> Result<()> {
    let session_id = parse_session_id(session_id)?;
    let budget = budget.unwrap_or(state.chat_service.settings().history_token_budget);

    let window = state
        .chat_service
        .preview_context_window(None, &session_id, Some(budget))
        .await?;
    let preview = ContextPreview::new(window, budget);

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Content").fg(Color::White),
    ]);

    for (i, unit) in preview.units.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(unit.role.to_string()).fg(Color::Cyan),
            Cell::new(truncate(&unit.content, 80)),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  Budget {}  History tokens {}  Included {}  Omitted {}",
        style(preview.budget).bold(),
        style(preview.history_tokens).bold(),
        style(preview.included_messages).green(),
        if preview.truncated {
            style(preview.omitted_messages).yellow()
        } else {
            style(preview.omitted_messages).dim()
        }
    );
    println!();

    Ok(())
}

fn parse_session_id(s: &str) -> Result<Uuid> {
    s.trim()
        .parse::<Uuid>()
        .with_context(|| format!("Invalid session ID: {s}"))
}

/// Shorten to `max` characters on a char boundary, single line.
fn truncate(s: &str, max: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        flat
    }
}
