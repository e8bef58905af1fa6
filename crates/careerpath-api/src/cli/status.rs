//! System status dashboard command.

use anyhow::Result;
use console::style;

use careerpath_core::account::repository::UserRepository;
use careerpath_core::chat::repository::ChatRepository;
use careerpath_infra::llm::test_provider_connection;

use crate::state::AppState;

/// Display system status: record counts, provider settings, and data location.
///
/// With `ping`, also sends a one-word completion to check the provider.
pub async fn status(state: &AppState, ping: bool, json: bool) -> Result<()> {
    let users = state.account_service.repo().count_users().await?;
    let sessions = state.chat_service.chat_repo().count_sessions().await?;
    let messages = state.chat_service.chat_repo().count_messages().await?;

    let llm = &state.config.llm;
    let ping_result = if ping {
        Some(test_provider_connection(state.chat_service.provider()).await)
    } else {
        None
    };

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "users": users,
            "sessions": sessions,
            "messages": messages,
            "llm": {
                "provider": llm.provider,
                "model": llm.model,
                "api_key_env": llm.api_key_env,
                "configured": state.llm_configured,
                "reachable": ping_result.as_ref().map(|r| r.is_ok()),
            },
            "history_token_budget": state.config.chat.history_token_budget,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} careerpath v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Data ──").dim());
    println!("  Users:    {}", style(users).bold());
    println!("  Sessions: {}", style(sessions).bold());
    println!("  Messages: {}", style(messages).bold());
    println!();

    println!("  {}", style("── Provider ──").dim());
    println!("  Provider: {}", style(&llm.provider).cyan());
    println!("  Model:    {}", style(&llm.model).cyan());
    if state.llm_configured {
        println!("  API key:  {} ({})", style("set").green(), llm.api_key_env);
    } else {
        println!(
            "  API key:  {} (export {})",
            style("missing").red().bold(),
            llm.api_key_env
        );
    }
    match &ping_result {
        Some(Ok(())) => println!("  Ping:     {}", style("ok").green()),
        Some(Err(e)) => println!("  Ping:     {}", style(e).red()),
        None => {}
    }
    println!(
        "  History budget: {} tokens",
        state.config.chat.history_token_budget
    );
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Database: {}", style("SQLite (WAL mode)").dim());
    println!();

    Ok(())
}
