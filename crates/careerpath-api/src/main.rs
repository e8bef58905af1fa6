//! careerpath CLI and REST API entry point.
//!
//! Binary name: `cpath`
//!
//! Parses CLI arguments, sets up tracing, initializes the database and
//! services, then dispatches to a command handler or starts the server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use careerpath_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands, UserCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flags when set.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,careerpath=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!(e))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "cpath", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { port, host } => {
            cli::serve::serve(state, port, host, cli.quiet).await?;
        }

        Commands::User { action } => match action {
            UserCommand::Create {
                email,
                name,
                password,
            } => {
                cli::user::create_user(&state, &email, name, password, cli.json).await?;
            }
        },

        Commands::Sessions { email } => {
            cli::session::list_sessions(&state, &email, cli.json).await?;
        }

        Commands::History { session_id } => {
            cli::session::show_history(&state, &session_id, cli.json).await?;
        }

        Commands::Context { session_id, budget } => {
            cli::session::show_context(&state, &session_id, budget, cli.json).await?;
        }

        Commands::Status { ping } => {
            cli::status::status(&state, ping, cli.json).await?;
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}
