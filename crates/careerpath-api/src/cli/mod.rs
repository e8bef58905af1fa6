//! CLI command definitions for the `cpath` binary.
//!
//! Uses clap derive macros for argument parsing. Local administrative
//! commands work directly against the database; `serve` starts the REST API.

pub mod serve;
pub mod session;
pub mod status;
pub mod user;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// AI career counseling chat server and admin tools.
#[derive(Parser)]
#[command(name = "cpath", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export tracing spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `server.port` in config.toml).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to `server.host` in config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Manage user accounts.
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// List a user's chat sessions.
    Sessions {
        /// Email of the account.
        email: String,
    },

    /// Print the full message history of a session.
    History {
        /// Session ID.
        session_id: String,
    },

    /// Show the context window the next message in a session would send.
    Context {
        /// Session ID.
        session_id: String,

        /// History token budget (defaults to `chat.history_token_budget`).
        #[arg(long, allow_negative_numbers = true)]
        budget: Option<i64>,
    },

    /// System status dashboard.
    Status {
        /// Send a test completion to verify the provider key and endpoint.
        #[arg(long)]
        ping: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create an account. Prompts for the password unless --password is given.
    Create {
        /// Login email.
        email: String,

        /// Display name.
        #[arg(long)]
        name: Option<String>,

        /// Password (script/automation mode; prefer the prompt).
        #[arg(long)]
        password: Option<String>,
    },
}
