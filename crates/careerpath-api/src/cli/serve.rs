//! `cpath serve`: run the REST API until Ctrl+C or SIGTERM.

use anyhow::Result;
use console::style;

use crate::http::router::build_router;
use crate::state::AppState;

/// Bind and serve. CLI flags override the `[server]` config section.
pub async fn serve(
    state: AppState,
    port: Option<u16>,
    host: Option<String>,
    quiet: bool,
) -> Result<()> {
    let host = host.unwrap_or_else(|| state.config.server.host.clone());
    let port = port.unwrap_or(state.config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "REST API listening");

    if !quiet {
        println!(
            "  {} careerpath API listening on {}",
            style("⚡").bold(),
            style(format!("http://{addr}")).cyan()
        );
        if !state.llm_configured {
            println!(
                "  {} {} is not set; sending messages will fail",
                style("!").yellow().bold(),
                style(&state.config.llm.api_key_env).bold()
            );
        }
        println!("  {}", style("Press Ctrl+C to stop").dim());
    }

    let router = build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
