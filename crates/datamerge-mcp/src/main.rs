//! Datamerge MCP server binary.

use clap::Parser;
use datamerge_mcp::config::{CliArgs, ServerSettings, Transport};
use datamerge_mcp::http::{AppState, build_app};
use datamerge_mcp::server::{DatamergeMcpServer, PollDefaults, STDIO_SESSION_ID};
use datamerge_mcp::session::{SessionStore, SessionStoreConfig};
use rmcp::ServiceExt as _;
use std::io::{IsTerminal as _, stdout};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const UPSTREAM_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();
    let settings = ServerSettings::from_cli(cli);

    init_logging(&settings.log_level, settings.transport);
    tracing::info!("Starting Datamerge MCP server v{}", VERSION);

    let http_client = reqwest::Client::builder()
        .timeout(UPSTREAM_REQUEST_TIMEOUT)
        .build()?;
    let sessions = Arc::new(SessionStore::new(SessionStoreConfig {
        fallback_token: settings.api_token.clone(),
        base_url: settings.api_base_url.clone(),
        http: Some(http_client),
    }));
    let poll_defaults = PollDefaults {
        interval_secs: settings.poll_interval,
        timeout_secs: settings.poll_timeout,
    };

    match settings.transport {
        Transport::Stdio => serve_stdio(sessions, poll_defaults).await,
        Transport::Http => serve_http(&settings, sessions, poll_defaults).await,
    }
}

/// Serve MCP over stdio: exactly one implicit session for the process
/// lifetime, lazily configured from the fallback credential or the
/// configure-credential tool.
async fn serve_stdio(sessions: Arc<SessionStore>, poll_defaults: PollDefaults) -> anyhow::Result<()> {
    tracing::info!("Serving MCP over stdio");
    let server = DatamergeMcpServer::new(sessions.clone(), poll_defaults);
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;

    sessions.forget(STDIO_SESSION_ID);
    tracing::info!("Stdio transport closed, shutting down");
    Ok(())
}

async fn serve_http(
    settings: &ServerSettings,
    sessions: Arc<SessionStore>,
    poll_defaults: PollDefaults,
) -> anyhow::Result<()> {
    let addr: SocketAddr = settings
        .bind
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", settings.bind, e))?;

    let ct = CancellationToken::new();
    let state = Arc::new(AppState {
        sessions,
        start_time: Instant::now(),
        version: VERSION,
    });
    let app = build_app(state, poll_defaults, &ct);

    tracing::info!("Serving MCP over streamable HTTP on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let ct_server = ct.clone();

    tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            ct_server.cancelled().await;
        });
        if let Err(e) = server.await {
            tracing::error!(error = %e, "http server stopped with error");
        }
    });

    shutdown_signal(ct).await;
    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Initialize logging. The stdio transport always logs to stderr (stdout
/// carries the protocol); the HTTP transport uses a human-readable layer on a
/// TTY and JSON otherwise.
fn init_logging(log_level: &str, transport: Transport) {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    match transport {
        Transport::Stdio => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
        Transport::Http => {
            if stdout().is_terminal() {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().with_target(true))
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().json())
                    .init();
            }
        }
    }
}

/// Wait for SIGTERM or SIGINT, then cancel the server.
async fn shutdown_signal(ct: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown...");
        }
    }

    ct.cancel();
}
