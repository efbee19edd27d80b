//! CLI arguments and effective settings.
//!
//! Every flag has a `DATAMERGE_*` environment fallback; the effective
//! settings struct merges CLI/env values over defaults.

use clap::Parser;

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Which transport carries the MCP protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Transport {
    /// Serve over stdio: one implicit session for the process lifetime.
    #[value(name = "stdio")]
    Stdio,
    /// Serve over streamable HTTP: many concurrent sessions on one endpoint.
    #[value(name = "http")]
    Http,
}

/// CLI arguments for the Datamerge MCP server.
#[derive(Parser, Debug, Clone)]
#[command(name = "datamerge-mcp")]
#[command(version, about = "Expose the Datamerge company-data API as MCP tools")]
pub struct CliArgs {
    /// Transport to serve MCP over.
    #[arg(short = 't', long, env = "DATAMERGE_TRANSPORT", value_enum)]
    pub transport: Option<Transport>,

    /// HTTP bind address (ip:port), http transport only.
    #[arg(short = 'b', long, env = "DATAMERGE_BIND")]
    pub bind: Option<String>,

    /// Process-wide fallback Datamerge API token, used for sessions that
    /// never present their own credential.
    #[arg(long = "api-token", env = "DATAMERGE_API_TOKEN")]
    pub api_token: Option<String>,

    /// Datamerge API base URL override.
    #[arg(long = "api-base-url", env = "DATAMERGE_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Log level. Supports tracing filter syntax.
    #[arg(short = 'l', long = "log-level", env = "DATAMERGE_LOG")]
    pub log_level: Option<String>,

    /// Default seconds between job status checks when a tool call supplies
    /// none.
    #[arg(long = "poll-interval", env = "DATAMERGE_POLL_INTERVAL_SECS")]
    pub poll_interval: Option<u64>,

    /// Default overall job deadline in seconds when a tool call supplies
    /// none.
    #[arg(long = "poll-timeout", env = "DATAMERGE_POLL_TIMEOUT_SECS")]
    pub poll_timeout: Option<u64>,
}

/// Effective server settings (defaults merged with CLI/env).
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub transport: Transport,
    pub bind: String,
    pub api_token: Option<String>,
    pub api_base_url: Option<String>,
    pub log_level: String,
    pub poll_interval: Option<u64>,
    pub poll_timeout: Option<u64>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            bind: DEFAULT_BIND.to_string(),
            api_token: None,
            api_base_url: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            poll_interval: None,
            poll_timeout: None,
        }
    }
}

impl ServerSettings {
    #[must_use]
    pub fn from_cli(cli: CliArgs) -> Self {
        let defaults = Self::default();
        Self {
            transport: cli.transport.unwrap_or(defaults.transport),
            bind: cli.bind.unwrap_or(defaults.bind),
            api_token: cli.api_token.filter(|t| !t.trim().is_empty()),
            api_base_url: cli.api_base_url.filter(|u| !u.trim().is_empty()),
            log_level: cli.log_level.unwrap_or(defaults.log_level),
            poll_interval: cli.poll_interval.filter(|&v| v > 0),
            poll_timeout: cli.poll_timeout.filter(|&v| v > 0),
        }
    }
}
