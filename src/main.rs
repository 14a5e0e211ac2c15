//! Log viewer server.
//!
//! ```text
//!     Client ──▶ listener ──▶ request id / trace / limits
//!                                  │
//!                                  ▼
//!                        access gate (allow-list,
//!                        trusted X-Forwarded-For)
//!                                  │  403 {code, message, your_ip}
//!                                  ▼
//!                          /log handlers ──▶ log_dir
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use slog_viewer::config::{load_config, validate_config, ConfigError, ViewerConfig};
use slog_viewer::observability::{logging, metrics};
use slog_viewer::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "slog-viewer")]
#[command(about = "Serve a log directory over HTTP behind an IP allow-list", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `viewer.log_dir`.
    #[arg(long)]
    log_dir: Option<String>,
}

/// Load the file (or defaults), apply command-line overrides, then validate
/// the result.
fn resolve_config(args: Args) -> Result<ViewerConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(dir) = args.log_dir {
        config.viewer.log_dir = dir;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(args)?;

    logging::init(&config.observability.log_level);
    tracing::info!("slog-viewer v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        log_dir = %config.viewer.log_dir,
        ip_restriction = config.access.enabled,
        allowed_ips = ?config.access.allowed_ips,
        trusted_proxies = ?config.access.trusted_proxies,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog_viewer::config::ValidationError;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("slog-viewer").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let config = resolve_config(args(&[])).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides_are_validated() {
        let err = resolve_config(args(&["--log-dir", ""])).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors, vec![ValidationError::EmptyLogDir]),
            other => panic!("unexpected error: {other}"),
        }

        let err = resolve_config(args(&["--bind", "not-an-address"])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_override_applied() {
        let config = resolve_config(args(&["--bind", "127.0.0.1:9100", "--log-dir", "/var/log/app"])).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9100");
        assert_eq!(config.viewer.log_dir, "/var/log/app");
    }
}
