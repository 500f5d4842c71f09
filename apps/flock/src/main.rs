//! # Flock - Social Network Backend
//!
//! The main binary for the Flock social-graph service.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for network operations
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              apps/flock (THE BINARY)          │
//! │                                               │
//! │  ┌─────────────┐       ┌─────────────┐        │
//! │  │   CLI       │       │   HTTP API  │        │
//! │  │  (clap)     │       │   (axum)    │        │
//! │  └──────┬──────┘       └──────┬──────┘        │
//! │         │                     │               │
//! │         └──────────┬──────────┘               │
//! │                    ▼                          │
//! │            ┌───────────────┐                  │
//! │            │  flock-core   │                  │
//! │            │  (THE LOGIC)  │                  │
//! │            └───────────────┘                  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! flock server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! flock status
//! flock register -u ada -e ada@example.com
//! flock follow -a ada@example.com -t bob@example.com
//! ```

use clap::Parser;
use flock::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — FLOCK_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("FLOCK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flock=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Flock startup banner.
fn print_banner() {
    println!(
        r#"
  ███████╗██╗      ██████╗  ██████╗██╗  ██╗
  ██╔════╝██║     ██╔═══██╗██╔════╝██║ ██╔╝
  █████╗  ██║     ██║   ██║██║     █████╔╝
  ██╔══╝  ██║     ██║   ██║██║     ██╔═██╗
  ██║     ███████╗╚██████╔╝╚██████╗██║  ██╗
  ╚═╝     ╚══════╝ ╚═════╝  ╚═════╝╚═╝  ╚═╝

  Social Network Backend v{}

  Sets, not counters • Conflicts are explicit
"#,
        env!("CARGO_PKG_VERSION")
    );
}
