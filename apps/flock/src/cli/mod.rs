//! # Flock CLI Module
//!
//! This module implements the CLI interface for Flock.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show network statistics
//! - `init` - Initialize a new database
//! - `register` - Register an account from the command line
//! - `post` - Create a post as an existing account
//! - `follow` - Create a follow edge between two accounts

mod commands;

use clap::{Parser, Subcommand};
use flock_core::FlockError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Flock - Social Network Backend
///
/// A deterministic social-graph core behind a small REST API.
/// Every relation is a membership set; duplicate toggles are conflicts.
#[derive(Parser, Debug)]
#[command(name = "flock")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the network database
    #[arg(short = 'D', long, global = true, default_value = "flock.db")]
    pub database: PathBuf,

    /// Storage backend: "redb" (ACID database) or "memory" (volatile)
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Optional TOML config file (token secret, token TTL)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show network statistics
    Status,

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Register an account
    Register {
        /// Display name
        #[arg(short, long)]
        user_name: String,

        /// Login email
        #[arg(short, long)]
        email: String,

        /// Password (prefer FLOCK_PASSWORD over the command line)
        #[arg(short, long, env = "FLOCK_PASSWORD")]
        password: String,
    },

    /// Create a post as an existing account
    Post {
        /// Author email
        #[arg(short, long)]
        email: String,

        /// Post body
        #[arg(short, long)]
        content: String,

        /// Media references (repeatable)
        #[arg(short, long)]
        media: Vec<String>,
    },

    /// Create a follow edge between two accounts
    Follow {
        /// Acting user's email
        #[arg(short, long)]
        actor: String,

        /// Target user's email
        #[arg(short, long)]
        target: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), FlockError> {
    let backend = cli.backend.as_str();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port, config }) => {
            cmd_server(&cli.database, backend, &host, port, config.as_deref()).await
        }
        Some(Commands::Status) => cmd_status(&cli.database, backend, json_mode),
        Some(Commands::Init { force }) => cmd_init(&cli.database, backend, force),
        Some(Commands::Register {
            user_name,
            email,
            password,
        }) => cmd_register(&cli.database, backend, json_mode, &user_name, &email, &password),
        Some(Commands::Post {
            email,
            content,
            media,
        }) => cmd_post(&cli.database, backend, json_mode, &email, &content, media),
        Some(Commands::Follow { actor, target }) => {
            cmd_follow(&cli.database, backend, json_mode, &actor, &target)
        }
        None => {
            // No subcommand - show status by default
            cmd_status(&cli.database, backend, json_mode)
        }
    }
}
