//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AuthConfig};
use flock_core::{FlockError, Network, UserId};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// SERVER CONFIG FILE
// =============================================================================

/// Maximum config file size (64 KB). Config files are tiny; anything
/// larger is a mistake.
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Optional TOML server configuration. Any field left unset falls back
/// to the corresponding `FLOCK_*` environment variable.
#[derive(Debug, Default, Deserialize)]
struct ServerConfig {
    token_secret: Option<String>,
    token_ttl_secs: Option<u64>,
}

/// Load the auth configuration, preferring the config file over the
/// environment.
fn load_auth_config(config_path: Option<&Path>) -> Result<AuthConfig, FlockError> {
    let base = AuthConfig::from_env();

    let Some(path) = config_path else {
        return Ok(base);
    };

    let metadata = std::fs::metadata(path)
        .map_err(|e| FlockError::StorageFailure(format!("Cannot read config metadata: {}", e)))?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(FlockError::InvalidInput(format!(
            "Config file size {} bytes exceeds maximum {} bytes",
            metadata.len(),
            MAX_CONFIG_FILE_SIZE
        )));
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| FlockError::StorageFailure(format!("Read config: {}", e)))?;
    let config: ServerConfig = toml::from_str(&contents)
        .map_err(|e| FlockError::SerializationError(format!("Parse config: {}", e)))?;

    let ttl = config
        .token_ttl_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| base.token_ttl());

    match config.token_secret {
        Some(secret) if !secret.is_empty() => Ok(AuthConfig::new(secret, ttl)),
        _ => Ok(AuthConfig::from_env_with_ttl(ttl)),
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    db_path: &PathBuf,
    backend: &str,
    host: &str,
    port: u16,
    config: Option<&Path>,
) -> Result<(), FlockError> {
    let network = load_or_create_network(db_path, backend)?;
    let auth = load_auth_config(config)?;

    if auth.is_dev_secret() {
        tracing::warn!(
            "⚠️  Token secret is the built-in development secret! \
             Set FLOCK_TOKEN_SECRET (or token_secret in the config file) for production."
        );
    }

    println!("Flock Social Network Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", backend);
    println!("  Database: {:?}", db_path);
    println!("  Token TTL: {}s", auth.token_ttl().as_secs());
    println!();
    println!("Endpoints:");
    println!("  POST /register       - Create an account");
    println!("  POST /login          - Obtain a token");
    println!("  GET  /users          - List users");
    println!("  GET  /posts          - List posts");
    println!("  PUT  /users/{{id}}/follow   - Follow a user");
    println!("  PUT  /posts/{{id}}/like     - Like a post");
    println!("  PUT  /posts/{{id}}/bookmark - Bookmark a post");
    println!("  GET  /bookmarks      - Your bookmarked posts");
    println!("  GET  /health         - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, network, auth).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show network statistics.
pub fn cmd_status(db_path: &PathBuf, backend: &str, json_mode: bool) -> Result<(), FlockError> {
    let network = load_or_create_network(db_path, backend)?;
    let user_count = network.user_count()?;
    let post_count = network.post_count()?;

    if json_mode {
        let output = serde_json::json!({
            "database": db_path.to_string_lossy(),
            "backend": backend,
            "user_count": user_count,
            "post_count": post_count,
            "persistent": network.is_persistent()
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Flock Network Status");
    println!("====================");
    println!("Database: {:?}", db_path);
    println!("Backend:  {}", backend);
    println!();
    println!("Users: {}", user_count);
    println!("Posts: {}", post_count);

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize new database.
pub fn cmd_init(db_path: &PathBuf, backend: &str, force: bool) -> Result<(), FlockError> {
    if db_path.exists() && !force {
        return Err(FlockError::InvalidInput(
            "Database already exists. Use --force to overwrite.".to_string(),
        ));
    }

    match backend {
        "redb" => {
            if force && db_path.exists() {
                std::fs::remove_file(db_path)
                    .map_err(|e| FlockError::StorageFailure(format!("Remove db: {}", e)))?;
            }
            let _network = Network::with_redb(db_path)?;
            println!("Initialized new redb database at {:?}", db_path);
        }
        _ => {
            return Err(FlockError::InvalidInput(format!(
                "Backend '{}' has nothing to initialize. Use: redb",
                backend
            )));
        }
    }

    Ok(())
}

// =============================================================================
// ACCOUNT COMMANDS
// =============================================================================

/// Register an account from the command line.
pub fn cmd_register(
    db_path: &PathBuf,
    backend: &str,
    json_mode: bool,
    user_name: &str,
    email: &str,
    password: &str,
) -> Result<(), FlockError> {
    let mut network = load_or_create_network(db_path, backend)?;
    let user_id = network.register(user_name, email, password)?;

    if json_mode {
        let output = serde_json::json!({
            "user_id": user_id.0,
            "user_name": user_name,
            "email": email
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("Registered {} <{}> as user {}", user_name, email, user_id.0);
    }

    Ok(())
}

/// Create a post as an existing account.
pub fn cmd_post(
    db_path: &PathBuf,
    backend: &str,
    json_mode: bool,
    email: &str,
    content: &str,
    media: Vec<String>,
) -> Result<(), FlockError> {
    let mut network = load_or_create_network(db_path, backend)?;
    let author = lookup_account(&network, email)?;
    let post_id = network.create_post(author, content, media)?;

    if json_mode {
        let output = serde_json::json!({
            "post_id": post_id.0,
            "author": author.0
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("Created post {} for {}", post_id.0, email);
    }

    Ok(())
}

/// Create a follow edge between two accounts.
pub fn cmd_follow(
    db_path: &PathBuf,
    backend: &str,
    json_mode: bool,
    actor_email: &str,
    target_email: &str,
) -> Result<(), FlockError> {
    let mut network = load_or_create_network(db_path, backend)?;
    let actor = lookup_account(&network, actor_email)?;
    let target = lookup_account(&network, target_email)?;
    let update = network.follow(actor, target)?;

    if json_mode {
        let output = serde_json::json!({
            "actor": actor.0,
            "target": target.0,
            "following": update.following,
            "target_followers": update.target_followers
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!(
            "{} now follows {} ({} followers)",
            actor_email, target_email, update.target_followers
        );
    }

    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Load or create a network from a database path with specified backend.
pub fn load_or_create_network(db_path: &PathBuf, backend: &str) -> Result<Network, FlockError> {
    match backend {
        "redb" => Network::with_redb(db_path),
        "memory" => {
            tracing::warn!("Memory backend: all changes are volatile");
            Ok(Network::new())
        }
        _ => Err(FlockError::InvalidInput(format!(
            "Unknown backend: {}. Use: redb, memory",
            backend
        ))),
    }
}

/// Resolve an account by email, mapping absence to InvalidCredentials
/// (never reveals whether the email exists in logs).
fn lookup_account(network: &Network, email: &str) -> Result<UserId, FlockError> {
    network
        .user_by_email(email)?
        .ok_or(FlockError::InvalidCredentials)
}
