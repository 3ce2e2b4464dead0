//! CLI entry point for Gangway.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::config::AuthorityConfig;
use crate::error::AuthError;
use crate::manager::TokenManager;
use crate::prompt::StdioPrompt;
use crate::seal::PlaintextSealer;
use crate::store::TokenStore;

/// Gangway storage CLI
#[derive(Parser, Debug)]
#[command(name = "gangway", version, about = "Gangway — sealed credential cache CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with a device code
    Login(LoginArgs),
    /// Show whether a cached token exists and when it expires
    Status,
    /// Remove the cached token
    Logout,
}

/// Arguments for `gangway login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Tenant to sign in against
    #[arg(long)]
    pub tenant: Option<String>,

    /// Authority endpoint override
    #[arg(long)]
    pub authority: Option<String>,

    /// Do not cache the token on disk
    #[arg(long)]
    pub no_persist: bool,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Login(args) => handle_login(args).await,
        Commands::Status => handle_status().await,
        Commands::Logout => handle_logout().await,
    }
}

fn manager_with(config: AuthorityConfig) -> TokenManager {
    TokenManager::new(
        config,
        TokenStore::new_default(),
        Arc::new(PlaintextSealer),
        Arc::new(StdioPrompt),
    )
}

async fn handle_login(args: LoginArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AuthorityConfig::from_env();
    if let Some(tenant) = args.tenant {
        config = config.with_tenant(tenant);
    }
    if let Some(authority) = args.authority {
        config = config.with_authority(authority);
    }
    let manager = manager_with(config);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    match manager.login(!args.no_persist, &cancel).await {
        Ok(snapshot) => {
            println!("Login successful; token valid until {}.", snapshot.expires_on);
            Ok(())
        }
        Err(AuthError::PersistFailed { snapshot, source }) => {
            eprintln!("Login succeeded but the token could not be cached: {source}");
            eprintln!("The token is valid until {} for this invocation only.", snapshot.expires_on);
            std::process::exit(2);
        }
        Err(AuthError::Cancelled) => {
            eprintln!("Login cancelled.");
            std::process::exit(130);
        }
        Err(err) => {
            eprintln!("Login failed: {err}");
            std::process::exit(1);
        }
    }
}

async fn handle_status() -> Result<(), Box<dyn std::error::Error>> {
    let manager = manager_with(AuthorityConfig::from_env());
    if !manager.has_cached_token() {
        println!("No cached token.");
        return Ok(());
    }
    match manager.get_cached_token().await {
        Ok(snapshot) => {
            println!(
                "Cached token for tenant {} is valid until {}.",
                snapshot.tenant, snapshot.expires_on
            );
            Ok(())
        }
        Err(err) => {
            eprintln!("Cached token is unusable: {err}");
            std::process::exit(1);
        }
    }
}

async fn handle_logout() -> Result<(), Box<dyn std::error::Error>> {
    let manager = manager_with(AuthorityConfig::from_env());
    let had_token = manager.has_cached_token();
    manager.remove_cached_token()?;
    if had_token {
        println!("Cached token removed.");
    } else {
        println!("No cached token to remove.");
    }
    Ok(())
}
