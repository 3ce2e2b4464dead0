//! Gangway — credential lifecycle for the Gangway storage CLI.
//!
//! Signs in with the OAuth2 device-authorization grant, caches the resulting
//! token sealed on local disk, and refreshes it proactively so later
//! invocations work without any interaction.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use gangway::{AuthorityConfig, PlaintextSealer, StdioPrompt, TokenManager, TokenStore};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> gangway::error::Result<()> {
//! let manager = TokenManager::new(
//!     AuthorityConfig::from_env(),
//!     TokenStore::new_default(),
//!     Arc::new(PlaintextSealer),
//!     Arc::new(StdioPrompt),
//! );
//! let snapshot = if manager.has_cached_token() {
//!     manager.get_cached_token().await?
//! } else {
//!     manager.login(true, &CancellationToken::new()).await?
//! };
//! println!("token valid until {}", snapshot.expires_on);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod manager;
pub mod prompt;
pub mod refresh;
pub mod seal;
pub mod store;
pub mod token;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::AuthorityConfig;
pub use device::{DeviceAuthenticator, DevicePoll};
pub use error::AuthError;
pub use manager::TokenManager;
pub use prompt::{AutoDecline, OperatorPrompt, StdioPrompt};
pub use refresh::RefreshOrchestrator;
pub use seal::{PlaintextSealer, TokenSealer};
pub use store::TokenStore;
pub use token::{DeviceCodeChallenge, TokenSnapshot};
