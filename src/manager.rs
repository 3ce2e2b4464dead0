//! Facade composing the device flow, the sealed store, and the refresher.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::config::AuthorityConfig;
use crate::device::DeviceAuthenticator;
use crate::error::{AuthError, Result};
use crate::prompt::{OperatorPrompt, UNPROTECTED_CACHE_WARNING};
use crate::refresh::RefreshOrchestrator;
use crate::seal::TokenSealer;
use crate::store::{TokenStore, CACHE_FILE_MODE};
use crate::token::TokenSnapshot;

/// Credential lifecycle manager: interactive login, cached retrieval with
/// proactive refresh, and logout.
///
/// The sealer and prompt are injected capabilities; the manager holds no
/// process-wide state and every snapshot it returns is an immutable value.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use gangway::config::AuthorityConfig;
/// use gangway::manager::TokenManager;
/// use gangway::prompt::StdioPrompt;
/// use gangway::seal::PlaintextSealer;
/// use gangway::store::TokenStore;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> gangway::error::Result<()> {
/// let manager = TokenManager::new(
///     AuthorityConfig::from_env(),
///     TokenStore::new_default(),
///     Arc::new(PlaintextSealer),
///     Arc::new(StdioPrompt),
/// );
/// let snapshot = manager.login(true, &CancellationToken::new()).await?;
/// println!("signed in until {}", snapshot.expires_on);
/// # Ok(())
/// # }
/// ```
pub struct TokenManager {
    config: AuthorityConfig,
    store: TokenStore,
    sealer: Arc<dyn TokenSealer>,
    prompt: Arc<dyn OperatorPrompt>,
    refresher: RefreshOrchestrator,
}

impl TokenManager {
    pub fn new(
        config: AuthorityConfig,
        store: TokenStore,
        sealer: Arc<dyn TokenSealer>,
        prompt: Arc<dyn OperatorPrompt>,
    ) -> Self {
        let refresher = RefreshOrchestrator::new(&config);
        Self {
            config,
            store,
            sealer,
            prompt,
            refresher,
        }
    }

    /// Interactive login against the configured tenant and authority.
    ///
    /// With `persist`, the consent gate runs first: a sealer that is not
    /// robust requires the operator to affirm the warning before the device
    /// flow starts. A persistence failure after successful authentication is
    /// [`AuthError::PersistFailed`] and still carries the acquired snapshot.
    pub async fn login(
        &self,
        persist: bool,
        cancel: &CancellationToken,
    ) -> Result<TokenSnapshot> {
        self.login_with(self.config.clone(), persist, cancel).await
    }

    /// Login with per-call tenant/authority overrides.
    pub async fn login_with(
        &self,
        config: AuthorityConfig,
        persist: bool,
        cancel: &CancellationToken,
    ) -> Result<TokenSnapshot> {
        if persist && !self.sealer.is_robust() && !self.prompt.confirm(UNPROTECTED_CACHE_WARNING) {
            return Err(AuthError::ConsentDeclined);
        }
        let authenticator = DeviceAuthenticator::new(config);
        let challenge = authenticator.start_device_flow().await?;
        self.prompt.show(&challenge.message);
        let snapshot = authenticator.await_authorization(&challenge, cancel).await?;
        if persist {
            if let Err(source) = self.persist(&snapshot) {
                return Err(AuthError::PersistFailed {
                    snapshot: Box::new(snapshot),
                    source: Box::new(source),
                });
            }
        }
        Ok(snapshot)
    }

    /// Whether a cached token exists on disk.
    pub fn has_cached_token(&self) -> bool {
        self.store.exists()
    }

    /// Load the cached snapshot, refreshing it first when it is within the
    /// freshness threshold.
    ///
    /// A refreshed snapshot is re-sealed and re-saved; if that write fails
    /// the failure is logged and the fresh in-memory snapshot is still
    /// returned, since a stale disk copy does not invalidate it.
    pub async fn get_cached_token(&self) -> Result<TokenSnapshot> {
        if !self.store.exists() {
            return Err(AuthError::NoCachedToken);
        }
        let sealed = self.store.load()?;
        let plain = self
            .sealer
            .unseal(&sealed)
            .map_err(|err| AuthError::CacheCorrupt(err.to_string()))?;
        let snapshot: TokenSnapshot = serde_json::from_slice(&plain)
            .map_err(|err| AuthError::CacheCorrupt(err.to_string()))?;
        if snapshot.is_empty() {
            return Err(AuthError::CacheCorrupt(
                "cached snapshot is empty".to_string(),
            ));
        }
        let (fresh, changed) = self.refresher.ensure_fresh(&snapshot, Utc::now()).await?;
        if changed {
            if let Err(err) = self.persist(&fresh) {
                tracing::warn!(
                    error = %err,
                    "refreshed token could not be re-persisted; the cached copy is stale"
                );
            }
        }
        Ok(fresh)
    }

    /// Delete the cached token. Already-absent is success.
    pub fn remove_cached_token(&self) -> Result<()> {
        self.store.remove()
    }

    fn persist(&self, snapshot: &TokenSnapshot) -> Result<()> {
        let plain = serde_json::to_vec(snapshot)?;
        let sealed = self.sealer.seal(&plain)?;
        self.store.save(&sealed, CACHE_FILE_MODE)
    }
}
