//! Freshness-threshold-based token refresh.

use chrono::{DateTime, Duration, Utc};

use crate::config::AuthorityConfig;
use crate::device::{snapshot_from_grant, TokenGrantResponse};
use crate::error::{AuthError, Result};
use crate::token::TokenSnapshot;

/// Minimum remaining validity below which a refresh is attempted.
pub const REFRESH_THRESHOLD_SECS: i64 = 600;

/// Decides whether a snapshot needs refreshing and performs the
/// refresh-token exchange when it does.
///
/// The exchange targets the authority recorded in the snapshot itself, so a
/// token cached against a non-default authority refreshes against that same
/// authority. There is no silent fallback: a rejected exchange is
/// [`AuthError::RefreshFailed`] and the caller must log in interactively.
pub struct RefreshOrchestrator {
    client: reqwest::Client,
    client_id: String,
    resource: String,
    threshold: Duration,
}

impl RefreshOrchestrator {
    pub fn new(config: &AuthorityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            resource: config.resource.clone(),
            threshold: Duration::seconds(REFRESH_THRESHOLD_SECS),
        }
    }

    /// Override the freshness threshold.
    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }

    /// Return the snapshot unchanged while it stays fresh past the
    /// threshold; otherwise exchange its refresh token for a new snapshot.
    ///
    /// Idempotent: calling twice with a still-fresh token is a no-op both
    /// times and touches no network.
    pub async fn ensure_fresh(
        &self,
        snapshot: &TokenSnapshot,
        now: DateTime<Utc>,
    ) -> Result<(TokenSnapshot, bool)> {
        if snapshot.remaining_validity(now) > self.threshold {
            return Ok((snapshot.clone(), false));
        }
        tracing::debug!(
            expires_on = %snapshot.expires_on,
            "token within refresh threshold, exchanging refresh token"
        );
        let refreshed = self.exchange(snapshot).await?;
        Ok((refreshed, true))
    }

    async fn exchange(&self, snapshot: &TokenSnapshot) -> Result<TokenSnapshot> {
        if snapshot.refresh_token.is_empty() {
            return Err(AuthError::RefreshFailed(
                "no refresh token in the cached snapshot".to_string(),
            ));
        }
        let config = AuthorityConfig::new()
            .with_authority(snapshot.authority_endpoint.clone())
            .with_tenant(snapshot.tenant.clone())
            .with_client_id(self.client_id.clone())
            .with_resource(self.resource.clone());
        let url = config.token_url()?;
        let resp = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("refresh_token", snapshot.refresh_token.as_str()),
                ("resource", self.resource.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        let payload: TokenGrantResponse = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(_) => {
                return Err(AuthError::RefreshFailed(format!(
                    "token endpoint returned status {status}"
                )));
            }
        };
        if !status.is_success() || payload.access_token.is_none() {
            let reason = payload
                .error_description
                .or(payload.error)
                .unwrap_or_else(|| format!("token endpoint returned status {status}"));
            return Err(AuthError::RefreshFailed(reason));
        }
        snapshot_from_grant(
            payload,
            &snapshot.tenant,
            &snapshot.authority_endpoint,
            Some(&snapshot.refresh_token),
        )
    }
}
