//! Interactive device-authorization flow against the authority.

use chrono::{Duration, Utc};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::AuthorityConfig;
use crate::error::{AuthError, Result};
use crate::token::{DeviceCodeChallenge, TokenSnapshot};

/// Outcome of a single poll of the token endpoint.
#[derive(Debug, Clone)]
pub enum DevicePoll {
    Pending { interval_secs: u64 },
    SlowDown { interval_secs: u64 },
    Authorized { snapshot: TokenSnapshot },
    Declined,
    Expired,
}

/// Executes the device-authorization grant: acquires a challenge, then polls
/// until the operator completes sign-in in a browser.
///
/// # Example
/// ```no_run
/// use gangway::config::AuthorityConfig;
/// use gangway::device::DeviceAuthenticator;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> gangway::error::Result<()> {
/// let authenticator = DeviceAuthenticator::new(AuthorityConfig::from_env());
/// let challenge = authenticator.start_device_flow().await?;
/// println!("{}", challenge.message);
/// let snapshot = authenticator
///     .await_authorization(&challenge, &CancellationToken::new())
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct DeviceAuthenticator {
    client: reqwest::Client,
    config: AuthorityConfig,
}

impl DeviceAuthenticator {
    pub fn new(config: AuthorityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }

    /// Request a device code from the authority.
    pub async fn start_device_flow(&self) -> Result<DeviceCodeChallenge> {
        let url = self.config.device_code_url()?;
        tracing::debug!(%url, "requesting device code");
        let resp = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("resource", self.config.resource.as_str()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AuthError::InvalidResponse(format!(
                "device code request failed with status {}",
                resp.status()
            )));
        }
        let payload: DeviceCodeResponse = resp.json().await?;
        let expires_in = parse_secs(&payload.expires_in).ok_or_else(|| {
            AuthError::InvalidResponse("device code expires_in missing or invalid".to_string())
        })?;
        let interval_secs = payload
            .interval
            .as_ref()
            .and_then(parse_secs)
            .map(|secs| secs.max(1) as u64)
            .unwrap_or(5);
        let message = payload.message.unwrap_or_else(|| {
            format!(
                "To sign in, open {} in a browser and enter the code {}.",
                payload.verification_url, payload.user_code
            )
        });
        Ok(DeviceCodeChallenge {
            device_code: payload.device_code,
            user_code: payload.user_code,
            verification_url: payload.verification_url,
            message,
            interval_secs,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }

    /// Poll the token endpoint once for the challenge's status.
    pub async fn poll_once(&self, challenge: &DeviceCodeChallenge) -> Result<DevicePoll> {
        if Utc::now() >= challenge.expires_at {
            return Ok(DevicePoll::Expired);
        }
        let url = self.config.token_url()?;
        let resp = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
                ("client_id", self.config.client_id.as_str()),
                ("device_code", challenge.device_code.as_str()),
                ("resource", self.config.resource.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        // Authorities disagree on whether pending polls are 200 or 400, so
        // the body is authoritative and the status only backs up bad JSON.
        let payload: TokenGrantResponse = serde_json::from_str(&body).map_err(|_| {
            AuthError::InvalidResponse(format!(
                "device token response was not valid JSON (status {status})"
            ))
        })?;
        if payload.access_token.is_some() {
            let snapshot = snapshot_from_grant(
                payload,
                &self.config.tenant_id,
                &self.config.authority_endpoint,
                None,
            )?;
            return Ok(DevicePoll::Authorized { snapshot });
        }
        match payload.error.as_deref() {
            Some("authorization_pending") => Ok(DevicePoll::Pending {
                interval_secs: challenge.interval_secs,
            }),
            Some("slow_down") => Ok(DevicePoll::SlowDown {
                interval_secs: challenge.interval_secs + 2,
            }),
            Some("access_denied") => Ok(DevicePoll::Declined),
            Some("expired_token") | Some("code_expired") => Ok(DevicePoll::Expired),
            Some(other) => Err(AuthError::InvalidResponse(format!(
                "device authorization error: {other}"
            ))),
            None => Err(AuthError::InvalidResponse(format!(
                "device token response missing both token and error (status {status})"
            ))),
        }
    }

    /// Poll at the challenge's advertised interval until the operator
    /// completes sign-in, the challenge expires, the caller cancels, or the
    /// authority declines.
    ///
    /// Never polls faster than the advertised interval. Returns within one
    /// interval of cancellation, with no side effects.
    pub async fn await_authorization(
        &self,
        challenge: &DeviceCodeChallenge,
        cancel: &CancellationToken,
    ) -> Result<TokenSnapshot> {
        let mut interval_secs = challenge.interval_secs.max(1);
        loop {
            let remaining = challenge.expires_at - Utc::now();
            if remaining <= Duration::zero() {
                return Err(AuthError::AuthorizationTimeout);
            }
            let wait = std::time::Duration::from_secs(interval_secs)
                .min(remaining.to_std().unwrap_or_default());
            tokio::select! {
                _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
            match self.poll_once(challenge).await? {
                DevicePoll::Pending { interval_secs: next } => interval_secs = next.max(1),
                DevicePoll::SlowDown { interval_secs: next } => {
                    tracing::debug!(interval_secs = next, "authority asked to slow down");
                    interval_secs = next.max(1);
                }
                DevicePoll::Authorized { snapshot } => return Ok(snapshot),
                DevicePoll::Declined => return Err(AuthError::AuthorizationDeclined),
                DevicePoll::Expired => return Err(AuthError::AuthorizationTimeout),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    #[serde(alias = "verification_uri")]
    verification_url: String,
    expires_in: serde_json::Value,
    interval: Option<serde_json::Value>,
    message: Option<String>,
}

/// Success/error body of the token endpoint, shared by the device grant and
/// the refresh grant.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenGrantResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<serde_json::Value>,
    pub token_type: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Accept seconds as a JSON number or a numeric string; authorities send both.
pub(crate) fn parse_secs(value: &serde_json::Value) -> Option<i64> {
    if let Some(num) = value.as_i64() {
        return Some(num);
    }
    value.as_str().and_then(|text| text.trim().parse().ok())
}

/// Build a fully-populated snapshot from a successful token grant.
///
/// `previous_refresh_token` keeps the old refresh token when the authority
/// does not rotate it.
pub(crate) fn snapshot_from_grant(
    payload: TokenGrantResponse,
    tenant: &str,
    authority_endpoint: &str,
    previous_refresh_token: Option<&str>,
) -> Result<TokenSnapshot> {
    let access_token = payload.access_token.ok_or_else(|| {
        AuthError::InvalidResponse("token response missing access_token".to_string())
    })?;
    let expires_in = payload
        .expires_in
        .as_ref()
        .and_then(parse_secs)
        .ok_or_else(|| {
            AuthError::InvalidResponse("token response expires_in missing or invalid".to_string())
        })?;
    let refresh_token = payload
        .refresh_token
        .or_else(|| previous_refresh_token.map(str::to_string))
        .unwrap_or_default();
    Ok(TokenSnapshot {
        access_token,
        refresh_token,
        expires_on: Utc::now() + Duration::seconds(expires_in),
        token_type: payload.token_type.unwrap_or_else(|| "Bearer".to_string()),
        tenant: tenant.to_string(),
        authority_endpoint: authority_endpoint.to_string(),
    })
}
