use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point-in-time OAuth credential.
///
/// A snapshot is immutable once produced: refreshing or resealing yields a
/// new value rather than mutating this one. It is either fully populated or
/// the designated [`TokenSnapshot::empty`] sentinel; nothing in between is
/// ever persisted or returned.
///
/// The serialized form is what gets sealed into the cache file, with the
/// tenant and authority carried under underscore-prefixed keys so they sort
/// apart from the protocol fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_on: DateTime<Utc>,
    pub token_type: String,
    #[serde(rename = "_tenant")]
    pub tenant: String,
    #[serde(rename = "_ad_endpoint")]
    pub authority_endpoint: String,
}

impl TokenSnapshot {
    /// The empty sentinel: all identity fields blank, expiry at the epoch.
    pub fn empty() -> Self {
        Self {
            access_token: String::new(),
            refresh_token: String::new(),
            expires_on: DateTime::<Utc>::from(std::time::UNIX_EPOCH),
            token_type: String::new(),
            tenant: String::new(),
            authority_endpoint: String::new(),
        }
    }

    /// Whether this snapshot is the empty sentinel.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
            && self.refresh_token.is_empty()
            && self.tenant.is_empty()
            && self.authority_endpoint.is_empty()
    }

    /// Remaining validity relative to `now`. Negative once expired.
    pub fn remaining_validity(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.expires_on - now
    }
}

/// Ephemeral artifact of one device-authorization attempt.
///
/// Lives only until it is exchanged for a [`TokenSnapshot`] or until
/// `expires_at` elapses; never persisted.
#[derive(Debug, Clone)]
pub struct DeviceCodeChallenge {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    /// Human-readable instructions from the authority, shown to the operator.
    pub message: String,
    pub interval_secs: u64,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_sentinel_round_trips() {
        let empty = TokenSnapshot::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.expires_on.timestamp(), 0);
    }

    #[test]
    fn populated_snapshot_is_not_empty() {
        let snapshot = TokenSnapshot {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_on: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            token_type: "Bearer".to_string(),
            tenant: "common".to_string(),
            authority_endpoint: "https://login.gangway.dev".to_string(),
        };
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn serialized_form_uses_underscore_keys_and_unix_seconds() {
        let snapshot = TokenSnapshot {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_on: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            token_type: "Bearer".to_string(),
            tenant: "common".to_string(),
            authority_endpoint: "https://login.gangway.dev".to_string(),
        };
        let value: serde_json::Value =
            serde_json::from_slice(&serde_json::to_vec(&snapshot).unwrap()).unwrap();
        assert_eq!(value["_tenant"], "common");
        assert_eq!(value["_ad_endpoint"], "https://login.gangway.dev");
        assert_eq!(value["expires_on"], 1_700_000_000);
        assert_eq!(value["access_token"], "at");

        let back: TokenSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn remaining_validity_goes_negative_after_expiry() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut snapshot = TokenSnapshot::empty();
        snapshot.expires_on = now - chrono::Duration::seconds(30);
        assert!(snapshot.remaining_validity(now) < chrono::Duration::zero());
    }
}
