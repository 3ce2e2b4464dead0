#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use gangway::error::{AuthError, Result};
use gangway::prompt::OperatorPrompt;
use gangway::seal::TokenSealer;
use gangway::token::{DeviceCodeChallenge, TokenSnapshot};

/// Reversible sealer that visibly scrambles the payload, with a
/// configurable robustness flag for consent-gate tests.
pub struct XorSealer {
    robust: bool,
}

impl XorSealer {
    pub fn robust() -> Self {
        Self { robust: true }
    }

    pub fn fragile() -> Self {
        Self { robust: false }
    }
}

impl TokenSealer for XorSealer {
    fn seal(&self, plain: &[u8]) -> Result<Vec<u8>> {
        Ok(plain.iter().map(|b| b ^ 0x5a).collect())
    }

    fn unseal(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        Ok(sealed.iter().map(|b| b ^ 0x5a).collect())
    }

    fn is_robust(&self) -> bool {
        self.robust
    }
}

/// Sealer whose unseal always fails, as if the blob failed its integrity
/// check.
pub struct RejectingSealer;

impl TokenSealer for RejectingSealer {
    fn seal(&self, plain: &[u8]) -> Result<Vec<u8>> {
        Ok(plain.to_vec())
    }

    fn unseal(&self, _sealed: &[u8]) -> Result<Vec<u8>> {
        Err(AuthError::CacheCorrupt(
            "sealed blob failed its integrity check".to_string(),
        ))
    }

    fn is_robust(&self) -> bool {
        true
    }
}

/// Prompt with a scripted consent answer that records everything it was
/// shown or asked.
pub struct ScriptedPrompt {
    answer: bool,
    pub shown: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn affirming() -> Self {
        Self {
            answer: true,
            shown: Mutex::new(Vec::new()),
            warnings: Mutex::new(Vec::new()),
        }
    }

    pub fn declining() -> Self {
        Self {
            answer: false,
            shown: Mutex::new(Vec::new()),
            warnings: Mutex::new(Vec::new()),
        }
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn show(&self, message: &str) {
        self.shown
            .lock()
            .expect("prompt lock poisoned")
            .push(message.to_string());
    }

    fn confirm(&self, warning: &str) -> bool {
        self.warnings
            .lock()
            .expect("prompt lock poisoned")
            .push(warning.to_string());
        self.answer
    }
}

pub fn snapshot(authority_endpoint: &str, expires_on: DateTime<Utc>) -> TokenSnapshot {
    TokenSnapshot {
        access_token: "at-cached".to_string(),
        refresh_token: "rt-cached".to_string(),
        expires_on,
        token_type: "Bearer".to_string(),
        tenant: "common".to_string(),
        authority_endpoint: authority_endpoint.to_string(),
    }
}

pub fn challenge(interval_secs: u64, expires_at: DateTime<Utc>) -> DeviceCodeChallenge {
    DeviceCodeChallenge {
        device_code: "device-code-1".to_string(),
        user_code: "ABCD-EFGH".to_string(),
        verification_url: "https://login.example.test/device".to_string(),
        message: "To sign in, open https://login.example.test/device and enter ABCD-EFGH."
            .to_string(),
        interval_secs,
        expires_at,
    }
}
