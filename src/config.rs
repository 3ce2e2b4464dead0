//! Protocol parameters for the device-authorization flow.
//!
//! All defaults live here as explicit values on [`AuthorityConfig`] rather
//! than process-wide state, so tests and callers can substitute any of them
//! per instance.

use std::path::PathBuf;

use crate::error::{AuthError, Result};

/// Application (client) identifier registered for the Gangway CLI.
pub const DEFAULT_CLIENT_ID: &str = "7f3c9b2e-5d84-4a1a-9c60-31e8d52f7b41";

/// Resource identifier of the storage service tokens are requested for.
pub const DEFAULT_RESOURCE: &str = "https://storage.gangway.dev";

/// Default authority endpoint.
pub const DEFAULT_AUTHORITY_ENDPOINT: &str = "https://login.gangway.dev";

/// Default tenant literal for multi-tenant sign-in.
pub const DEFAULT_TENANT_ID: &str = "common";

/// Authority configuration for one login or refresh exchange.
///
/// # Example
/// ```
/// use gangway::config::AuthorityConfig;
///
/// let config = AuthorityConfig::new().with_tenant("contoso.example");
/// let url = config.device_code_url()?;
/// assert!(url.ends_with("/contoso.example/oauth2/devicecode"));
/// # Ok::<(), gangway::error::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    pub authority_endpoint: String,
    pub tenant_id: String,
    pub client_id: String,
    pub resource: String,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorityConfig {
    /// Crate defaults for every parameter.
    pub fn new() -> Self {
        Self {
            authority_endpoint: DEFAULT_AUTHORITY_ENDPOINT.to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            resource: DEFAULT_RESOURCE.to_string(),
        }
    }

    /// Defaults layered with `GANGWAY_*` environment variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::new();
        if let Ok(authority) = std::env::var("GANGWAY_AUTHORITY") {
            config.authority_endpoint = authority;
        }
        if let Ok(tenant) = std::env::var("GANGWAY_TENANT") {
            config.tenant_id = tenant;
        }
        if let Ok(client_id) = std::env::var("GANGWAY_CLIENT_ID") {
            config.client_id = client_id;
        }
        if let Ok(resource) = std::env::var("GANGWAY_RESOURCE") {
            config.resource = resource;
        }
        config
    }

    pub fn with_authority(mut self, authority_endpoint: impl Into<String>) -> Self {
        self.authority_endpoint = authority_endpoint.into();
        self
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    /// Endpoint that issues device codes.
    pub fn device_code_url(&self) -> Result<String> {
        self.endpoint("devicecode")
    }

    /// Endpoint that exchanges device codes and refresh tokens.
    pub fn token_url(&self) -> Result<String> {
        self.endpoint("token")
    }

    fn endpoint(&self, leaf: &str) -> Result<String> {
        let tenant = self.tenant_id.trim();
        if tenant.is_empty() {
            return Err(AuthError::Config("tenant id is blank".to_string()));
        }
        if tenant.contains('/') {
            return Err(AuthError::Config(format!(
                "tenant id {tenant:?} must not contain path separators"
            )));
        }
        let base = reqwest::Url::parse(&self.authority_endpoint).map_err(|err| {
            AuthError::Config(format!(
                "authority endpoint {:?} is not a valid URL: {err}",
                self.authority_endpoint
            ))
        })?;
        if base.scheme() != "https" && base.scheme() != "http" {
            return Err(AuthError::Config(format!(
                "authority endpoint {:?} must use http or https",
                self.authority_endpoint
            )));
        }
        if base.host_str().is_none() {
            return Err(AuthError::Config(format!(
                "authority endpoint {:?} has no host",
                self.authority_endpoint
            )));
        }
        Ok(format!(
            "{}/{tenant}/oauth2/{leaf}",
            self.authority_endpoint.trim_end_matches('/')
        ))
    }
}

/// Default directory for the token cache file.
pub fn default_cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GANGWAY_CACHE_DIR") {
        return PathBuf::from(dir);
    }
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".gangway"))
        .unwrap_or_else(|| PathBuf::from(".gangway"))
}
