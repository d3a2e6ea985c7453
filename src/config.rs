//! Deployment configuration, read from the environment.
//!
//! The Storefront credentials are looked up fresh on every invocation. They
//! never change over the life of a Lambda process, so there's no point in
//! caching them, and re-reading means a missing variable is reported on the
//! request that trips over it rather than killing the whole function at
//! start-up.

use std::{collections::HashMap, fmt};
use thiserror::Error;

pub const STOREFRONT_TOKEN_VAR: &str = "SHOPIFY_STOREFRONT_TOKEN";
pub const SHOP_DOMAIN_VAR: &str = "SHOPIFY_SHOP_DOMAIN";
pub const API_VERSION_VAR: &str = "SHOPIFY_API_VERSION";
pub const CORS_ORIGINS_VAR: &str = "CORS_ALLOWED_ORIGINS";

pub const DEFAULT_API_VERSION: &str = "2024-01";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    Missing(&'static str),

    #[error("`{0}` is not a valid CORS origin")]
    InvalidOrigin(String),
}

/// Somewhere to look up configuration variables.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;

    /// Like `var`, but treats an empty value as unset.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }
}

/// The real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Clone)]
pub struct ServerConfig {
    pub storefront_token: String,
    pub shop_domain: String,
    pub api_version: String,
}

impl ServerConfig {
    pub fn load<E: EnvSource + ?Sized>(env: &E) -> Result<Self, ConfigError> {
        let storefront_token = env
            .non_empty(STOREFRONT_TOKEN_VAR)
            .ok_or(ConfigError::Missing(STOREFRONT_TOKEN_VAR))?;
        let shop_domain = env
            .non_empty(SHOP_DOMAIN_VAR)
            .ok_or(ConfigError::Missing(SHOP_DOMAIN_VAR))?;
        let api_version = env
            .non_empty(API_VERSION_VAR)
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned());

        Ok(ServerConfig {
            storefront_token,
            shop_domain,
            api_version,
        })
    }

    /// The Storefront GraphQL endpoint for this shop and API version.
    pub fn endpoint(&self) -> String {
        self.endpoint_at(&format!("https://{}", self.shop_domain))
    }

    /// The GraphQL endpoint path for our API version, on some other origin.
    pub fn endpoint_at(&self, origin: &str) -> String {
        format!(
            "{}/api/{}/graphql.json",
            origin.trim_end_matches('/'),
            self.api_version
        )
    }
}

// Hand-written so that the token can't leak into the logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("storefront_token", &"<redacted>")
            .field("shop_domain", &self.shop_domain)
            .field("api_version", &self.api_version)
            .finish()
    }
}
