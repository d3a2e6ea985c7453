//! CORS response headers.
//!
//! Every response carries the same header set. The allowed origin defaults to
//! `*`; setting `CORS_ALLOWED_ORIGINS` to a comma-separated list locks it down
//! to specific storefront domains, in which case the caller's `Origin` is
//! echoed back only when it is on the list.

use lambda_http::http::{
    header::{
        ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
        ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, VARY,
    },
    HeaderMap, HeaderValue,
};

use crate::config::{ConfigError, EnvSource, CORS_ORIGINS_VAR};

const ALLOW_METHODS: &str = "GET,OPTIONS,PATCH,DELETE,POST,PUT";
const ALLOW_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, \
    Content-Length, Content-MD5, Content-Type, Date, X-Api-Version";

#[derive(Clone, Debug, Default)]
pub enum CorsPolicy {
    #[default]
    AnyOrigin,
    AllowList(Vec<HeaderValue>),
}

impl CorsPolicy {
    pub fn from_env<E: EnvSource + ?Sized>(env: &E) -> Result<Self, ConfigError> {
        match env.non_empty(CORS_ORIGINS_VAR) {
            Some(list) => Self::from_list(&list),
            None => Ok(CorsPolicy::AnyOrigin),
        }
    }

    pub fn from_list(list: &str) -> Result<Self, ConfigError> {
        let mut origins = Vec::new();

        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if item == "*" {
                return Ok(CorsPolicy::AnyOrigin);
            }

            let value = HeaderValue::from_str(item)
                .map_err(|_| ConfigError::InvalidOrigin(item.to_owned()))?;
            origins.push(value);
        }

        if origins.is_empty() {
            Ok(CorsPolicy::AnyOrigin)
        } else {
            Ok(CorsPolicy::AllowList(origins))
        }
    }

    /// Add the CORS headers for a request that arrived with the given
    /// `Origin` header (if any).
    pub fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );

        match self {
            CorsPolicy::AnyOrigin => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
            }

            CorsPolicy::AllowList(allowed) => {
                headers.insert(VARY, HeaderValue::from_static("Origin"));

                if let Some(origin) = origin.filter(|o| allowed.contains(*o)) {
                    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
                }
            }
        }

        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
    }
}
