//! The Shopify Storefront API, and what we make of its answers.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{config::ServerConfig, error::ProxyError};

const TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

/// The standard GraphQL-over-HTTP request envelope.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphQLRequest {
    pub query: &'static str,

    /// Forwarded exactly as the caller sent it. Left out of the envelope
    /// entirely if the caller didn't send any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to Storefront API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response from Storefront API: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Something that can execute a GraphQL request against the Storefront API
/// and hand back the decoded response body.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn execute(
        &self,
        config: &ServerConfig,
        request: &GraphQLRequest,
    ) -> Result<Value, UpstreamError>;
}

/// The real thing, over HTTPS.
#[derive(Clone, Debug, Default)]
pub struct StorefrontClient {
    http: Client,
    origin: Option<String>,
}

impl StorefrontClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send requests to `origin` (scheme, host and port, e.g.
    /// `http://127.0.0.1:8080`) instead of the shop's own domain. The path
    /// still carries the configured API version. Useful for a local mock shop.
    pub fn with_origin(origin: impl Into<String>) -> Self {
        StorefrontClient {
            http: Client::default(),
            origin: Some(origin.into()),
        }
    }
}

#[async_trait]
impl Upstream for StorefrontClient {
    async fn execute(
        &self,
        config: &ServerConfig,
        request: &GraphQLRequest,
    ) -> Result<Value, UpstreamError> {
        // No timeout and no retries: the Lambda's own deadline bounds us.
        let resp = self
            .http
            .post(match &self.origin {
                Some(origin) => config.endpoint_at(origin),
                None => config.endpoint(),
            })
            .header(TOKEN_HEADER, &config.storefront_token)
            .json(request)
            .send()
            .await?;

        // Shopify's status code isn't interesting; the body says everything.
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Turn a decoded Storefront response into the body we send back to the
/// browser, or the error describing why not.
///
/// Any non-empty `errors` member wins, and is reported as a 400 regardless of
/// what kind of error it actually is. A body that isn't a JSON object isn't a
/// GraphQL response at all.
pub fn translate(body: Value) -> Result<Value, ProxyError> {
    let mut fields = match body {
        Value::Object(fields) => fields,
        other => {
            return Err(ProxyError::Internal(format!(
                "Storefront API response is not a JSON object: {other}"
            )))
        }
    };

    let errors = fields.remove("errors").unwrap_or_default();

    let present = match &errors {
        Value::Null | Value::Bool(false) => false,
        Value::Array(list) => !list.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    };

    if present {
        let message = match &errors {
            // Authentication failures come back with `errors` as a bare string.
            Value::String(s) => Some(s.as_str()),
            Value::Array(list) => list[0].get("message").and_then(Value::as_str),
            other => other.get("message").and_then(Value::as_str),
        }
        .unwrap_or("Unknown upstream error")
        .to_owned();

        return Err(ProxyError::Upstream {
            message,
            details: errors,
        });
    }

    let data = fields.remove("data").unwrap_or_default();
    Ok(json!({ "success": true, "data": data }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SHOP_DOMAIN_VAR, STOREFRONT_TOKEN_VAR};
    use std::collections::HashMap;

    #[test]
    fn envelope_omits_missing_variables() {
        let req = GraphQLRequest {
            query: "query { shop { name } }",
            variables: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "query": "query { shop { name } }" })
        );

        let req = GraphQLRequest {
            query: "q",
            variables: Some(json!({ "a": [1, 2] })),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "query": "q", "variables": { "a": [1, 2] } })
        );
    }

    #[test]
    fn data_passes_through() {
        let out = translate(json!({
            "data": { "customer": { "id": "gid://shopify/Customer/1" } }
        }))
        .unwrap();

        assert_eq!(
            out,
            json!({
                "success": true,
                "data": { "customer": { "id": "gid://shopify/Customer/1" } }
            })
        );
    }

    #[test]
    fn empty_errors_are_not_errors() {
        let out = translate(json!({ "data": { "x": 1 }, "errors": [] })).unwrap();
        assert_eq!(out, json!({ "success": true, "data": { "x": 1 } }));

        let out = translate(json!({})).unwrap();
        assert_eq!(out, json!({ "success": true, "data": null }));
    }

    #[test]
    fn first_error_message_is_surfaced() {
        let errors = json!([{ "message": "Invalid credentials" }, { "message": "other" }]);

        match translate(json!({ "errors": errors.clone() })) {
            Err(ProxyError::Upstream { message, details }) => {
                assert_eq!(message, "Invalid credentials");
                assert_eq!(details, errors);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn odd_error_shapes() {
        match translate(json!({ "errors": "[API] Invalid API key or access token" })) {
            Err(ProxyError::Upstream { message, details }) => {
                assert_eq!(message, "[API] Invalid API key or access token");
                assert_eq!(details, json!("[API] Invalid API key or access token"));
            }
            other => panic!("unexpected: {other:?}"),
        }

        match translate(json!({ "errors": [{ "extensions": {} }] })) {
            Err(ProxyError::Upstream { message, .. }) => {
                assert_eq!(message, "Unknown upstream error")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn non_object_bodies_are_internal_errors() {
        for body in [json!(null), json!([]), json!([{ "data": {} }]), json!("oops"), json!(3)] {
            match translate(body.clone()) {
                Err(e @ ProxyError::Internal(_)) => assert_eq!(e.status(), 500),
                other => panic!("{body}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn any_truthy_errors_value_is_an_error() {
        match translate(json!({ "errors": { "message": "x" } })) {
            Err(ProxyError::Upstream { message, details }) => {
                assert_eq!(message, "x");
                assert_eq!(details, json!({ "message": "x" }));
            }
            other => panic!("unexpected: {other:?}"),
        }

        match translate(json!({ "errors": true, "data": {} })) {
            Err(ProxyError::Upstream { message, .. }) => {
                assert_eq!(message, "Unknown upstream error")
            }
            other => panic!("unexpected: {other:?}"),
        }

        for falsy in [json!(null), json!(false), json!({}), json!(""), json!([])] {
            let out = translate(json!({ "errors": falsy, "data": { "ok": 1 } })).unwrap();
            assert_eq!(out, json!({ "success": true, "data": { "ok": 1 } }));
        }
    }

    #[tokio::test]
    async fn unreachable_shop_is_a_transport_error() {
        let env: HashMap<String, String> = [
            (STOREFRONT_TOKEN_VAR.to_owned(), "tok".to_owned()),
            (SHOP_DOMAIN_VAR.to_owned(), "127.0.0.1:1".to_owned()),
        ]
        .into_iter()
        .collect();
        let config = ServerConfig::load(&env).unwrap();

        let req = GraphQLRequest {
            query: crate::operation::Operation::GetCustomer.document(),
            variables: Some(json!({ "customerAccessToken": "abc" })),
        };

        let err = StorefrontClient::new()
            .execute(&config, &req)
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)), "{err}");
    }
}
