//! A Lambda-hosted proxy for Shopify Storefront customer operations
//!
//! The storefront's browser code needs to log customers in and read or update
//! their profiles, but the Storefront API token that authorizes those calls
//! shouldn't be shipped to the browser. So the browser talks to us instead: it
//! names one of a handful of fixed operations, supplies the variables, and we
//! forward the request to Shopify with the token attached.
//!
//! This library crate implements the request handling. It is compiled into two
//! executables: `shopify-customer-proxy`, which speaks the Lambda HTTP event
//! protocol for the actual deployment, and `shopify-customer-proxy-oneshot`,
//! which runs one action from the command line and is handy for poking at a
//! real shop locally.

use lambda_http::{
    http::{
        header::{CONTENT_TYPE, ORIGIN},
        HeaderValue, Method, StatusCode,
    },
    Body, Request, Response,
};
use lambda_runtime::{tracing, Error};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod cors;
pub mod error;
pub mod operation;
pub mod upstream;

use config::{EnvSource, ProcessEnv, ServerConfig};
use cors::CorsPolicy;
use error::ProxyError;
use operation::Operation;
use upstream::{GraphQLRequest, StorefrontClient, Upstream};

/// What the browser POSTs to us.
///
/// Both fields are kept loose: an `action` that isn't a string is just an
/// invalid action, and `variables` is none of our business.
#[derive(Debug, Default)]
pub struct ProxyRequest {
    pub action: Option<Value>,
    pub variables: Option<Value>,
}

impl ProxyRequest {
    /// Parse a request body. Anything that isn't a JSON object is treated as
    /// an empty request, which then fails action dispatch.
    ///
    /// This goes through `Value` rather than a derived `Deserialize`, which
    /// would happily take `["login", {...}]` positionally. A repeated key
    /// keeps its last value.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(Value::Object(mut fields)) => ProxyRequest {
                action: fields.remove("action"),
                variables: fields.remove("variables"),
            },
            _ => ProxyRequest::default(),
        }
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_ref().and_then(Value::as_str)
    }
}

pub struct Proxy<U = StorefrontClient, E = ProcessEnv> {
    upstream: U,
    env: E,
    cors: CorsPolicy,
}

impl Proxy {
    /// Create the proxy for a Lambda process.
    ///
    /// This installs the global tracing subscriber, so it should only be
    /// called once.
    pub fn init() -> Result<Self, Error> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false) // don't print the module name
            .without_time() // don't print time (CloudWatch has it)
            .with_writer(std::io::stderr)
            .init();

        let cors = CorsPolicy::from_env(&ProcessEnv)?;
        tracing::info!(?cors, "proxy initialized");

        Ok(Proxy::new(StorefrontClient::new(), ProcessEnv, cors))
    }
}

impl<U: Upstream, E: EnvSource> Proxy<U, E> {
    pub fn new(upstream: U, env: E, cors: CorsPolicy) -> Self {
        Proxy {
            upstream,
            env,
            cors,
        }
    }

    /// Handle one invocation. This never fails: every problem is reported to
    /// the caller as a JSON error body.
    pub async fn handle(&self, req: Request) -> Response<Body> {
        let mut resp = if req.method() == Method::OPTIONS {
            // CORS preflight: headers only.
            Response::new(Body::Empty)
        } else {
            let (status, body) = match self.relay(&req).await {
                Ok(body) => (StatusCode::OK, body),
                Err(e) => {
                    log_failure(&e);
                    (e.status(), e.body())
                }
            };

            let mut resp = Response::new(Body::Text(body.to_string()));
            *resp.status_mut() = status;
            resp.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            resp
        };

        self.cors
            .apply(req.headers().get(ORIGIN), resp.headers_mut());
        resp
    }

    async fn relay(&self, req: &Request) -> Result<Value, ProxyError> {
        if req.method() != Method::POST {
            return Err(ProxyError::MethodNotAllowed);
        }

        let config = ServerConfig::load(&self.env)?;
        let payload = ProxyRequest::from_body(req.body().as_ref());
        tracing::info!(action = payload.action(), "relaying request");

        let operation = payload
            .action()
            .and_then(Operation::from_action)
            .ok_or(ProxyError::InvalidAction)?;

        let request = GraphQLRequest {
            query: operation.document(),
            variables: payload.variables,
        };

        let body = self.upstream.execute(&config, &request).await?;
        upstream::translate(body)
    }
}

fn log_failure(e: &ProxyError) {
    match e {
        ProxyError::Config(_) | ProxyError::Internal(_) => tracing::error!("{e}"),
        _ => tracing::warn!("{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_objects_carry_an_action() {
        for body in [
            r#"["login", {"input": {}}]"#,
            r#"["login"]"#,
            r#""login""#,
            "null",
            "",
            "{not json",
        ] {
            let req = ProxyRequest::from_body(body.as_bytes());
            assert_eq!(req.action(), None, "{body}");
            assert!(req.variables.is_none(), "{body}");
        }
    }

    #[test]
    fn object_fields_are_picked_out() {
        let req = ProxyRequest::from_body(
            br#"{"action": "update", "variables": {"customer": {"phone": null}}, "extra": 1}"#,
        );
        assert_eq!(req.action(), Some("update"));
        assert_eq!(
            req.variables,
            Some(serde_json::json!({ "customer": { "phone": null } }))
        );

        let req = ProxyRequest::from_body(br#"{"action": 7}"#);
        assert_eq!(req.action(), None);
    }

    #[test]
    fn repeated_action_keeps_last() {
        let req = ProxyRequest::from_body(br#"{"action": "bogus", "action": "login"}"#);
        assert_eq!(req.action(), Some("login"));
    }
}
