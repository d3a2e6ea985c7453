//! "Oneshot" version of the Storefront customer proxy.
//!
//! This executable runs one action from the command line, using the same
//! environment variables as the Lambda, and prints the JSON that the browser
//! would have received.

use anyhow::{anyhow, Result};
use lambda_http::{http::Method, Body, Request};
use serde_json::{json, Value};
use std::{env, fmt::Write as _, io::Write};

use shopify_customer_proxy::{operation::Operation, Proxy};

fn usage() -> String {
    let mut text =
        "usage: shopify-customer-proxy-oneshot <action> [variables-json]\n\nactions:".to_owned();

    for op in Operation::ALL {
        let _ = write!(
            text,
            "\n  {:<12} {}",
            op.action(),
            op.variable_names().join(", ")
        );
    }

    text
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = env::args();
    args.next(); // skip argv[0]

    let action = args.next().ok_or_else(|| anyhow!(usage()))?;

    let mut payload = json!({ "action": action });

    if let Some(json_text) = args.next() {
        let variables: Value = serde_json::from_str(&json_text)?;
        payload["variables"] = variables;
    }

    let req: Request = lambda_http::http::Request::builder()
        .method(Method::POST)
        .body(Body::Text(payload.to_string()))?;

    let proxy = Proxy::init().map_err(|e| anyhow!(e))?;
    let resp = proxy.handle(req).await;

    eprintln!("HTTP {}", resp.status());
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(resp.body().as_ref())?;
    writeln!(stdout)?;
    Ok(())
}
