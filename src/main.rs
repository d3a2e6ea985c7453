//! The deployed Lambda.
//!
//! This speaks the Lambda HTTP event protocol, so it works behind API Gateway
//! or a Function URL alike. The `oneshot` executable is simpler to drive
//! locally.

use lambda_http::{run, service_fn, Error, Request};

use shopify_customer_proxy::Proxy;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let proxy = Proxy::init()?;
    let ref_proxy = &proxy;

    run(service_fn(|req: Request| async move {
        Ok::<_, Error>(ref_proxy.handle(req).await)
    }))
    .await
}
