//! Run HTTP middleware behind a serverless proxy integration
//!
//! This crate adapts a request/response handler to the event/callback
//! invocation model of a function-as-a-service platform. Each platform
//! invocation is translated into a normalized `http` request, run through
//! the application-supplied handler, and the resulting response is
//! translated back into the proxy result shape the platform expects. This
//! covers binary payloads and multi-valued headers, with the guarantee that
//! exactly one result is delivered no matter how the invocation ends.
//!
//! # Features
//!
//! - Event-to-request translation that never fails (malformed fields
//!   degrade to defaults instead of dropping the invocation)
//! - A single-method application contract: `(request, fallback) -> response`
//! - Canonical 404 fallback for unrouted requests
//! - Error mapping: every handler failure becomes an HTTP-shaped result
//! - Advisory client-abort signaling with a fixed 444 result
//! - Binary bodies via a configurable predicate and base64 encoding
//! - All three observed result header shapes ([`HeaderShape`])
//!
//! # Example
//!
//! ```no_run
//! use apigw_event::{LambdaContext, ProxyRequestEvent};
//! use apigw_shim::{BoxError, Fallback, ResponseBody, Shim, make_handler};
//! use http::Response;
//!
//! #[tokio::main]
//! async fn main() {
//!     let shim = Shim::builder()
//!         .handler(make_handler(|req, fallback: Fallback| async move {
//!             if req.uri().path() == "/hello" {
//!                 Ok::<_, BoxError>(Response::new(ResponseBody::from("Hello World!\r\n")))
//!             } else {
//!                 Ok(fallback.respond().await)
//!             }
//!         }))
//!         .build()
//!         .expect("handler is set");
//!
//!     let event: ProxyRequestEvent =
//!         serde_json::from_str(r#"{"httpMethod": "GET", "path": "/hello"}"#).unwrap();
//!     let result = shim.invoke(event, LambdaContext::default()).await;
//!
//!     assert_eq!(result.status_code, 200);
//! }
//! ```
//!
//! # Architecture
//!
//! - [`translate`]: the bidirectional wire translation (platform event to
//!   normalized request, normalized response to platform result)
//! - [`Shim`]: the per-invocation controller owning the completion race
//! - [`Handler`]: the application contract, with [`make_handler`] for
//!   closures and [`Fallback`] as the terminal 404 continuation
//! - [`EventBody`] / [`ResponseBody`]: buffered and streaming body sources,
//!   both draining to bytes through [`drain`]
//!
//! # Completion semantics
//!
//! Normal resolution, rejection, and client abort race cooperatively per
//! invocation; the first to reach delivery wins and later attempts are
//! dropped. The invocation itself never fails: handler errors go through
//! the configured [`ErrorMapper`] (or the default plain-text 500 policy),
//! aborts deliver a bodyless 444, and even a response that fails to drain
//! twice still yields a bare 500 rather than leaving the platform waiting.

mod abort;
mod body;
mod error;
mod handler;
mod invocation;

pub mod translate;

pub use abort::{AbortHandle, AbortSignal, abort_channel};
pub use body::{EventBody, ResponseBody, drain};
pub use error::{BodyError, BoxError, ShimBuildError};
pub use handler::{Fallback, Handler, HandlerFn, make_handler};
pub use invocation::{ErrorMapper, Shim, ShimBuilder};
pub use translate::{ConnectionInfo, HeaderShape};
