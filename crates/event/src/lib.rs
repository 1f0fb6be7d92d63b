//! Wire types for the API Gateway proxy integration
//!
//! This crate defines the event and result shapes exchanged with the platform
//! when a function is invoked through a proxy integration:
//!
//! - [`ProxyRequestEvent`]: the inbound invocation payload (method, path,
//!   query parameters, headers, body text plus base64 flag, source identity)
//! - [`ProxyResponse`]: the outbound result (`statusCode`, flattened headers,
//!   body string, `isBase64Encoded`)
//! - [`LambdaContext`]: the per-invocation metadata (request id, function
//!   name, memory limit, deadline)
//!
//! The REST-generation event carries both single-valued and multi-valued
//! variants of its query and header maps; the HTTP generation only carries
//! the single-valued ones. One struct covers both: every field is defaulted
//! so whichever subset the platform sends deserializes cleanly.
//!
//! These types are purely descriptive. All translation logic lives in the
//! `apigw-shim` crate.

pub mod context;
pub mod request;
pub mod response;

pub use context::LambdaContext;
pub use request::ProxyRequestEvent;
pub use response::ProxyResponse;
