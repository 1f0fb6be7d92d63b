use std::future::Future;

use async_trait::async_trait;
use http::{Method, Request, Response, StatusCode, header};

use crate::body::{EventBody, ResponseBody};
use crate::error::BoxError;

/// The application contract: one async function over the normalized request.
///
/// The handler receives the request together with a [`Fallback`] continuation
/// and must either produce a response itself or resolve the fallback when no
/// route matched. Any error it returns is mapped to a response by the shim,
/// never surfaced to the platform.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: Request<EventBody>, fallback: Fallback) -> Result<Response<ResponseBody>, BoxError>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut, Err> Handler for HandlerFn<F>
where
    F: Fn(Request<EventBody>, Fallback) -> Fut + Send + Sync,
    Err: Into<BoxError>,
    Fut: Future<Output = Result<Response<ResponseBody>, Err>> + Send,
{
    async fn call(&self, req: Request<EventBody>, fallback: Fallback) -> Result<Response<ResponseBody>, BoxError> {
        (self.f)(req, fallback).await.map_err(Into::into)
    }
}

pub fn make_handler<F, Fut, Err>(f: F) -> HandlerFn<F>
where
    F: Fn(Request<EventBody>, Fallback) -> Fut + Send + Sync,
    Err: Into<BoxError>,
    Fut: Future<Output = Result<Response<ResponseBody>, Err>> + Send,
{
    HandlerFn { f }
}

/// Terminal continuation handed to the application alongside the request.
///
/// Resolving it yields the canonical not-found response for the request's
/// method and path. The baseline security headers are set here since the
/// plain response value carries none of its own.
#[derive(Debug, Clone)]
pub struct Fallback {
    method: Method,
    path: String,
}

impl Fallback {
    pub(crate) fn new(method: Method, path: String) -> Self {
        Self { method, path }
    }

    pub async fn respond(self) -> Response<ResponseBody> {
        let body = format!("Cannot {} {}", self.method, self.path);

        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header(header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref())
            .header(header::CONTENT_LENGTH, body.len())
            .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
            .header(header::CONTENT_SECURITY_POLICY, "default-src 'none'")
            .body(ResponseBody::from(body))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::{Method, StatusCode, header};

    use crate::body::drain;
    use crate::handler::Fallback;

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn fallback_produces_canonical_not_found() {
        let fallback = Fallback::new(Method::GET, "/test".to_string());
        let response = fallback.respond().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "16");
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(response.headers()[header::CONTENT_SECURITY_POLICY], "default-src 'none'");

        let bytes = drain(response.into_body()).await.unwrap();
        assert_eq!(bytes, Bytes::from("Cannot GET /test"));
    }
}
