use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use apigw_event::{LambdaContext, ProxyRequestEvent, ProxyResponse};
use async_trait::async_trait;
use http::{Response, StatusCode, header};
use tracing::{debug, error, warn};

use crate::abort::AbortSignal;
use crate::body::ResponseBody;
use crate::error::{BoxError, ShimBuildError};
use crate::handler::{Fallback, Handler};
use crate::translate::{self, HeaderShape};

/// Status delivered when the client disconnects before completion, after the
/// nginx convention for "connection closed without response".
const STATUS_CLIENT_ABORT: u16 = 444;

type BinaryPredicate = Box<dyn Fn(&Response<ResponseBody>) -> bool + Send + Sync>;
type ErrorHook = Box<dyn Fn(&BoxError) + Send + Sync>;

/// Maps a handler error to a substitute response.
///
/// The mapped response flows through the normal delivery step, so the
/// platform always observes an HTTP-shaped result, never a raw failure.
#[async_trait]
pub trait ErrorMapper: Send + Sync {
    async fn map(&self, error: &BoxError) -> Response<ResponseBody>;
}

/// One-way `pending -> responded` transition for a single invocation.
///
/// Execution is cooperatively single-threaded, but several continuations
/// (normal resolution, rejection, abort) can each reach the delivery step in
/// sequence; the first claim wins and every later attempt is dropped.
#[derive(Debug, Default)]
struct Completion {
    responded: AtomicBool,
}

impl Completion {
    fn new() -> Self {
        Self::default()
    }

    fn try_claim(&self) -> bool {
        !self.responded.swap(true, Ordering::AcqRel)
    }

    fn is_responded(&self) -> bool {
        self.responded.load(Ordering::Acquire)
    }
}

enum Outcome {
    Response(Response<ResponseBody>),
    Failed(BoxError),
    Aborted,
}

pub struct ShimBuilder {
    handler: Option<Arc<dyn Handler>>,
    is_binary: BinaryPredicate,
    error_mapper: Option<Box<dyn ErrorMapper>>,
    on_error: Option<ErrorHook>,
    production: bool,
    header_shape: HeaderShape,
}

impl ShimBuilder {
    fn new() -> Self {
        Self {
            handler: None,
            is_binary: Box::new(|_| false),
            error_mapper: None,
            on_error: None,
            production: false,
            header_shape: HeaderShape::default(),
        }
    }

    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Predicate deciding whether the response body is delivered base64
    /// encoded. Defaults to never.
    pub fn binary(mut self, predicate: impl Fn(&Response<ResponseBody>) -> bool + Send + Sync + 'static) -> Self {
        self.is_binary = Box::new(predicate);
        self
    }

    pub fn error_mapper(mut self, mapper: impl ErrorMapper + 'static) -> Self {
        self.error_mapper = Some(Box::new(mapper));
        self
    }

    /// Observation hook invoked once per handler or drain error, before the
    /// error is mapped. The shim performs no observability I/O of its own.
    pub fn on_error(mut self, hook: impl Fn(&BoxError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// In production mode the default error policy replaces error detail
    /// with the bare status phrase.
    pub fn production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn header_shape(mut self, shape: HeaderShape) -> Self {
        self.header_shape = shape;
        self
    }

    pub fn build(self) -> Result<Shim, ShimBuildError> {
        let handler = self.handler.ok_or(ShimBuildError::MissingHandler)?;
        Ok(Shim {
            handler,
            is_binary: self.is_binary,
            error_mapper: self.error_mapper,
            on_error: self.on_error,
            production: self.production,
            header_shape: self.header_shape,
        })
    }
}

/// The per-invocation controller: translates the event, runs the application
/// handler, and resolves the completion race into exactly one platform
/// result.
pub struct Shim {
    handler: Arc<dyn Handler>,
    is_binary: BinaryPredicate,
    error_mapper: Option<Box<dyn ErrorMapper>>,
    on_error: Option<ErrorHook>,
    production: bool,
    header_shape: HeaderShape,
}

impl Shim {
    pub fn builder() -> ShimBuilder {
        ShimBuilder::new()
    }

    /// Future-style entry point: resolves with the platform result. Never
    /// fails; every error is mapped to a result beforehand.
    pub async fn invoke(&self, event: ProxyRequestEvent, context: LambdaContext) -> ProxyResponse {
        self.invoke_with_signal(event, context, AbortSignal::never()).await
    }

    /// Callback-style entry point: fires `on_complete` exactly once with the
    /// platform result. There is no error argument because no failure ever
    /// escapes the result mapping.
    pub async fn invoke_callback<F>(&self, event: ProxyRequestEvent, context: LambdaContext, on_complete: F)
    where
        F: FnOnce(ProxyResponse),
    {
        on_complete(self.invoke(event, context).await);
    }

    /// Like [`Self::invoke`], additionally racing the given abort signal
    /// against handler completion.
    pub async fn invoke_with_signal(
        &self,
        event: ProxyRequestEvent,
        context: LambdaContext,
        signal: AbortSignal,
    ) -> ProxyResponse {
        let request = translate::request_from_event(event, context);
        let fallback = Fallback::new(request.method().clone(), request.uri().path().to_string());
        let completion = Arc::new(Completion::new());

        let handler = Arc::clone(&self.handler);
        let guard = Arc::clone(&completion);
        let mut invocation = tokio::spawn(async move {
            let result = handler.call(request, fallback).await;
            if guard.is_responded() {
                debug!("handler resolved after the invocation completed, discarding");
            }
            result
        });

        let outcome = tokio::select! {
            biased;
            () = signal.aborted() => Outcome::Aborted,
            joined = &mut invocation => match joined {
                Ok(Ok(response)) => Outcome::Response(response),
                Ok(Err(e)) => Outcome::Failed(e),
                Err(join_error) => Outcome::Failed(Box::new(join_error)),
            },
        };

        match outcome {
            Outcome::Aborted => {
                // advisory: the spawned handler keeps running, only its
                // chance to complete the invocation is gone
                debug!("client aborted, responding {STATUS_CLIENT_ABORT}");
                completion.try_claim();
                ProxyResponse::with_status(STATUS_CLIENT_ABORT)
            }
            Outcome::Response(response) => {
                let result = self.finalize(response).await;
                completion.try_claim();
                result
            }
            Outcome::Failed(e) => {
                let substitute = self.map_error(e).await;
                let result = self.finalize(substitute).await;
                completion.try_claim();
                result
            }
        }
    }

    /// Drains the response and translates it into the platform result.
    /// A drain failure re-enters the error path once; a second failure is
    /// logged and delivered as a bare 500, never left unresolved.
    async fn finalize(&self, response: Response<ResponseBody>) -> ProxyResponse {
        let binary = (self.is_binary)(&response);
        match translate::result_from_response(response, self.header_shape, binary).await {
            Ok(result) => result,
            Err(drain_error) => {
                let substitute = self.map_error(Box::new(drain_error)).await;
                let binary = (self.is_binary)(&substitute);
                match translate::result_from_response(substitute, self.header_shape, binary).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(cause = %e, "substitute response failed to drain, delivering bare 500");
                        ProxyResponse::with_status(StatusCode::INTERNAL_SERVER_ERROR.as_u16())
                    }
                }
            }
        }
    }

    async fn map_error(&self, error: BoxError) -> Response<ResponseBody> {
        warn!(cause = %error, "invocation failed, mapping error to response");
        if let Some(on_error) = &self.on_error {
            on_error(&error);
        }
        match &self.error_mapper {
            Some(mapper) => mapper.map(&error).await,
            None => default_error_response(&error, self.production),
        }
    }
}

/// Default error policy: plain-text 500 whose body is the full error detail,
/// or only the status phrase when in production.
fn default_error_response(error: &BoxError, production: bool) -> Response<ResponseBody> {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let body = if production {
        status.canonical_reason().unwrap_or("Internal Server Error").to_string()
    } else {
        error.to_string()
    };

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref())
        .header(header::CONTENT_LENGTH, body.len())
        .body(ResponseBody::from(body))
        .unwrap()
}
