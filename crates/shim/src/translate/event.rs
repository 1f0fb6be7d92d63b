//! Inbound translation: platform event to normalized request.
//!
//! This stage must never fail. An invocation with no request has no response
//! path either, so every malformed field degrades to a usable default: an
//! unknown method becomes GET, an unparsable target becomes `/`, bad base64
//! becomes an empty body, and invalid header names or values are skipped.

use apigw_event::{LambdaContext, ProxyRequestEvent};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use tracing::warn;

use crate::body::EventBody;

/// Synthetic connection descriptor attached to every normalized request.
///
/// The platform terminates TLS upstream, so `encrypted` is always true.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub encrypted: bool,
    pub remote_addr: String,
}

pub(crate) fn request_from_event(event: ProxyRequestEvent, context: LambdaContext) -> Request<EventBody> {
    let method = Method::from_bytes(event.http_method.as_bytes()).unwrap_or(Method::GET);
    let uri = request_target(&event).parse::<Uri>().unwrap_or_else(|_| Uri::from_static("/"));
    let headers = header_map(&event);
    let connection = ConnectionInfo { encrypted: true, remote_addr: event.source_ip().to_string() };

    let mut request = Request::new(decode_body(event.body.as_deref(), event.is_base64_encoded));
    *request.method_mut() = method;
    *request.uri_mut() = uri;
    *request.headers_mut() = headers;
    request.extensions_mut().insert(connection);
    request.extensions_mut().insert(context);
    request
}

fn request_target(event: &ProxyRequestEvent) -> String {
    let path = if event.path.is_empty() { "/" } else { event.path.as_str() };
    match query_string(event) {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path.to_string(),
    }
}

/// Serializes the event's query field, preferring the multi-valued map when
/// the platform generation supplies it.
fn query_string(event: &ProxyRequestEvent) -> Option<String> {
    let pairs: Vec<(&str, &str)> = if let Some(multi) = &event.multi_value_query_string_parameters {
        multi.iter().flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str()))).collect()
    } else if let Some(single) = &event.query_string_parameters {
        single.iter().map(|(key, value)| (key.as_str(), value.as_str())).collect()
    } else {
        return None;
    };

    serde_urlencoded::to_string(pairs).ok()
}

fn header_map(event: &ProxyRequestEvent) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(multi) = &event.multi_value_headers {
        for (name, values) in multi {
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else { continue };
            for value in values {
                if let Ok(value) = HeaderValue::from_str(value) {
                    headers.append(name.clone(), value);
                }
            }
        }
    } else if let Some(single) = &event.headers {
        for (name, value) in single {
            let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value))
            else {
                continue;
            };
            headers.insert(name, value);
        }
    }

    headers
}

fn decode_body(body: Option<&str>, is_base64_encoded: bool) -> EventBody {
    match body {
        None => EventBody::empty(),
        Some(text) if is_base64_encoded => match BASE64.decode(text) {
            Ok(bytes) => EventBody::once(Bytes::from(bytes)),
            Err(e) => {
                warn!(cause = %e, "event body is not valid base64, treating as empty");
                EventBody::empty()
            }
        },
        Some(text) => EventBody::once(Bytes::copy_from_slice(text.as_bytes())),
    }
}
