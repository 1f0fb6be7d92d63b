//! Outbound translation: normalized response to platform result.

use std::collections::HashMap;

use apigw_event::ProxyResponse;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use http::{HeaderMap, HeaderValue, Response, header};
use tracing::debug;

use crate::body::{ResponseBody, drain};
use crate::error::BodyError;

/// How response headers are flattened into the platform result.
///
/// Which shape is correct depends on the platform generation being targeted:
/// the multi-valued map is the preferred form, the other two exist for
/// generations whose result shape allows only one value per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderShape {
    /// First value per key, later values dropped.
    Single,
    /// All values per key as an ordered list, keyed by lowercase name.
    #[default]
    MultiValue,
    /// One value per key; repeated keys are disambiguated by varying the
    /// letter casing of the name per occurrence.
    CaseDuplication,
}

pub(crate) async fn result_from_response(
    response: Response<ResponseBody>,
    shape: HeaderShape,
    binary: bool,
) -> Result<ProxyResponse, BodyError> {
    let (parts, body) = response.into_parts();
    let bytes = drain(body).await?;
    debug!(status = %parts.status, bytes = bytes.len(), "response body drained");

    let mut headers = parts.headers;
    if !headers.contains_key(header::CONTENT_LENGTH) {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
    }

    let mut result = ProxyResponse::with_status(parts.status.as_u16());
    result.is_base64_encoded = binary;
    result.body = if binary {
        BASE64.encode(&bytes)
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };
    match shape {
        HeaderShape::Single => result.headers = flatten_single(&headers),
        HeaderShape::MultiValue => result.multi_value_headers = flatten_multi(&headers),
        HeaderShape::CaseDuplication => result.headers = flatten_case_duplicated(&headers),
    }

    Ok(result)
}

fn flatten_single(headers: &HeaderMap) -> HashMap<String, String> {
    let mut flat = HashMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else { continue };
        flat.entry(name.as_str().to_string()).or_insert_with(|| value.to_string());
    }
    flat
}

fn flatten_multi(headers: &HeaderMap) -> HashMap<String, Vec<String>> {
    let mut flat: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else { continue };
        flat.entry(name.as_str().to_string()).or_default().push(value.to_string());
    }
    flat
}

fn flatten_case_duplicated(headers: &HeaderMap) -> HashMap<String, String> {
    let mut flat = HashMap::new();
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else { continue };
        let occurrence = occurrences.entry(name.as_str()).or_insert(0);
        flat.insert(vary_case(name.as_str(), *occurrence), value.to_string());
        *occurrence += 1;
    }
    flat
}

/// Encodes the occurrence index into the casing of the header name, so each
/// duplicate maps to a distinct key string that still compares equal under
/// case-insensitive header semantics.
fn vary_case(name: &str, occurrence: usize) -> String {
    let mut varied = String::with_capacity(name.len());
    let mut bit = 0;
    for ch in name.chars() {
        if ch.is_ascii_alphabetic() {
            if occurrence >> bit & 1 == 1 {
                varied.push(ch.to_ascii_uppercase());
            } else {
                varied.push(ch.to_ascii_lowercase());
            }
            bit += 1;
        } else {
            varied.push(ch);
        }
    }
    varied
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use http::{Response, StatusCode, header};

    use crate::body::ResponseBody;
    use crate::translate::result::{HeaderShape, result_from_response, vary_case};

    fn cookie_response() -> Response<ResponseBody> {
        Response::builder()
            .status(StatusCode::OK)
            .header(header::SET_COOKIE, "a=a")
            .header(header::SET_COOKIE, "b=b")
            .header(header::SET_COOKIE, "c=c")
            .body(ResponseBody::empty())
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn multi_value_shape_preserves_all_values() {
        let result = result_from_response(cookie_response(), HeaderShape::MultiValue, false).await.unwrap();

        assert_eq!(
            result.multi_value_headers["set-cookie"],
            vec!["a=a".to_string(), "b=b".to_string(), "c=c".to_string()]
        );
        assert!(result.headers.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn single_shape_keeps_first_value() {
        let result = result_from_response(cookie_response(), HeaderShape::Single, false).await.unwrap();

        assert_eq!(result.headers["set-cookie"], "a=a");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn case_duplication_shape_reconstructs_all_values() {
        let result =
            result_from_response(cookie_response(), HeaderShape::CaseDuplication, false).await.unwrap();

        let cookies: HashSet<_> = result
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("set-cookie"))
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(cookies, HashSet::from(["a=a", "b=b", "c=c"]));
        // three distinct key strings
        assert_eq!(result.headers.len(), 4); // content-length is backfilled
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn backfills_content_length_from_drained_bytes() {
        let response = Response::builder().status(StatusCode::OK).body(ResponseBody::from("response")).unwrap();
        let result = result_from_response(response, HeaderShape::MultiValue, false).await.unwrap();

        assert_eq!(result.multi_value_headers["content-length"], vec!["8".to_string()]);
        assert_eq!(result.body, "response");
        assert!(!result.is_base64_encoded);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn respects_explicit_content_length() {
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, "8")
            .body(ResponseBody::from("response"))
            .unwrap();
        let result = result_from_response(response, HeaderShape::MultiValue, false).await.unwrap();

        assert_eq!(result.multi_value_headers["content-length"], vec!["8".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn binary_body_round_trips_through_base64() {
        let payload: Vec<u8> = vec![0, 159, 146, 150, 255];
        let response = Response::builder()
            .status(StatusCode::OK)
            .body(ResponseBody::from(payload.clone()))
            .unwrap();

        let result = result_from_response(response, HeaderShape::MultiValue, true).await.unwrap();

        assert!(result.is_base64_encoded);
        assert_eq!(BASE64.decode(&result.body).unwrap(), payload);
    }

    #[test]
    fn vary_case_produces_distinct_case_insensitive_keys() {
        assert_eq!(vary_case("set-cookie", 0), "set-cookie");
        assert_eq!(vary_case("set-cookie", 1), "Set-cookie");
        assert_eq!(vary_case("set-cookie", 2), "sEt-cookie");
        assert_eq!(vary_case("set-cookie", 3), "SEt-cookie");

        let keys: HashSet<_> = (0..8).map(|n| vary_case("set-cookie", n)).collect();
        assert_eq!(keys.len(), 8);
        assert!(keys.iter().all(|key| key.eq_ignore_ascii_case("set-cookie")));
    }
}
