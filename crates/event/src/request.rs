//! Inbound proxy-integration event shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The invocation payload the platform delivers for one inbound HTTP request.
///
/// Field multiplicity differs between platform generations: the REST
/// generation populates both the single-valued and `multiValue*` maps, the
/// HTTP generation only the single-valued ones. Consumers should prefer the
/// multi-valued map when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyRequestEvent {
    pub http_method: String,

    pub path: String,

    pub query_string_parameters: Option<HashMap<String, String>>,

    pub multi_value_query_string_parameters: Option<HashMap<String, Vec<String>>>,

    pub headers: Option<HashMap<String, String>>,

    pub multi_value_headers: Option<HashMap<String, Vec<String>>>,

    /// Raw body text; interpreted per [`Self::is_base64_encoded`].
    pub body: Option<String>,

    pub is_base64_encoded: bool,

    pub request_context: ProxyRequestContext,
}

impl ProxyRequestEvent {
    /// Source IP reported by the platform, empty when unavailable.
    pub fn source_ip(&self) -> &str {
        self.request_context.identity.source_ip.as_deref().unwrap_or("")
    }
}

/// Platform-side context attached to the event, reduced to the fields the
/// shim consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyRequestContext {
    pub request_id: Option<String>,
    pub stage: Option<String>,
    pub identity: RequestIdentity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestIdentity {
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
}
