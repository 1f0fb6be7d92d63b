//! Outbound proxy-integration result shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The result value handed back to the platform for one invocation.
///
/// Which of the two header maps is populated depends on the header shape the
/// shim was configured with; an empty map is omitted from the serialized
/// form, matching what the platform accepts from either generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub multi_value_headers: HashMap<String, Vec<String>>,

    #[serde(default)]
    pub body: String,

    pub is_base64_encoded: bool,
}

impl ProxyResponse {
    /// An empty result with the given status and no headers or body.
    pub fn with_status(status_code: u16) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            multi_value_headers: HashMap::new(),
            body: String::new(),
            is_base64_encoded: false,
        }
    }
}
