use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "/api/predict";
pub const DEFAULT_UPLOAD_FIELD: &str = "file";
pub const DEFAULT_FALLBACK_RIPENESS: &str = "Ripe";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Settings the browser client needs, served by the backend at `/api/config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_upload_field")]
    pub upload_field: String,
    /// Shown as the decision when the service doesn't label its detections.
    #[serde(default = "default_fallback_ripeness")]
    pub fallback_ripeness: String,
    /// `None` waits for the inference service indefinitely.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: Option<u64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_upload_field() -> String {
    DEFAULT_UPLOAD_FIELD.to_string()
}

fn default_fallback_ripeness() -> String {
    DEFAULT_FALLBACK_RIPENESS.to_string()
}

fn default_timeout_ms() -> Option<u64> {
    Some(DEFAULT_TIMEOUT_MS)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            upload_field: default_upload_field(),
            fallback_ripeness: default_fallback_ripeness(),
            timeout_ms: default_timeout_ms(),
        }
    }
}
