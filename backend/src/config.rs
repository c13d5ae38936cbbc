use shared::ClientConfig;
use shared::config::{DEFAULT_ENDPOINT, DEFAULT_FALLBACK_RIPENESS, DEFAULT_UPLOAD_FIELD};
use std::collections::HashMap;
use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8081;
const DEFAULT_INFERENCE_URL: &str = "http://localhost:8000/api/predict";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must not contain whitespace, got {value:?}")]
    InvalidFieldName { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub port: u16,
    pub inference_url: String,
    /// `None` disables the upstream timeout.
    pub inference_timeout: Option<Duration>,
    pub upload_field: String,
    pub fallback_ripeness: String,
    pub frontend_dir: String,
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                key: "PORT",
                value: value.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs: u64 = match get("INFERENCE_TIMEOUT_SECS") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                key: "INFERENCE_TIMEOUT_SECS",
                value: value.to_string(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let upload_field = get("UPLOAD_FIELD").unwrap_or(DEFAULT_UPLOAD_FIELD).to_string();
        if upload_field.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidFieldName {
                key: "UPLOAD_FIELD",
                value: upload_field,
            });
        }

        let frontend_dir = match get("FRONTEND_DIR") {
            Some(dir) => dir.to_string(),
            None => match vars.get("CARGO_MANIFEST_DIR") {
                Some(manifest_dir) => format!("{}/../frontend/dist", manifest_dir),
                None => "/usr/src/app/frontend/dist".to_string(),
            },
        };

        Ok(Self {
            port,
            inference_url: get("INFERENCE_URL").unwrap_or(DEFAULT_INFERENCE_URL).to_string(),
            inference_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            upload_field,
            fallback_ripeness: get("RIPENESS_FALLBACK")
                .unwrap_or(DEFAULT_FALLBACK_RIPENESS)
                .to_string(),
            frontend_dir,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// What the browser gets from `/api/config`. Uploads go through this
    /// server's relay, so the endpoint is always the local route.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            upload_field: self.upload_field.clone(),
            fallback_ripeness: self.fallback_ripeness.clone(),
            // The relay enforces the upstream timeout; leave the browser a margin on top.
            timeout_ms: self
                .inference_timeout
                .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX).saturating_add(5_000)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_unset() {
        let config = BackendConfig::from_vars(&vars(&[("CARGO_MANIFEST_DIR", "/src/backend")])).unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.inference_url, "http://localhost:8000/api/predict");
        assert_eq!(config.inference_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.upload_field, "file");
        assert_eq!(config.fallback_ripeness, "Ripe");
        assert_eq!(config.frontend_dir, "/src/backend/../frontend/dist");
        assert_eq!(config.bind_address(), "0.0.0.0:8081");
    }

    #[test]
    fn reads_overrides() {
        let config = BackendConfig::from_vars(&vars(&[
            ("PORT", "9000"),
            ("INFERENCE_URL", "http://yolo:8000/api/predict"),
            ("INFERENCE_TIMEOUT_SECS", "0"),
            ("RIPENESS_FALLBACK", "Unknown"),
            ("FRONTEND_DIR", "/srv/dist"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.inference_url, "http://yolo:8000/api/predict");
        assert_eq!(config.inference_timeout, None);
        assert_eq!(config.fallback_ripeness, "Unknown");
        assert_eq!(config.frontend_dir, "/srv/dist");
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = BackendConfig::from_vars(&vars(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { key: "PORT", .. }));
    }

    #[test]
    fn client_config_points_at_the_relay() {
        let config = BackendConfig::from_vars(&vars(&[("RIPENESS_FALLBACK", "Unripe")])).unwrap();
        let client = config.client_config();
        assert_eq!(client.endpoint, "/api/predict");
        assert_eq!(client.fallback_ripeness, "Unripe");
        assert_eq!(client.timeout_ms, Some(35_000));
    }

    #[test]
    fn huge_timeouts_saturate() {
        let config = BackendConfig::from_vars(&vars(&[(
            "INFERENCE_TIMEOUT_SECS",
            "18446744073709551615",
        )]))
        .unwrap();
        assert_eq!(config.client_config().timeout_ms, Some(u64::MAX));
    }
}
