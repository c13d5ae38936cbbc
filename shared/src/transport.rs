use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DetectionError, FailureKind};
use crate::model::UploadedFile;

/// Decoded JSON body of an inference response, before normalization.
pub type RawResponse = Value;

const ACCEPTED_STATUSES: [&str; 2] = ["success", "ok"];
const GATEWAY_TIMEOUT: u16 = 504;

/// Error body returned by the backend relay. `kind` is set when the failure
/// came from the inference exchange rather than from the relay itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayFailure {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
}

impl From<&DetectionError> for RelayFailure {
    fn from(err: &DetectionError) -> Self {
        Self {
            error: err.detail().to_string(),
            kind: Some(err.kind()),
        }
    }
}

/// One request/response exchange with the inference endpoint.
///
/// Implementations issue exactly one outbound request per call and never
/// retry; re-submitting is the user's decision.
pub trait UploadTransport<S> {
    fn upload(&self, file: &UploadedFile<S>) -> impl Future<Output = Result<RawResponse, DetectionError>>;
}

/// Rejects 2xx bodies whose `status` field reports an application-level error.
pub fn check_application_status(http_status: u16, body: &Value) -> Result<(), DetectionError> {
    match body.get("status").and_then(Value::as_str) {
        Some(status) if !ACCEPTED_STATUSES.iter().any(|ok| status.eq_ignore_ascii_case(ok)) => {
            let detail = body
                .get("detail")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .unwrap_or(status);
            Err(DetectionError::ServerRejected {
                status: http_status,
                detail: detail.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Rebuilds the failure behind a non-2xx response from the relay.
///
/// Bodies carrying a `kind` keep their original variant. Anything else is a
/// rejection, except a bare 504 which is treated as a network failure.
pub fn relay_rejection(http_status: u16, body: &str) -> DetectionError {
    let Ok(failure) = serde_json::from_str::<RelayFailure>(body) else {
        return if http_status == GATEWAY_TIMEOUT {
            DetectionError::NetworkFailure(body.to_string())
        } else {
            DetectionError::ServerRejected {
                status: http_status,
                detail: body.to_string(),
            }
        };
    };

    match failure.kind {
        Some(FailureKind::NetworkFailure) => DetectionError::NetworkFailure(failure.error),
        Some(FailureKind::DecodeFailure) => DetectionError::DecodeFailure(failure.error),
        Some(FailureKind::MalformedResponse) => DetectionError::MalformedResponse(failure.error),
        None if http_status == GATEWAY_TIMEOUT => DetectionError::NetworkFailure(failure.error),
        Some(FailureKind::ServerRejected) | None => DetectionError::ServerRejected {
            status: http_status,
            detail: failure.error,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_and_missing_status_pass() {
        assert!(check_application_status(200, &json!({"status": "success"})).is_ok());
        assert!(check_application_status(200, &json!({"status": "OK"})).is_ok());
        assert!(check_application_status(200, &json!({"detections": []})).is_ok());
    }

    #[test]
    fn error_status_is_a_rejection() {
        let err = check_application_status(200, &json!({"status": "error", "detail": "no model"}))
            .unwrap_err();
        assert_eq!(
            err,
            DetectionError::ServerRejected {
                status: 200,
                detail: "no model".into()
            }
        );
    }

    #[test]
    fn relay_bodies_keep_the_upstream_failure_kind() {
        let timeout = DetectionError::NetworkFailure("inference service timed out".into());
        let body = serde_json::to_string(&RelayFailure::from(&timeout)).unwrap();
        assert_eq!(relay_rejection(504, &body), timeout);

        let decode = DetectionError::DecodeFailure("expected value".into());
        let body = serde_json::to_string(&RelayFailure::from(&decode)).unwrap();
        assert_eq!(relay_rejection(502, &body), decode);

        let rejected = DetectionError::ServerRejected {
            status: 500,
            detail: "Internal Server Error".into(),
        };
        let body = serde_json::to_string(&RelayFailure::from(&rejected)).unwrap();
        assert_eq!(relay_rejection(500, &body), rejected);
    }

    #[test]
    fn plain_error_bodies_are_rejections_unless_the_gateway_timed_out() {
        assert_eq!(
            relay_rejection(400, r#"{"error":"No file uploaded"}"#),
            DetectionError::ServerRejected {
                status: 400,
                detail: "No file uploaded".into()
            }
        );
        assert_eq!(
            relay_rejection(503, "Service Unavailable"),
            DetectionError::ServerRejected {
                status: 503,
                detail: "Service Unavailable".into()
            }
        );
        assert_eq!(
            relay_rejection(504, "Gateway Timeout").kind(),
            FailureKind::NetworkFailure
        );
    }
}
