use actix_web::mime::Mime;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use shared::transport::check_application_status;
use shared::{DetectionError, RawResponse, UploadTransport, UploadedFile};
use std::time::Duration;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Sends an uploaded image to the inference service as multipart form data.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    upload_field: String,
}

impl HttpTransport {
    pub fn new(
        endpoint: impl Into<String>,
        upload_field: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
            upload_field: upload_field.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn image_part<S: AsRef<[u8]>>(file: &UploadedFile<S>) -> Part {
        let media_type = file.media_type();
        let content_type = media_type
            .parse::<Mime>()
            .ok()
            .and_then(|mime| HeaderValue::from_str(mime.as_ref()).ok())
            .unwrap_or_else(|| {
                if !media_type.is_empty() {
                    log::warn!(
                        "Invalid media type {:?} for {}, sending as {}",
                        media_type,
                        file.name(),
                        FALLBACK_MEDIA_TYPE
                    );
                }
                HeaderValue::from_static(FALLBACK_MEDIA_TYPE)
            });

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type);
        Part::bytes(file.source().as_ref().to_vec())
            .file_name(file.name().to_string())
            .headers(headers)
    }
}

impl<S: AsRef<[u8]>> UploadTransport<S> for HttpTransport {
    async fn upload(&self, file: &UploadedFile<S>) -> Result<RawResponse, DetectionError> {
        let form = Form::new().part(self.upload_field.clone(), Self::image_part(file));

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DetectionError::NetworkFailure(format!("inference service timed out: {}", e))
                } else {
                    DetectionError::NetworkFailure(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DetectionError::ServerRejected {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| DetectionError::DecodeFailure(e.to_string()))?;
        check_application_status(status.as_u16(), &body)?;
        Ok(body)
    }
}
