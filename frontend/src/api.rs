use futures::future::{Either, select};
use gloo_file::{File as GlooFile, ObjectUrl};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use serde_json::Value;
use shared::transport::{check_application_status, relay_rejection};
use shared::{ClientConfig, DetectionError, RawResponse, UploadTransport, UploadedFile};

const CONFIG_URL: &str = "/api/config";

/// A picked file plus the object URL its preview is drawn from. The URL is
/// revoked when this is dropped.
pub struct BrowserImage {
    file: GlooFile,
    preview: ObjectUrl,
}

impl BrowserImage {
    pub fn file(&self) -> &GlooFile {
        &self.file
    }

    pub fn preview_url(&self) -> String {
        self.preview.to_string()
    }
}

pub fn uploaded_file(file: GlooFile) -> UploadedFile<BrowserImage> {
    let name = file.name();
    let media_type = file.raw_mime_type();
    let preview = ObjectUrl::from(file.clone());
    UploadedFile::new(name, media_type, BrowserImage { file, preview })
}

/// Posts the image as multipart form data with `fetch`.
pub struct BrowserTransport {
    endpoint: String,
    upload_field: String,
    timeout_ms: Option<u64>,
}

impl BrowserTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            upload_field: config.upload_field.clone(),
            timeout_ms: config.timeout_ms,
        }
    }

    async fn exchange(&self, file: &UploadedFile<BrowserImage>) -> Result<RawResponse, DetectionError> {
        let form_data = web_sys::FormData::new()
            .map_err(|e| DetectionError::NetworkFailure(format!("{:?}", e)))?;
        let blob: &gloo_file::Blob = file.source().file();
        let blob: &web_sys::Blob = blob.as_ref();
        form_data
            .append_with_blob_and_filename(&self.upload_field, blob, file.name())
            .map_err(|e| DetectionError::NetworkFailure(format!("{:?}", e)))?;

        let response = Request::post(&self.endpoint)
            .body(form_data)
            .map_err(|e| DetectionError::NetworkFailure(e.to_string()))?
            .send()
            .await
            .map_err(|e| DetectionError::NetworkFailure(e.to_string()))?;

        let status = response.status();
        if !response.ok() {
            let body = response.text().await.unwrap_or_default();
            return Err(relay_rejection(status, &body));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| DetectionError::DecodeFailure(e.to_string()))?;
        check_application_status(status, &body)?;
        Ok(body)
    }
}

impl UploadTransport<BrowserImage> for BrowserTransport {
    async fn upload(&self, file: &UploadedFile<BrowserImage>) -> Result<RawResponse, DetectionError> {
        let Some(timeout_ms) = self.timeout_ms else {
            return self.exchange(file).await;
        };

        let timeout = TimeoutFuture::new(u32::try_from(timeout_ms).unwrap_or(u32::MAX));
        match select(Box::pin(self.exchange(file)), Box::pin(timeout)).await {
            Either::Left((outcome, _)) => outcome,
            Either::Right(_) => Err(DetectionError::NetworkFailure(format!(
                "no response from inference service within {} ms",
                timeout_ms
            ))),
        }
    }
}

pub async fn fetch_config() -> ClientConfig {
    let response = match Request::get(CONFIG_URL).send().await {
        Ok(response) if response.ok() => response,
        Ok(response) => {
            log::warn!("Config request returned {}, using defaults", response.status());
            return ClientConfig::default();
        }
        Err(e) => {
            log::warn!("Config request failed ({}), using defaults", e);
            return ClientConfig::default();
        }
    };

    response.json::<ClientConfig>().await.unwrap_or_else(|e| {
        log::warn!("Failed to parse config: {}", e);
        ClientConfig::default()
    })
}
