use actix_files::Files;
use actix_multipart::{Multipart, MultipartError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use serde_json::json;
use shared::transport::RelayFailure;
use shared::{ClientConfig, DetectionError, UploadTransport, UploadedFile};

use crate::inference::HttpTransport;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("Failed to read upload: {0}")]
    Upload(#[from] MultipartError),
    #[error(transparent)]
    Upstream(#[from] DetectionError),
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingFile | RelayError::Upload(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream(DetectionError::ServerRejected { status, .. }) => {
                StatusCode::from_u16(*status)
                    .ok()
                    .filter(|code| code.is_client_error() || code.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY)
            }
            RelayError::Upstream(DetectionError::NetworkFailure(_)) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            RelayError::Upstream(err) => RelayFailure::from(err),
            _ => RelayFailure {
                error: self.to_string(),
                kind: None,
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    cfg.service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/config").route(web::get().to(client_config)))
        .service(web::resource("/api/predict").route(web::post().to(handle_predict)))
        .service(Files::new("/", frontend_dir).index_file("index.html"));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Backend is alive" }))
}

async fn client_config(config: web::Data<ClientConfig>) -> HttpResponse {
    HttpResponse::Ok().json(config.get_ref())
}

async fn handle_predict(
    transport: web::Data<HttpTransport>,
    mut payload: Multipart,
) -> Result<HttpResponse, RelayError> {
    let file = read_first_file(&mut payload)
        .await?
        .ok_or(RelayError::MissingFile)?;

    info!(
        "Relaying {} [{}] ({} bytes, {}) to {}",
        file.name(),
        file.id(),
        file.source().len(),
        file.media_type(),
        transport.endpoint()
    );

    let body = transport.upload(&file).await.map_err(|e| {
        error!("Inference request for {} failed: {}", file.name(), e);
        e
    })?;

    Ok(HttpResponse::Ok().json(body))
}

/// Reads fields until one carries data; the rest of the form is ignored.
async fn read_first_file(payload: &mut Multipart) -> Result<Option<UploadedFile<Vec<u8>>>, RelayError> {
    while let Some(mut field) = payload.try_next().await? {
        let mut image_data = Vec::new();
        while let Some(chunk) = field.next().await {
            image_data.extend_from_slice(&chunk?);
        }
        if image_data.is_empty() {
            continue;
        }

        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("upload")
            .to_string();
        let media_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_default();

        return Ok(Some(UploadedFile::new(name, media_type, image_data)));
    }
    Ok(None)
}
