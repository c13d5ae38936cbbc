mod config;
mod inference;
mod routes;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use config::BackendConfig;
use inference::HttpTransport;
use routes::configure_routes;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = BackendConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let transport = HttpTransport::new(
        config.inference_url.clone(),
        config.upload_field.clone(),
        config.inference_timeout,
    )
    .map_err(|e| {
        log::error!("Failed to build inference client: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    match config.inference_timeout {
        Some(timeout) => log::info!(
            "Inference service: {} (timeout {}s)",
            config.inference_url,
            timeout.as_secs()
        ),
        None => log::warn!(
            "Inference service: {} (no timeout configured)",
            config.inference_url
        ),
    }
    log::info!("Serving frontend from {}", config.frontend_dir);

    let client_config = web::Data::new(config.client_config());
    let transport = web::Data::new(transport);
    let frontend_dir = config.frontend_dir.clone();
    let bind_address = config.bind_address();

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(transport.clone())
            .app_data(client_config.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
