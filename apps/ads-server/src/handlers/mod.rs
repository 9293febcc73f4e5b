//! HTTP handlers and route configuration.

mod ads;
mod docs;
mod health;

use actix_web::{HttpRequest, error, web};

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/", web::get().to(health::home))
        .route("/health", web::get().to(health::health_check))
        .route(crate::server::DOCS_PATH, web::get().to(docs::api_docs))
        .service(
            web::scope("/posts")
                .route("", web::get().to(ads::get_specific_post))
                .route("", web::post().to(ads::add_post))
                .route("/list", web::get().to(ads::get_list_post)),
        );
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Failed to parse JSON request");
    AppError::BadRequest(format!("invalid JSON body: {}", err)).into()
}
