//! app.rs
use crate::handlers::submit_handler;
use actix_web::{http::Method, middleware::DefaultHeaders, web};

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(submit_handler::health_endpoint))
        .service(
            web::resource("/api/submit")
                .route(web::post().to(submit_handler::submit_endpoint))
                .route(web::method(Method::OPTIONS).to(submit_handler::preflight_endpoint))
                .default_service(web::to(submit_handler::method_not_allowed_endpoint)),
        );
}

/// CORS abierto: el formulario puede vivir en cualquier dominio
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}
