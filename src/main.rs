use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use crate::config::app_config::AppConfig;
use crate::logger::init_logger;
use crate::services::submission_service::SubmissionService;

mod app;
mod config;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env();

    // Clientes de proveedores: una sola vez por proceso, solo lectura después
    let submission_service = SubmissionService::from_config(&config)
        .expect("No se pudo inicializar SubmissionService");

    if submission_service.dispatcher().wired_channels().is_empty() {
        log::warn!("Ningún canal configurado: las solicitudes solo se validarán");
    }

    let bind = (config.server.host.clone(), config.server.port);
    log::info!("Levantando servidor en {}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        App::new()
            .wrap(app::cors_headers())
            .app_data(web::Data::new(submission_service.clone()))
            .configure(app::init_app)
    })
    .workers(config.server.workers)
    .bind(bind)?
    .run()
    .await
}
