//! handlers/submit_handler.rs
//! Adaptador HTTP delgado: método, cabeceras y forma de la respuesta.

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::{
    models::submission_model::{RequestMeta, ValidationErrorBody},
    services::{
        submission_service::{SubmissionService, SubmitError},
        validation_service::MISSING_FIELDS_MESSAGE,
    },
};

/// POST /api/submit
pub async fn submit_endpoint(
    req: HttpRequest,
    body: web::Bytes,
    submission_service: web::Data<SubmissionService>,
) -> HttpResponse {
    let meta = request_meta(&req);

    match submission_service.process(&body, meta).await {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(SubmitError::Validation(e)) => {
            log::info!("(submit_endpoint) Solicitud rechazada: {}", e);
            HttpResponse::BadRequest().json(ValidationErrorBody {
                error: MISSING_FIELDS_MESSAGE.to_string(),
                missing: e.missing,
                invalid: e.invalid,
            })
        }
        Err(SubmitError::Internal(e)) => {
            log::error!("(submit_endpoint) Error en /api/submit: {:?}", e);
            HttpResponse::InternalServerError().json(json!({
                "ok": false,
                "error": "Error interno al procesar la solicitud."
            }))
        }
    }
}

/// OPTIONS /api/submit (preflight CORS)
pub async fn preflight_endpoint() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Cualquier otro método sobre /api/submit
pub async fn method_not_allowed_endpoint() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(json!({ "error": "Método no permitido" }))
}

/// GET /health
pub async fn health_endpoint(submission_service: web::Data<SubmissionService>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "channels": submission_service.dispatcher().wired_channels()
    }))
}

fn request_meta(req: &HttpRequest) -> RequestMeta {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };

    let client_ip = header("x-forwarded-for")
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
        .unwrap_or_default();

    RequestMeta {
        client_ip,
        user_agent: header("user-agent").unwrap_or_default(),
    }
}
