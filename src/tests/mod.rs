//! tests/mod.rs
//! Utilidades compartidas por las pruebas: registros de ejemplo y canales falsos.

mod provider_tests;

use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::{http::StatusCode, web, App, HttpResponse, HttpServer};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::models::{
    channel_model::ChannelKind,
    submission_model::{SubmissionRecord, TicketType},
};
use crate::services::channel::{ChannelError, NotificationChannel};

pub fn sample_record() -> SubmissionRecord {
    SubmissionRecord {
        id: Uuid::new_v4(),
        name: "Ana".to_string(),
        phone: "8091234567".to_string(),
        email: "a@x.com".to_string(),
        ticket_type: TicketType::Pair,
        quantity: 2,
        unit_price: 4000.0,
        total: 8000.0,
        message: String::new(),
        submitted_at: Utc::now(),
        client_ip: "127.0.0.1".to_string(),
        user_agent: "test".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FakeBehavior {
    Ok,
    Fail,
    Panic,
}

pub struct FakeChannel {
    kind: ChannelKind,
    configured: bool,
    behavior: FakeBehavior,
    calls: AtomicUsize,
}

impl FakeChannel {
    pub fn new(kind: ChannelKind, behavior: FakeBehavior) -> Self {
        Self {
            kind,
            configured: true,
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured(kind: ChannelKind) -> Self {
        Self {
            configured: false,
            ..Self::new(kind, FakeBehavior::Ok)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationChannel for FakeChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn notify(&self, _record: &SubmissionRecord) -> Result<(), ChannelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            FakeBehavior::Ok => Ok(()),
            FakeBehavior::Fail => Err(ChannelError::StoreUnavailable(
                "quota exceeded for project 1234".to_string(),
            )),
            FakeBehavior::Panic => panic!("canal roto"),
        }
    }
}

/// Proveedor HTTP local en 127.0.0.1:0. `POST /token` entrega un access token;
/// cualquier otra ruta responde `status`. Devuelve la URL base.
pub async fn provider_stub(status: StatusCode) -> String {
    let server = HttpServer::new(move || {
        App::new()
            .route(
                "/token",
                web::post().to(|| async { HttpResponse::Ok().json(json!({ "access_token": "tok-local" })) }),
            )
            .default_service(web::to(move || async move {
                HttpResponse::build(status).json(json!({ "error": { "message": "rechazado" } }))
            }))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .expect("no se pudo abrir el puerto local");

    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());
    format!("http://{}", addr)
}
