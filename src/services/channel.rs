//! services/channel.rs
//! Capacidad común de todos los canales de notificación y sus errores.

use async_trait::async_trait;

use crate::models::{channel_model::ChannelKind, submission_model::SubmissionRecord};

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Almacén no disponible: {0}")]
    StoreUnavailable(String),

    #[error("Fallo al enviar correo: {0}")]
    EmailDelivery(String),

    #[error("Fallo WhatsApp en {failed} de {total} destinatarios: {detail}")]
    WhatsAppDelivery {
        failed: usize,
        total: usize,
        detail: String,
    },

    #[error("Petición HTTP fallida: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    /// false = falta configuración (destinatarios, etc.); el canal se omite
    fn is_configured(&self) -> bool {
        true
    }

    /// Un único intento, sin reintentos.
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), ChannelError>;
}

/// Lee el cuerpo de una respuesta no exitosa para el log
pub(crate) async fn error_body(resp: reqwest::Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    format!("status={} body='{}'", status, body)
}
