//! services/submission_service.rs
//! Flujo completo de una solicitud: validar -> despachar -> agregar.

use std::sync::Arc;

use anyhow::Context;
use reqwest::Client;

use crate::{
    config::app_config::{AppConfig, PricingConfig},
    models::{channel_model::SubmitResponse, submission_model::RequestMeta},
    services::{
        channel::NotificationChannel,
        dispatch_service::DispatchService,
        email_service::EmailService,
        sheet_service::SheetService,
        validation_service::{parse_payload, validate_submission, ValidationError},
        whatsapp_service::WhatsAppService,
    },
};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Error interno: {0:?}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct SubmissionService {
    pricing: PricingConfig,
    dispatcher: DispatchService,
}

impl SubmissionService {
    pub fn new(pricing: PricingConfig, dispatcher: DispatchService) -> Self {
        Self {
            pricing,
            dispatcher,
        }
    }

    /// Arma los canales a partir de la configuración. Un canal sin config no se cablea.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("No se pudo construir el cliente HTTP")?;

        let mut channels: Vec<Arc<dyn NotificationChannel>> = vec![];
        if let Some(sheet) = &config.sheet {
            channels.push(Arc::new(SheetService::new(sheet.clone(), http_client.clone())));
        }
        if let Some(email) = &config.email {
            channels.push(Arc::new(
                EmailService::from_config(email, http_client.clone(), config.http_timeout)
                    .context("No se pudo inicializar EmailService")?,
            ));
        }
        if let Some(wa) = &config.whatsapp {
            channels.push(Arc::new(WhatsAppService::from_config(wa, http_client.clone())));
        }

        let dispatcher = DispatchService::new(channels, config.required_channels.clone());
        log::info!(
            "(from_config) Canales cableados: {:?}",
            dispatcher.wired_channels()
        );
        Ok(Self::new(config.pricing.clone(), dispatcher))
    }

    pub fn dispatcher(&self) -> &DispatchService {
        &self.dispatcher
    }

    pub async fn process(&self, body: &[u8], meta: RequestMeta) -> Result<SubmitResponse, SubmitError> {
        let payload = parse_payload(body);
        let record = validate_submission(&payload, &meta, &self.pricing)?;

        log::info!(
            "(process) Solicitud validada submission={} tipo={} cantidad={} total={}",
            record.id,
            record.ticket_type.label(),
            record.quantity,
            record.total
        );

        let outcome = self.dispatcher.dispatch(record).await?;
        Ok(SubmitResponse::from_outcome(&outcome))
    }
}
