//! services/dispatch_service.rs
//! Reparte una solicitud a todos los canales cableados y agrega los resultados.
//! El fallo de un canal no bloquea a los demás.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use futures::future::join_all;

use crate::{
    models::{
        channel_model::{ChannelKind, ChannelResult, DispatchOutcome},
        submission_model::SubmissionRecord,
    },
    services::channel::NotificationChannel,
};

#[derive(Clone)]
pub struct DispatchService {
    channels: Vec<Arc<dyn NotificationChannel>>,
    required: Vec<ChannelKind>,
}

impl DispatchService {
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>, required: Vec<ChannelKind>) -> Self {
        Self { channels, required }
    }

    /// Canales cableados (configurados o no)
    pub fn wired_channels(&self) -> Vec<ChannelKind> {
        self.channels.iter().map(|c| c.kind()).collect()
    }

    /// Lanza todos los canales configurados a la vez y espera a que terminen.
    /// Solo devuelve Err si una tarea de canal entra en pánico.
    pub async fn dispatch(&self, record: SubmissionRecord) -> Result<DispatchOutcome> {
        let record = Arc::new(record);

        let tasks = self.channels.iter().map(|channel| {
            let channel = channel.clone();
            let record = record.clone();
            async move {
                let kind = channel.kind();
                if !channel.is_configured() {
                    log::info!(
                        "(dispatch) Canal '{}' sin configuración, se omite submission={}",
                        kind,
                        record.id
                    );
                    return Ok(ChannelResult::skipped(kind));
                }

                tokio::spawn(async move {
                    match channel.notify(&record).await {
                        Ok(()) => {
                            log::info!(
                                "(dispatch) Canal '{}' enviado con éxito submission={}",
                                kind,
                                record.id
                            );
                            ChannelResult::sent(kind)
                        }
                        Err(e) => {
                            log::error!(
                                "(dispatch) Error en canal '{}' submission={}: {:?}",
                                kind,
                                record.id,
                                e
                            );
                            ChannelResult::failed(kind, e.to_string())
                        }
                    }
                })
                .await
                .map_err(|e| anyhow!("La tarea del canal '{}' falló: {}", kind, e))
            }
        });

        let mut results = Vec::with_capacity(self.channels.len());
        for result in join_all(tasks).await {
            results.push(result?);
        }

        let outcome = DispatchOutcome::aggregate(results, &self.required);
        log::info!(
            "(dispatch) Finalizado submission={} ok={} fallidos={}",
            record.id,
            outcome.ok,
            outcome.failures().count()
        );
        Ok(outcome)
    }
}
