//! services/whatsapp_service.rs
//! Canal "whatsapp": un envío independiente por cada administrador.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde_json::{json, Value};

use crate::{
    config::app_config::{WhatsAppConfig, WhatsAppProviderConfig},
    models::{channel_model::ChannelKind, submission_model::SubmissionRecord},
    services::{
        channel::{error_body, ChannelError, NotificationChannel},
        template_service,
    },
};

const GRAPH_BASE_URL: &str = "https://graph.facebook.com";
const TWILIO_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

/// Envío a un único destinatario
#[async_trait]
pub trait WhatsAppSender: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn send_to(&self, target: &str, record: &SubmissionRecord) -> Result<(), ChannelError>;
}

/// WhatsApp Business Cloud API con plantilla pre-aprobada
pub struct CloudApiSender {
    http_client: Client,
    phone_number_id: String,
    token: String,
    template_name: String,
    template_lang: String,
    api_version: String,
    base_url: String,
}

impl CloudApiSender {
    pub fn new(
        http_client: Client,
        phone_number_id: String,
        token: String,
        template_name: String,
        template_lang: String,
        api_version: String,
    ) -> Self {
        Self {
            http_client,
            phone_number_id,
            token,
            template_name,
            template_lang,
            api_version,
            base_url: GRAPH_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.base_url, self.api_version, self.phone_number_id
        )
    }

    fn payload(&self, target: &str, record: &SubmissionRecord) -> Value {
        let parameters: Vec<Value> = template_service::whatsapp_template_params(record)
            .into_iter()
            .map(|text| json!({ "type": "text", "text": text }))
            .collect();

        json!({
            "messaging_product": "whatsapp",
            "to": target.trim_start_matches('+'),
            "type": "template",
            "template": {
                "name": self.template_name,
                "language": { "code": self.template_lang },
                "components": [
                    { "type": "body", "parameters": parameters }
                ]
            }
        })
    }
}

#[async_trait]
impl WhatsAppSender for CloudApiSender {
    fn provider_name(&self) -> &'static str {
        "cloud"
    }

    async fn send_to(&self, target: &str, record: &SubmissionRecord) -> Result<(), ChannelError> {
        let resp = self
            .http_client
            .post(self.messages_url())
            .bearer_auth(&self.token)
            .json(&self.payload(target, record))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ChannelError::WhatsAppDelivery {
                failed: 1,
                total: 1,
                detail: error_body(resp).await,
            });
        }
        Ok(())
    }
}

/// Twilio Programmable Messaging, texto libre
pub struct TwilioSender {
    http_client: Client,
    account_sid: String,
    auth_token: String,
    from: String,
    base_url: String,
}

impl TwilioSender {
    pub fn new(http_client: Client, account_sid: String, auth_token: String, from: String) -> Self {
        Self {
            http_client,
            account_sid,
            auth_token,
            from,
            base_url: TWILIO_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}

#[async_trait]
impl WhatsAppSender for TwilioSender {
    fn provider_name(&self) -> &'static str {
        "twilio"
    }

    async fn send_to(&self, target: &str, record: &SubmissionRecord) -> Result<(), ChannelError> {
        let from = whatsapp_address(&self.from);
        let to = whatsapp_address(target);
        let body = template_service::whatsapp_text(record);

        let resp = self
            .http_client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", from.as_str()), ("To", to.as_str()), ("Body", body.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ChannelError::WhatsAppDelivery {
                failed: 1,
                total: 1,
                detail: error_body(resp).await,
            });
        }
        Ok(())
    }
}

/// "+1809..." -> "whatsapp:+1809..."
pub fn whatsapp_address(number: &str) -> String {
    let number = number.trim();
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{}", number)
    }
}

#[derive(Clone)]
pub struct WhatsAppService {
    targets: Vec<String>,
    sender: Arc<dyn WhatsAppSender>,
}

impl WhatsAppService {
    pub fn new(targets: Vec<String>, sender: Arc<dyn WhatsAppSender>) -> Self {
        Self { targets, sender }
    }

    pub fn from_config(config: &WhatsAppConfig, http_client: Client) -> Self {
        let sender: Arc<dyn WhatsAppSender> = match &config.provider {
            WhatsAppProviderConfig::Cloud {
                phone_number_id,
                token,
                template_name,
                template_lang,
                api_version,
            } => Arc::new(CloudApiSender::new(
                http_client,
                phone_number_id.clone(),
                token.clone(),
                template_name.clone(),
                template_lang.clone(),
                api_version.clone(),
            )),
            WhatsAppProviderConfig::Twilio {
                account_sid,
                auth_token,
                from,
            } => Arc::new(TwilioSender::new(
                http_client,
                account_sid.clone(),
                auth_token.clone(),
                from.clone(),
            )),
        };
        Self::new(config.targets.clone(), sender)
    }

    /// Envía a todos los destinatarios sin cortar en el primer fallo.
    pub async fn send_all(
        &self,
        record: &SubmissionRecord,
    ) -> Vec<(String, Result<(), ChannelError>)> {
        let sends = self.targets.iter().map(|target| async move {
            let result = self.sender.send_to(target, record).await;
            match &result {
                Ok(_) => log::info!(
                    "(send_all) -> '{}' enviado submission={}",
                    target,
                    record.id
                ),
                Err(e) => log::error!(
                    "(send_all) -> Fallo al enviar a '{}' submission={}: {}",
                    target,
                    record.id,
                    e
                ),
            }
            (target.clone(), result)
        });
        join_all(sends).await
    }
}

#[async_trait]
impl NotificationChannel for WhatsAppService {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Whatsapp
    }

    fn is_configured(&self) -> bool {
        !self.targets.is_empty()
    }

    async fn notify(&self, record: &SubmissionRecord) -> Result<(), ChannelError> {
        log::info!(
            "(notify) WhatsApp provider={} destinatarios={} submission={}",
            self.sender.provider_name(),
            self.targets.len(),
            record.id
        );
        let results = self.send_all(record).await;

        // Sin resultados no hay éxito: waSent=false
        if results.is_empty() {
            return Err(ChannelError::WhatsAppDelivery {
                failed: 0,
                total: 0,
                detail: "sin destinatarios".to_string(),
            });
        }

        let failures: Vec<String> = results
            .iter()
            .filter_map(|(target, r)| r.as_ref().err().map(|e| format!("{}: {}", target, e)))
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ChannelError::WhatsAppDelivery {
                failed: failures.len(),
                total: results.len(),
                detail: failures.join("; "),
            })
        }
    }
}
