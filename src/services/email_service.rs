//! services/email_service.rs
//! Canal "email": aviso a los administradores vía Resend o SMTP.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use reqwest::Client;
use serde_json::json;

use crate::{
    config::app_config::{EmailConfig, EmailTransportConfig},
    models::{channel_model::ChannelKind, submission_model::SubmissionRecord},
    services::{
        channel::{error_body, ChannelError, NotificationChannel},
        template_service,
    },
};

const RESEND_URL: &str = "https://api.resend.com/emails";

/// Correo ya renderizado
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn deliver(&self, message: &EmailMessage) -> Result<(), ChannelError>;
}

pub struct ResendTransport {
    api_key: String,
    http_client: Client,
    url: String,
}

impl ResendTransport {
    pub fn new(api_key: String, http_client: Client) -> Self {
        Self {
            api_key,
            http_client,
            url: RESEND_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl EmailTransport for ResendTransport {
    async fn deliver(&self, message: &EmailMessage) -> Result<(), ChannelError> {
        let resp = self
            .http_client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": message.from,
                "to": message.to,
                "subject": message.subject,
                "html": message.html,
                "text": message.text,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ChannelError::EmailDelivery(error_body(resp).await));
        }
        Ok(())
    }
}

pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn new(
        host: &str,
        port: u16,
        user: String,
        pass: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let tls_params = TlsParameters::new(host.to_string())?;
        // 465 = TLS implícito, el resto STARTTLS
        let tls = if port == 465 {
            Tls::Wrapper(tls_params)
        } else {
            Tls::Required(tls_params)
        };
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .tls(tls)
            .timeout(Some(timeout));
        if !user.is_empty() {
            builder = builder.credentials(Credentials::new(user, pass));
        }
        Ok(Self {
            mailer: builder.build(),
        })
    }
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    async fn deliver(&self, message: &EmailMessage) -> Result<(), ChannelError> {
        let invalid = |e: lettre::address::AddressError| ChannelError::EmailDelivery(e.to_string());

        let from: Mailbox = message.from.parse().map_err(invalid)?;
        let mut builder = Message::builder().from(from).subject(&message.subject);
        for recipient in &message.to {
            let to: Mailbox = recipient.parse().map_err(invalid)?;
            builder = builder.to(to);
        }

        let email = builder
            .multipart(MultiPart::alternative_plain_html(
                message.text.clone(),
                message.html.clone(),
            ))
            .map_err(|e| ChannelError::EmailDelivery(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| ChannelError::EmailDelivery(e.to_string()))?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct EmailService {
    from: String,
    recipients: Vec<String>,
    transport: Arc<dyn EmailTransport>,
}

impl EmailService {
    pub fn new(from: String, recipients: Vec<String>, transport: Arc<dyn EmailTransport>) -> Self {
        Self {
            from,
            recipients,
            transport,
        }
    }

    pub fn from_config(
        config: &EmailConfig,
        http_client: Client,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let transport: Arc<dyn EmailTransport> = match &config.transport {
            EmailTransportConfig::Resend { api_key } => {
                Arc::new(ResendTransport::new(api_key.clone(), http_client))
            }
            EmailTransportConfig::Smtp {
                host,
                port,
                user,
                pass,
            } => Arc::new(SmtpTransport::new(
                host,
                *port,
                user.clone(),
                pass.clone(),
                timeout,
            )?),
        };
        Ok(Self::new(
            config.from.clone(),
            config.recipients.clone(),
            transport,
        ))
    }

    pub fn render(&self, record: &SubmissionRecord) -> EmailMessage {
        EmailMessage {
            from: self.from.clone(),
            to: self.recipients.clone(),
            subject: template_service::email_subject(record),
            html: template_service::email_html(record),
            text: template_service::email_text(record),
        }
    }
}

#[async_trait]
impl NotificationChannel for EmailService {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    fn is_configured(&self) -> bool {
        !self.recipients.is_empty()
    }

    async fn notify(&self, record: &SubmissionRecord) -> Result<(), ChannelError> {
        let message = self.render(record);
        log::info!(
            "(notify) Enviando aviso submission={} recipients={:?}",
            record.id,
            message.to
        );
        self.transport.deliver(&message).await?;
        log::info!("(notify) Correo enviado submission={}", record.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<EmailMessage>>,
        reject: bool,
    }

    #[async_trait]
    impl EmailTransport for RecordingTransport {
        async fn deliver(&self, message: &EmailMessage) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push(message.clone());
            if self.reject {
                return Err(ChannelError::EmailDelivery("422 invalid from".to_string()));
            }
            Ok(())
        }
    }

    fn record() -> SubmissionRecord {
        crate::tests::sample_record()
    }

    #[actix_rt::test]
    async fn test_one_message_to_all_recipients() {
        let transport = Arc::new(RecordingTransport::default());
        let service = EmailService::new(
            "Notificaciones <no-reply@x.com>".to_string(),
            vec!["a@x.com".to_string(), "b@x.com".to_string()],
            transport.clone(),
        );
        service.notify(&record()).await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["a@x.com", "b@x.com"]);
        assert!(sent[0].subject.starts_with("Nueva solicitud de compra - Ana"));
    }

    #[actix_rt::test]
    async fn test_provider_rejection_is_email_delivery_error() {
        let transport = Arc::new(RecordingTransport {
            reject: true,
            ..Default::default()
        });
        let service = EmailService::new("x@x.com".to_string(), vec!["a@x.com".to_string()], transport);
        let err = service.notify(&record()).await.unwrap_err();
        assert!(matches!(err, ChannelError::EmailDelivery(_)));
    }

    #[test]
    fn test_no_recipients_is_not_configured() {
        let service = EmailService::new(
            "x@x.com".to_string(),
            vec![],
            Arc::new(RecordingTransport::default()),
        );
        assert!(!service.is_configured());
    }
}
