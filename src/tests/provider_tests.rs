//! tests/provider_tests.rs
//! Respuestas no-2xx de cada proveedor contra un servidor local.

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use openssl::{pkey::PKey, rsa::Rsa};
    use reqwest::Client;

    use crate::config::app_config::SheetConfig;
    use crate::services::channel::ChannelError;
    use crate::services::email_service::{EmailMessage, EmailTransport, ResendTransport};
    use crate::services::sheet_service::SheetService;
    use crate::services::whatsapp_service::{CloudApiSender, TwilioSender, WhatsAppSender};
    use crate::tests::{provider_stub, sample_record};

    fn message() -> EmailMessage {
        EmailMessage {
            from: "x@x.com".to_string(),
            to: vec!["a@x.com".to_string()],
            subject: "Nueva solicitud".to_string(),
            html: "<p>hola</p>".to_string(),
            text: "hola".to_string(),
        }
    }

    #[actix_rt::test]
    async fn test_resend_rejection_is_email_delivery() {
        let base = provider_stub(StatusCode::UNPROCESSABLE_ENTITY).await;
        let transport = ResendTransport::new("re_123".to_string(), Client::new())
            .with_url(format!("{}/emails", base));

        match transport.deliver(&message()).await.unwrap_err() {
            ChannelError::EmailDelivery(detail) => {
                assert!(detail.contains("status=422"), "{}", detail);
                assert!(detail.contains("rechazado"), "{}", detail);
            }
            other => panic!("error inesperado: {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_cloud_rejection_is_whatsapp_delivery() {
        let base = provider_stub(StatusCode::BAD_REQUEST).await;
        let sender = CloudApiSender::new(
            Client::new(),
            "1234".to_string(),
            "tok".to_string(),
            "nueva_solicitud".to_string(),
            "es".to_string(),
            "v20.0".to_string(),
        )
        .with_base_url(base);

        match sender.send_to("+18091234567", &sample_record()).await.unwrap_err() {
            ChannelError::WhatsAppDelivery { failed, total, detail } => {
                assert_eq!((failed, total), (1, 1));
                assert!(detail.contains("status=400"), "{}", detail);
            }
            other => panic!("error inesperado: {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_twilio_rejection_is_whatsapp_delivery() {
        let base = provider_stub(StatusCode::UNAUTHORIZED).await;
        let sender = TwilioSender::new(
            Client::new(),
            "AC1".to_string(),
            "t".to_string(),
            "+14155238886".to_string(),
        )
        .with_base_url(base);

        match sender.send_to("+18091234567", &sample_record()).await.unwrap_err() {
            ChannelError::WhatsAppDelivery { failed, total, detail } => {
                assert_eq!((failed, total), (1, 1));
                assert!(detail.contains("status=401"), "{}", detail);
            }
            other => panic!("error inesperado: {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_sheet_rejection_is_store_unavailable() {
        let base = provider_stub(StatusCode::FORBIDDEN).await;
        let pkey = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let pem = String::from_utf8(pkey.private_key_to_pem_pkcs8().unwrap()).unwrap();
        let service = SheetService::new(
            SheetConfig {
                spreadsheet_id: "abc".to_string(),
                range: "VENTAS!A1".to_string(),
                client_email: Some("svc@proj.iam.gserviceaccount.com".to_string()),
                private_key: Some(pem),
            },
            Client::new(),
        )
        .with_endpoints(format!("{}/token", base), base.clone());

        match service.append_row(&sample_record()).await.unwrap_err() {
            ChannelError::StoreUnavailable(detail) => {
                assert!(detail.contains("status=403"), "{}", detail);
                assert!(!detail.contains("token rechazado"), "{}", detail);
            }
            other => panic!("error inesperado: {:?}", other),
        }
    }
}
