//! services/sheet_service.rs
//! Canal "sheet": agrega una fila a Google Sheets con una cuenta de servicio.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use openssl::{hash::MessageDigest, pkey::PKey, sign::Signer};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::app_config::SheetConfig,
    models::{channel_model::ChannelKind, submission_model::SubmissionRecord},
    services::channel::{error_body, ChannelError, NotificationChannel},
};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const ASSERTION_TTL_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Clone)]
pub struct SheetService {
    config: SheetConfig,
    http_client: Client,
    token_url: String,
    sheets_base_url: String,
}

impl SheetService {
    pub fn new(config: SheetConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
            token_url: TOKEN_URL.to_string(),
            sheets_base_url: SHEETS_BASE_URL.to_string(),
        }
    }

    /// Cambia los endpoints de Google (pruebas, proxies)
    pub fn with_endpoints(mut self, token_url: impl Into<String>, sheets_base_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.sheets_base_url = sheets_base_url.into();
        self
    }

    fn credentials(&self) -> Result<(&str, &str), ChannelError> {
        match (&self.config.client_email, &self.config.private_key) {
            (Some(email), Some(key)) => Ok((email, key)),
            (None, _) => Err(ChannelError::StoreUnavailable(
                "Falta variable de entorno: GOOGLE_CLIENT_EMAIL".to_string(),
            )),
            (_, None) => Err(ChannelError::StoreUnavailable(
                "Falta variable de entorno: GOOGLE_PRIVATE_KEY".to_string(),
            )),
        }
    }

    /// Intercambia la aserción firmada por un access token.
    async fn fetch_access_token(&self) -> Result<String, ChannelError> {
        let (client_email, private_key) = self.credentials()?;
        let assertion =
            build_assertion(client_email, private_key, &self.token_url, Utc::now().timestamp())?;

        let resp = self
            .http_client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let detail = error_body(resp).await;
            log::error!("(fetch_access_token) Google rechazó la aserción: {}", detail);
            return Err(ChannelError::StoreUnavailable(format!(
                "token rechazado: {}",
                detail
            )));
        }

        let token = resp.json::<TokenResponse>().await?;
        Ok(token.access_token)
    }

    pub async fn append_row(&self, record: &SubmissionRecord) -> Result<(), ChannelError> {
        let token = self.fetch_access_token().await?;
        let url = append_url(
            &self.sheets_base_url,
            &self.config.spreadsheet_id,
            &self.config.range,
        );

        log::info!(
            "(append_row) Agregando fila sheet={} range={} submission={}",
            self.config.spreadsheet_id,
            self.config.range,
            record.id
        );

        let resp = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "values": [record.to_sheet_row()] }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let detail = error_body(resp).await;
            log::error!("(append_row) Error guardando en Sheet: {}", detail);
            return Err(ChannelError::StoreUnavailable(detail));
        }

        log::info!("(append_row) Fila guardada submission={}", record.id);
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for SheetService {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Sheet
    }

    async fn notify(&self, record: &SubmissionRecord) -> Result<(), ChannelError> {
        self.append_row(record).await
    }
}

fn append_url(base_url: &str, spreadsheet_id: &str, range: &str) -> String {
    format!(
        "{}/{}/values/{}:append?valueInputOption=USER_ENTERED",
        base_url,
        urlencoding::encode(spreadsheet_id),
        urlencoding::encode(range)
    )
}

/// JWT RS256 para el flujo jwt-bearer de cuentas de servicio.
fn build_assertion(
    client_email: &str,
    private_key_pem: &str,
    audience: &str,
    now: i64,
) -> Result<String, ChannelError> {
    let header = json!({ "alg": "RS256", "typ": "JWT" });
    let claims = json!({
        "iss": client_email,
        "scope": SHEETS_SCOPE,
        "aud": audience,
        "iat": now,
        "exp": now + ASSERTION_TTL_SECS,
    });
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    );

    let signature = sign_rs256(private_key_pem, signing_input.as_bytes())
        .map_err(|e| ChannelError::StoreUnavailable(format!("llave privada inválida: {}", e)))?;

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

fn sign_rs256(private_key_pem: &str, data: &[u8]) -> Result<Vec<u8>, openssl::error::ErrorStack> {
    let pkey = PKey::private_key_from_pem(private_key_pem.as_bytes())?;
    let mut signer = Signer::new(MessageDigest::sha256(), &pkey)?;
    signer.update(data)?;
    signer.sign_to_vec()
}
