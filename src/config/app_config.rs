//! config/app_config.rs
//! Configuración global del servicio, leída una sola vez del entorno (.env incluido).

use std::time::Duration;

use crate::models::channel_model::ChannelKind;

const DEFAULT_MAIL_FROM: &str = "Notificaciones <onboarding@resend.dev>";
const DEFAULT_SHEET_RANGE: &str = "VENTAS!A1";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pricing: PricingConfig,
    /// Tiempo máximo de cada llamada HTTP/SMTP saliente
    pub http_timeout: Duration,
    /// Canales que cuentan para el `ok` global
    pub required_channels: Vec<ChannelKind>,
    pub sheet: Option<SheetConfig>,
    pub email: Option<EmailConfig>,
    pub whatsapp: Option<WhatsAppConfig>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

/// Precios unitarios por tipo de boleta
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    pub single: f64,
    pub pair: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            single: 2500.0,
            pair: 4000.0,
        }
    }
}

/// Google Sheets. Las credenciales pueden faltar: el canal queda cableado
/// pero falla con `StoreUnavailable`.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    pub range: String,
    pub client_email: Option<String>,
    pub private_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub from: String,
    pub recipients: Vec<String>,
    pub transport: EmailTransportConfig,
}

#[derive(Debug, Clone)]
pub enum EmailTransportConfig {
    Resend {
        api_key: String,
    },
    Smtp {
        host: String,
        port: u16,
        user: String,
        pass: String,
    },
}

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub targets: Vec<String>,
    pub provider: WhatsAppProviderConfig,
}

#[derive(Debug, Clone)]
pub enum WhatsAppProviderConfig {
    /// WhatsApp Business Cloud API, mensaje por plantilla
    Cloud {
        phone_number_id: String,
        token: String,
        template_name: String,
        template_lang: String,
        api_version: String,
    },
    /// Twilio, mensaje libre
    Twilio {
        account_sid: String,
        auth_token: String,
        from: String,
    },
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construye la config a partir de cualquier fuente clave -> valor.
    /// Valores vacíos cuentan como ausentes.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let parse_or = |key: &str, default: f64| -> f64 {
            match get(key).map(|v| v.parse::<f64>()) {
                Some(Ok(v)) if v.is_finite() && v >= 0.0 => v,
                Some(_) => {
                    log::warn!("(from_lookup) Valor inválido en {}, usando {}", key, default);
                    default
                }
                None => default,
            }
        };

        let server = ServerConfig {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT").and_then(|v| v.parse().ok()).unwrap_or(5022),
            workers: match get("WORKERS").map(|v| v.parse::<usize>()) {
                Some(Ok(n)) if n >= 1 => n,
                Some(_) => {
                    log::warn!("(from_lookup) Valor inválido en WORKERS, usando 1");
                    1
                }
                None => 1,
            },
        };

        let pricing = PricingConfig {
            single: parse_or("PRICE_SINGLE", 2500.0),
            pair: parse_or("PRICE_PAIR", 4000.0),
        };

        let http_timeout =
            Duration::from_secs(get("HTTP_TIMEOUT_SECS").and_then(|v| v.parse().ok()).unwrap_or(15));

        let required_channels = match get("REQUIRED_CHANNELS") {
            Some(list) => split_list(&list)
                .iter()
                .filter_map(|name| match name.parse::<ChannelKind>() {
                    Ok(kind) => Some(kind),
                    Err(_) => {
                        log::warn!("(from_lookup) Canal desconocido en REQUIRED_CHANNELS: {}", name);
                        None
                    }
                })
                .collect(),
            None => ChannelKind::ALL.to_vec(),
        };

        let sheet = get("GOOGLE_SHEET_ID").map(|spreadsheet_id| SheetConfig {
            spreadsheet_id,
            range: get("GOOGLE_SHEET_RANGE").unwrap_or_else(|| DEFAULT_SHEET_RANGE.to_string()),
            client_email: get("GOOGLE_CLIENT_EMAIL"),
            private_key: get("GOOGLE_PRIVATE_KEY").map(|k| normalize_private_key(&k)),
        });

        let email_transport = if let Some(api_key) = get("RESEND_API_KEY") {
            Some(EmailTransportConfig::Resend { api_key })
        } else {
            get("SMTP_HOST").map(|host| EmailTransportConfig::Smtp {
                host,
                port: get("SMTP_PORT").and_then(|v| v.parse().ok()).unwrap_or(587),
                user: get("SMTP_USER").unwrap_or_default(),
                pass: get("SMTP_PASS").unwrap_or_default(),
            })
        };
        let email = email_transport.map(|transport| EmailConfig {
            from: get("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            recipients: get("MAIL_TO").map(|v| split_list(&v)).unwrap_or_default(),
            transport,
        });

        let wa_provider = match (get("WA_PHONE_NUMBER_ID"), get("WA_TOKEN"), get("WA_TEMPLATE_NAME")) {
            (Some(phone_number_id), Some(token), Some(template_name)) => {
                Some(WhatsAppProviderConfig::Cloud {
                    phone_number_id,
                    token,
                    template_name,
                    template_lang: get("WA_TEMPLATE_LANG").unwrap_or_else(|| "es".to_string()),
                    api_version: get("WA_API_VERSION").unwrap_or_else(|| "v20.0".to_string()),
                })
            }
            _ => match (
                get("TWILIO_ACCOUNT_SID"),
                get("TWILIO_AUTH_TOKEN"),
                get("TWILIO_WHATSAPP_FROM"),
            ) {
                (Some(account_sid), Some(auth_token), Some(from)) => {
                    Some(WhatsAppProviderConfig::Twilio {
                        account_sid,
                        auth_token,
                        from,
                    })
                }
                _ => None,
            },
        };
        let whatsapp = wa_provider.map(|provider| WhatsAppConfig {
            targets: get("WHATSAPP_ADMIN_TO")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            provider,
        });

        AppConfig {
            server,
            pricing,
            http_timeout,
            required_channels,
            sheet,
            email,
            whatsapp,
        }
    }
}

/// "a@x.com, b@y.com" -> ["a@x.com", "b@y.com"]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Las llaves privadas suelen venir con `\n` escapados en el entorno.
pub fn normalize_private_key(raw: &str) -> String {
    raw.replace("\\\\n", "\n").replace("\\n", "\n")
}
