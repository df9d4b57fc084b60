use std::{fmt, str::FromStr};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Sheet,
    Email,
    Whatsapp,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 3] = [ChannelKind::Sheet, ChannelKind::Email, ChannelKind::Whatsapp];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Sheet => "sheet",
            ChannelKind::Email => "email",
            ChannelKind::Whatsapp => "whatsapp",
        }
    }

    /// Mensaje genérico que ve el cliente cuando el canal falla
    pub fn failure_message(&self) -> &'static str {
        match self {
            ChannelKind::Sheet => "Error al guardar en Sheet",
            ChannelKind::Email => "Error al enviar correo",
            ChannelKind::Whatsapp => "Error al enviar WhatsApp",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sheet" | "sheets" => Ok(ChannelKind::Sheet),
            "email" | "mail" => Ok(ChannelKind::Email),
            "whatsapp" | "wa" => Ok(ChannelKind::Whatsapp),
            other => Err(format!("Canal no soportado: {}", other)),
        }
    }
}

/// Resultado de un canal para una sola solicitud. Nunca se persiste.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelResult {
    pub channel: ChannelKind,
    /// false = omitido por falta de configuración
    pub attempted: bool,
    pub succeeded: bool,
    /// Detalle del proveedor, solo para logs
    pub error_detail: Option<String>,
}

impl ChannelResult {
    pub fn skipped(channel: ChannelKind) -> Self {
        Self {
            channel,
            attempted: false,
            succeeded: false,
            error_detail: None,
        }
    }

    pub fn sent(channel: ChannelKind) -> Self {
        Self {
            channel,
            attempted: true,
            succeeded: true,
            error_detail: None,
        }
    }

    pub fn failed(channel: ChannelKind, detail: String) -> Self {
        Self {
            channel,
            attempted: true,
            succeeded: false,
            error_detail: Some(detail),
        }
    }
}

/// Agregado de todos los canales de una solicitud
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub results: Vec<ChannelResult>,
    pub ok: bool,
}

impl DispatchOutcome {
    /// `ok` = AND sobre los canales requeridos que sí se intentaron
    pub fn aggregate(results: Vec<ChannelResult>, required: &[ChannelKind]) -> Self {
        let ok = results
            .iter()
            .filter(|r| r.attempted && required.contains(&r.channel))
            .all(|r| r.succeeded);
        Self { results, ok }
    }

    pub fn get(&self, channel: ChannelKind) -> Option<&ChannelResult> {
        self.results.iter().find(|r| r.channel == channel)
    }

    pub fn succeeded(&self, channel: ChannelKind) -> bool {
        self.get(channel).map(|r| r.succeeded).unwrap_or(false)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ChannelResult> {
        self.results.iter().filter(|r| r.attempted && !r.succeeded)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummary {
    pub channel: ChannelKind,
    pub attempted: bool,
    pub succeeded: bool,
}

/// Respuesta 200 al navegador
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to_sheet: Option<bool>,
    pub email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wa_sent: Option<bool>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub channels: Vec<ChannelSummary>,
}

impl SubmitResponse {
    pub fn from_outcome(outcome: &DispatchOutcome) -> Self {
        let flag = |kind| outcome.get(kind).map(|r| r.succeeded);
        let message = if outcome.ok {
            "Solicitud procesada correctamente."
        } else {
            "Solicitud recibida, pero algunas notificaciones fallaron."
        };

        SubmitResponse {
            ok: outcome.ok,
            saved_to_sheet: flag(ChannelKind::Sheet),
            email_sent: outcome.succeeded(ChannelKind::Email),
            wa_sent: flag(ChannelKind::Whatsapp),
            message: message.to_string(),
            errors: outcome
                .failures()
                .map(|r| r.channel.failure_message().to_string())
                .collect(),
            channels: outcome
                .results
                .iter()
                .map(|r| ChannelSummary {
                    channel: r.channel,
                    attempted: r.attempted,
                    succeeded: r.succeeded,
                })
                .collect(),
        }
    }
}
