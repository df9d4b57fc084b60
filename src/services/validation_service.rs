//! services/validation_service.rs
//! Convierte el JSON crudo del formulario en un `SubmissionRecord`.

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    config::app_config::PricingConfig,
    models::submission_model::{RequestMeta, SubmissionRecord, TicketType},
};

pub const MISSING_FIELDS_MESSAGE: &str = "Campos obligatorios faltantes.";

const REQUIRED_FIELDS: [&str; 5] = ["nombre", "telefono", "correo", "tipo", "cantidad"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} faltantes={:?} inválidos={:?}", MISSING_FIELDS_MESSAGE, .missing, .invalid)]
pub struct ValidationError {
    pub missing: Vec<String>,
    pub invalid: Vec<String>,
}

/// Cuerpo crudo -> mapa. Lo que no sea un objeto JSON cuenta como vacío.
pub fn parse_payload(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        // algunos clientes mandan el JSON como string
        Ok(Value::String(inner)) => match serde_json::from_str::<Value>(&inner) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

pub fn validate_submission(
    payload: &Map<String, Value>,
    meta: &RequestMeta,
    pricing: &PricingConfig,
) -> Result<SubmissionRecord, ValidationError> {
    let mut missing = vec![];
    let mut invalid = vec![];

    for field in REQUIRED_FIELDS {
        if coerce_string(payload.get(field)).is_empty() {
            missing.push(field.to_string());
        }
    }

    let quantity = match coerce_number(payload.get("cantidad")) {
        NumberField::Absent => None,
        NumberField::Value(n) if n >= 1.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => {
            Some(n as u32)
        }
        _ => {
            invalid.push("cantidad".to_string());
            None
        }
    };

    let explicit_price = optional_amount(payload, "precio", &mut invalid);
    let explicit_total = optional_amount(payload, "total", &mut invalid);

    let quantity = match quantity {
        Some(q) if missing.is_empty() && invalid.is_empty() => q,
        _ => return Err(ValidationError { missing, invalid }),
    };

    let ticket_type = TicketType::parse(&coerce_string(payload.get("tipo")));
    let unit_price = explicit_price.unwrap_or(match ticket_type {
        TicketType::Pair => pricing.pair,
        TicketType::Single | TicketType::Other(_) => pricing.single,
    });
    let computed_total = unit_price * quantity as f64;
    let total = match explicit_total {
        Some(t) => {
            if (t - computed_total).abs() > f64::EPSILON {
                log::warn!(
                    "(validate_submission) total enviado por el cliente ({}) difiere del calculado ({}); se acepta tal cual",
                    t,
                    computed_total
                );
            }
            t
        }
        // precio finito * cantidad puede desbordar a inf
        None if !computed_total.is_finite() => {
            return Err(ValidationError {
                missing,
                invalid: vec!["precio".to_string()],
            });
        }
        None => computed_total,
    };

    Ok(SubmissionRecord {
        id: Uuid::new_v4(),
        name: coerce_string(payload.get("nombre")),
        phone: coerce_string(payload.get("telefono")),
        email: coerce_string(payload.get("correo")),
        ticket_type,
        quantity,
        unit_price,
        total,
        message: coerce_string(payload.get("mensaje")),
        submitted_at: Utc::now(),
        client_ip: meta.client_ip.clone(),
        user_agent: meta.user_agent.clone(),
    })
}

/// Valor JSON -> string recortado ("" si falta o es null)
fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

enum NumberField {
    Absent,
    Value(f64),
    Invalid,
}

fn coerce_number(value: Option<&Value>) -> NumberField {
    let raw = coerce_string(value);
    if raw.is_empty() {
        return NumberField::Absent;
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => NumberField::Value(n),
        _ => NumberField::Invalid,
    }
}

/// `precio` / `total`: ausente o 0 => se deriva
fn optional_amount(
    payload: &Map<String, Value>,
    field: &str,
    invalid: &mut Vec<String>,
) -> Option<f64> {
    match coerce_number(payload.get(field)) {
        NumberField::Absent => None,
        NumberField::Value(n) if n == 0.0 => None,
        NumberField::Value(n) if n > 0.0 => Some(n),
        _ => {
            invalid.push(field.to_string());
            None
        }
    }
}
