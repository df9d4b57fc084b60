use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

/// Tipo de boleta. Los valores desconocidos se conservan tal cual
/// y se cobran como "sencilla".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketType {
    Single,
    Pair,
    Other(String),
}

impl TicketType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "sencilla" | "single" => TicketType::Single,
            "pareja" | "pair" => TicketType::Pair,
            _ => TicketType::Other(raw.trim().to_string()),
        }
    }

    /// Etiqueta mostrada en la hoja, el correo y WhatsApp
    pub fn label(&self) -> &str {
        match self {
            TicketType::Single => "sencilla",
            TicketType::Pair => "pareja",
            TicketType::Other(raw) => raw,
        }
    }
}

/// Datos de la petición HTTP que no vienen en el cuerpo
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub client_ip: String,
    pub user_agent: String,
}

/// Solicitud de compra ya validada. Inmutable una vez construida.
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub ticket_type: TicketType,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
    pub client_ip: String,
    pub user_agent: String,
}

impl SubmissionRecord {
    pub fn submitted_at_iso(&self) -> String {
        self.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Fila en el orden fijo de columnas de la hoja:
    /// fecha, nombre, teléfono, correo, tipo, cantidad, precio, total, mensaje, UA, IP
    pub fn to_sheet_row(&self) -> Vec<Value> {
        vec![
            json!(self.submitted_at_iso()),
            json!(self.name),
            json!(self.phone),
            json!(self.email),
            json!(self.ticket_type.label()),
            json!(self.quantity),
            amount_value(self.unit_price),
            amount_value(self.total),
            json!(self.message),
            json!(self.user_agent),
            json!(self.client_ip),
        ]
    }
}

/// 4000.0 -> "4000", 12.5 -> "12.50"
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn amount_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

/// Cuerpo 400
#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorBody {
    pub error: String,
    pub missing: Vec<String>,
    pub invalid: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            phone: "8091234567".to_string(),
            email: "a@x.com".to_string(),
            ticket_type: TicketType::Pair,
            quantity: 2,
            unit_price: 4000.0,
            total: 8000.0,
            message: "".to_string(),
            submitted_at: "2025-09-01T12:00:00Z".parse().unwrap(),
            client_ip: "10.0.0.1".to_string(),
            user_agent: "test-agent".to_string(),
        }
    }

    #[test]
    fn test_ticket_type_parse() {
        assert_eq!(TicketType::parse(" Pareja "), TicketType::Pair);
        assert_eq!(TicketType::parse("single"), TicketType::Single);
        assert_eq!(
            TicketType::parse("vip"),
            TicketType::Other("vip".to_string())
        );
        assert_eq!(TicketType::parse("vip").label(), "vip");
    }

    #[test]
    fn test_sheet_row_order() {
        let row = record().to_sheet_row();
        assert_eq!(row.len(), 11);
        assert_eq!(row[0], json!("2025-09-01T12:00:00.000Z"));
        assert_eq!(row[1], json!("Ana"));
        assert_eq!(row[4], json!("pareja"));
        assert_eq!(row[5], json!(2));
        assert_eq!(row[6], json!(4000));
        assert_eq!(row[7], json!(8000));
        assert_eq!(row[9], json!("test-agent"));
        assert_eq!(row[10], json!("10.0.0.1"));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(4000.0), "4000");
        assert_eq!(format_amount(12.5), "12.50");
    }
}
