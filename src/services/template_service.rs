//! services/template_service.rs
//! Resúmenes legibles de una solicitud (correo y WhatsApp).

use crate::models::submission_model::{format_amount, SubmissionRecord};

pub fn email_subject(r: &SubmissionRecord) -> String {
    format!(
        "Nueva solicitud de compra - {} ({} x{})",
        r.name,
        r.ticket_type.label(),
        r.quantity
    )
}

pub fn email_text(r: &SubmissionRecord) -> String {
    format!(
        "Nueva solicitud\n\
         Fecha: {}\n\
         Nombre: {}\n\
         Teléfono: {}\n\
         Correo: {}\n\
         Tipo: {}\n\
         Cantidad: {}\n\
         Precio unitario: RD$ {}\n\
         Total: RD$ {}\n\
         Mensaje: {}\n",
        r.submitted_at_iso(),
        r.name,
        r.phone,
        r.email,
        r.ticket_type.label(),
        r.quantity,
        format_amount(r.unit_price),
        format_amount(r.total),
        r.message
    )
}

pub fn email_html(r: &SubmissionRecord) -> String {
    format!(
        r#"<h2>Nueva solicitud</h2>
<ul>
  <li><b>Fecha:</b> {}</li>
  <li><b>Nombre:</b> {}</li>
  <li><b>Teléfono:</b> {}</li>
  <li><b>Correo:</b> {}</li>
  <li><b>Tipo:</b> {}</li>
  <li><b>Cantidad:</b> {}</li>
  <li><b>Precio unitario:</b> RD$ {}</li>
  <li><b>Total:</b> RD$ {}</li>
  <li><b>Mensaje:</b> {}</li>
</ul>
"#,
        r.submitted_at_iso(),
        escape_html(&r.name),
        escape_html(&r.phone),
        escape_html(&r.email),
        escape_html(r.ticket_type.label()),
        r.quantity,
        format_amount(r.unit_price),
        format_amount(r.total),
        escape_html(&r.message)
    )
}

/// Parámetros posicionales {{1}}..{{7}} de la plantilla aprobada
pub fn whatsapp_template_params(r: &SubmissionRecord) -> Vec<String> {
    // La Cloud API rechaza parámetros vacíos
    let message = if r.message.is_empty() {
        "-".to_string()
    } else {
        r.message.clone()
    };
    vec![
        r.name.clone(),
        r.phone.clone(),
        r.email.clone(),
        r.ticket_type.label().to_string(),
        r.quantity.to_string(),
        format!("RD$ {}", format_amount(r.total)),
        message,
    ]
}

pub fn whatsapp_text(r: &SubmissionRecord) -> String {
    let mut text = format!(
        "*Nueva solicitud de boletas*\n\
         Nombre: {}\n\
         Teléfono: {}\n\
         Correo: {}\n\
         Tipo: {} x{}\n\
         Total: RD$ {}",
        r.name,
        r.phone,
        r.email,
        r.ticket_type.label(),
        r.quantity,
        format_amount(r.total)
    );
    if !r.message.is_empty() {
        text.push_str(&format!("\nMensaje: {}", r.message));
    }
    text
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission_model::TicketType;
    use uuid::Uuid;

    fn record(message: &str) -> SubmissionRecord {
        SubmissionRecord {
            id: Uuid::new_v4(),
            name: "<Ana & Co>".to_string(),
            phone: "8091234567".to_string(),
            email: "a@x.com".to_string(),
            ticket_type: TicketType::Pair,
            quantity: 2,
            unit_price: 4000.0,
            total: 8000.0,
            message: message.to_string(),
            submitted_at: "2025-09-01T12:00:00Z".parse().unwrap(),
            client_ip: String::new(),
            user_agent: String::new(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#039;&amp;&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_html_is_escaped_text_is_not() {
        let r = record("hola");
        assert!(email_html(&r).contains("&lt;Ana &amp; Co&gt;"));
        assert!(email_text(&r).contains("Nombre: <Ana & Co>"));
        assert!(email_text(&r).contains("Total: RD$ 8000"));
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            email_subject(&record("")),
            "Nueva solicitud de compra - <Ana & Co> (pareja x2)"
        );
    }

    #[test]
    fn test_template_params_never_empty() {
        let params = whatsapp_template_params(&record(""));
        assert_eq!(params.len(), 7);
        assert_eq!(params[6], "-");
        assert!(params.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn test_whatsapp_text_omits_empty_message() {
        assert!(!whatsapp_text(&record("")).contains("Mensaje"));
        assert!(whatsapp_text(&record("gracias")).ends_with("Mensaje: gracias"));
    }
}
