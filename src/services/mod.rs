//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod channel;
pub mod dispatch_service;
pub mod email_service;
pub mod sheet_service;
pub mod submission_service;
pub mod template_service;
pub mod validation_service;
pub mod whatsapp_service;
