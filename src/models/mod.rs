//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod channel_model;
pub mod submission_model;
