//! handlers/mod.rs
pub mod submit_handler;
