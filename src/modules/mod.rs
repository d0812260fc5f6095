//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the document storage backends and the outgoing mailer.

pub mod mail;
pub mod storage;
