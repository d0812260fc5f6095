//! Audit trail of user actions.
//!
//! Features record entries through [`ActionLogger`]; admins read them through
//! `/api/log-actions`.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::{ActionLogService, ActionLogger, AuditAction, AuditEntry};
