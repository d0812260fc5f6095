mod action_log_service;
mod action_logger;

pub use action_log_service::ActionLogService;
pub use action_logger::{ActionLogger, AuditAction, AuditEntry};
