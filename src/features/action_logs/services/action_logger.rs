use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::core::extractor::ClientIp;

/// Actions written to `log_actions.action`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Login,
    Logout,
    Created,
    Updated,
    Deleted,
    Trashed,
    Restored,
    Purged,
    Downloaded,
    Emailed,
    Shared,
    Unshared,
    LinkCreated,
    LinkAccessed,
    Frozen,
    Unfrozen,
    PasswordReset,
    RoleAssigned,
    ServiceAssigned,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::Created => "created",
            AuditAction::Updated => "updated",
            AuditAction::Deleted => "deleted",
            AuditAction::Trashed => "trashed",
            AuditAction::Restored => "restored",
            AuditAction::Purged => "purged",
            AuditAction::Downloaded => "downloaded",
            AuditAction::Emailed => "emailed",
            AuditAction::Shared => "shared",
            AuditAction::Unshared => "unshared",
            AuditAction::LinkCreated => "link_created",
            AuditAction::LinkAccessed => "link_accessed",
            AuditAction::Frozen => "frozen",
            AuditAction::Unfrozen => "unfrozen",
            AuditAction::PasswordReset => "password_reset",
            AuditAction::RoleAssigned => "role_assigned",
            AuditAction::ServiceAssigned => "service_assigned",
        }
    }
}

/// One audit row, built fluently by the feature that performed the action
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub table: &'static str,
    pub user_id: Option<i64>,
    pub new_values: Option<JsonValue>,
    pub old_values: Option<JsonValue>,
    pub ip: Option<String>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, table: &'static str) -> Self {
        Self {
            action,
            table,
            user_id: None,
            new_values: None,
            old_values: None,
            ip: None,
        }
    }

    pub fn by(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_new<T: Serialize>(mut self, values: &T) -> Self {
        self.new_values = serde_json::to_value(values).ok();
        self
    }

    pub fn with_old<T: Serialize>(mut self, values: &T) -> Self {
        self.old_values = serde_json::to_value(values).ok();
        self
    }

    pub fn from_ip(mut self, ip: &ClientIp) -> Self {
        self.ip = ip.0.clone();
        self
    }
}

/// Writes audit rows on its own pool connection, after the audited change committed.
///
/// A failed write is logged and swallowed: auditing never fails the request it describes.
pub struct ActionLogger {
    pool: PgPool,
}

impl ActionLogger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, entry: AuditEntry) {
        let result = sqlx::query(
            r#"
            INSERT INTO log_actions
                (action, table_affectee, user_id, nouvelles_valeurs, anciennes_valeurs, adresse_ip)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.action.as_str())
        .bind(entry.table)
        .bind(entry.user_id)
        .bind(&entry.new_values)
        .bind(&entry.old_values)
        .bind(&entry.ip)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(
                "Failed to record '{}' action on {}: {:?}",
                entry.action.as_str(),
                entry.table,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_builder() {
        let entry = AuditEntry::new(AuditAction::Updated, "documents")
            .by(7)
            .with_old(&json!({"nom": "a.pdf"}))
            .with_new(&json!({"nom": "b.pdf"}))
            .from_ip(&ClientIp(Some("10.0.0.1".into())));

        assert_eq!(entry.action.as_str(), "updated");
        assert_eq!(entry.table, "documents");
        assert_eq!(entry.user_id, Some(7));
        assert_eq!(entry.old_values, Some(json!({"nom": "a.pdf"})));
        assert_eq!(entry.new_values, Some(json!({"nom": "b.pdf"})));
        assert_eq!(entry.ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_action_names() {
        assert_eq!(AuditAction::Purged.as_str(), "purged");
        assert_eq!(AuditAction::LinkCreated.as_str(), "link_created");
        assert_eq!(AuditAction::PasswordReset.as_str(), "password_reset");
    }

    #[tokio::test]
    async fn test_record_never_fails_the_caller() {
        // The lazy pool cannot connect; the write error is only logged
        let logger = ActionLogger::new(crate::shared::test_helpers::lazy_pool());
        logger
            .record(AuditEntry::new(AuditAction::Login, "users").by(1))
            .await;
    }
}
