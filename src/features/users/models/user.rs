use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::shared::constants::{STATUS_INACTIVE, STATUS_SUSPENDED};

/// Database model for users
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub email: String,
    /// bcrypt hash
    pub password: String,
    pub telephone: Option<String>,
    pub role: i16,
    pub statut: String,
    pub service_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Suspended accounts are "frozen" in the admin listing
    pub fn is_frozen(&self) -> bool {
        self.statut == STATUS_SUSPENDED
    }

    /// Frozen and inactive accounts are the only ones that can be unfrozen
    pub fn can_unfreeze(&self) -> bool {
        self.statut == STATUS_SUSPENDED || self.statut == STATUS_INACTIVE
    }
}

/// User row joined with the name of its service
#[derive(Debug, Clone, FromRow)]
pub struct UserWithService {
    #[sqlx(flatten)]
    pub user: User,
    pub service_nom: Option<String>,
}

/// `SELECT` producing [`UserWithService`] rows; append `WHERE ...` with the `u` alias
pub const USER_WITH_SERVICE_SELECT: &str = r#"
    SELECT u.id, u.name, u.nom, u.prenom, u.email, u.password, u.telephone, u.role, u.statut,
           u.service_id, u.created_at, u.updated_at, s.nom AS service_nom
    FROM users u
    LEFT JOIN services s ON s.id = u.service_id
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn user(statut: &str) -> User {
        User {
            id: 1,
            name: "user20250101000000".to_string(),
            nom: Some("Kouassi".to_string()),
            prenom: Some("Awa".to_string()),
            email: "awa@example.com".to_string(),
            password: String::new(),
            telephone: None,
            role: 0,
            statut: statut.to_string(),
            service_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_helpers() {
        assert!(!user("actif").can_unfreeze());
        assert!(user("suspendu").is_frozen());
        assert!(user("suspendu").can_unfreeze());
        assert!(user("inactif").can_unfreeze());
        assert!(!user("inactif").is_frozen());
    }
}
