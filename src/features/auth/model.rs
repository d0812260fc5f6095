use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::ROLE_ADMIN;

/// Identity resolved from a bearer token by the auth middleware
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// 0 = user, 1 = admin
    pub role: i16,
    pub service_id: Option<i64>,
    /// Row of `personal_access_tokens` the request was authenticated with
    #[serde(skip)]
    pub token_id: i64,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: i16) -> bool {
        self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::ROLE_USER;
    use crate::shared::test_helpers::{create_admin_user, create_regular_user};

    #[test]
    fn test_roles() {
        assert!(create_admin_user().is_admin());
        assert!(create_regular_user().has_role(ROLE_USER));
        assert!(!create_regular_user().is_admin());
    }

    #[test]
    fn test_token_id_is_not_serialized() {
        let json = serde_json::to_value(create_regular_user()).unwrap();
        assert!(json.get("token_id").is_none());
        assert_eq!(json["role"], 0);
    }
}
