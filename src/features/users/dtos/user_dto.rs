use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::models::{User, UserWithService};

/// Public view of a user account. The password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: i64,
    pub name: String,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub email: String,
    pub telephone: Option<String>,
    /// 0 = user, 1 = admin
    pub role: i16,
    /// `actif`, `inactif` or `suspendu`
    pub statut: String,
    pub is_frozen: bool,
    pub service_id: Option<i64>,
    pub service_nom: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserWithService> for UserResponseDto {
    fn from(row: UserWithService) -> Self {
        let is_frozen = row.user.is_frozen();
        let User {
            id,
            name,
            nom,
            prenom,
            email,
            telephone,
            role,
            statut,
            service_id,
            created_at,
            updated_at,
            ..
        } = row.user;

        Self {
            id,
            name,
            nom,
            prenom,
            email,
            telephone,
            role,
            statut,
            is_frozen,
            service_id,
            service_nom: row.service_nom,
            created_at,
            updated_at,
        }
    }
}

/// Admin request to create an account
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(max = 255))]
    pub nom: Option<String>,

    #[validate(length(max = 255))]
    pub prenom: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(regex(
        path = "*crate::shared::validation::PHONE_REGEX",
        message = "Invalid phone number"
    ))]
    pub telephone: Option<String>,

    #[validate(custom(function = "crate::shared::validation::validate_role"))]
    pub role: Option<i16>,

    pub service_id: Option<i64>,

    #[validate(custom(function = "crate::features::users::dtos::validate_statut"))]
    pub statut: Option<String>,
}

/// Admin update; absent fields are left unchanged
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 255))]
    pub nom: Option<String>,

    #[validate(length(max = 255))]
    pub prenom: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(regex(
        path = "*crate::shared::validation::PHONE_REGEX",
        message = "Invalid phone number"
    ))]
    pub telephone: Option<String>,

    #[validate(custom(function = "crate::shared::validation::validate_role"))]
    pub role: Option<i16>,

    pub service_id: Option<i64>,

    #[validate(custom(function = "crate::features::users::dtos::validate_statut"))]
    pub statut: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_password_confirmation", skip_on_field_errors = true))]
pub struct ResetPasswordDto {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignRoleDto {
    #[validate(custom(function = "crate::shared::validation::validate_role"))]
    pub role: i16,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignServiceDto {
    /// `null` detaches the user from any service
    pub service_id: Option<i64>,
}

fn validate_password_confirmation(
    dto: &ResetPasswordDto,
) -> Result<(), validator::ValidationError> {
    if dto.password == dto.password_confirmation {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("password_confirmation");
        err.message = Some("Password confirmation does not match".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    fn create_dto() -> CreateUserDto {
        CreateUserDto {
            name: "awa".to_string(),
            nom: Some("Kouassi".to_string()),
            prenom: Some("Awa".to_string()),
            email: SafeEmail().fake(),
            password: "longenough".to_string(),
            telephone: Some("+225 07 08 09 10".to_string()),
            role: Some(0),
            service_id: None,
            statut: None,
        }
    }

    #[test]
    fn test_create_user_validation() {
        assert!(create_dto().validate().is_ok());

        let mut dto = create_dto();
        dto.password = "short".to_string();
        assert!(dto.validate().is_err());

        let mut dto = create_dto();
        dto.role = Some(3);
        assert!(dto.validate().is_err());

        let mut dto = create_dto();
        dto.statut = Some("banni".to_string());
        assert!(dto.validate().is_err());

        let mut dto = create_dto();
        dto.email = "not-an-email".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_reset_password_confirmation() {
        let ok = ResetPasswordDto {
            password: "newpassword".to_string(),
            password_confirmation: "newpassword".to_string(),
        };
        assert!(ok.validate().is_ok());

        let mismatch = ResetPasswordDto {
            password: "newpassword".to_string(),
            password_confirmation: "otherpassword".to_string(),
        };
        assert!(mismatch.validate().is_err());

        let short = ResetPasswordDto {
            password: "short".to_string(),
            password_confirmation: "short".to_string(),
        };
        assert!(short.validate().is_err());
    }
}
