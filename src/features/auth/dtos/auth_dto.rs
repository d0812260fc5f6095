use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::dtos::UserResponseDto;

/// Self-registration. The password is generated and mailed to the given address.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(length(min = 1, max = 255, message = "Nom must be 1-255 characters"))]
    pub nom: String,

    #[validate(length(min = 1, max = 255, message = "Prenom must be 1-255 characters"))]
    pub prenom: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub service_id: Option<i64>,

    #[validate(regex(
        path = "*crate::shared::validation::PHONE_REGEX",
        message = "Invalid phone number"
    ))]
    pub telephone: Option<String>,
}

/// Request DTO for user login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response DTO for login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponseDto {
    /// Opaque bearer token
    pub token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// `null` when tokens do not expire
    pub expires_at: Option<DateTime<Utc>>,
    pub user: UserResponseDto,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    #[test]
    fn test_register_validation() {
        let dto = RegisterRequestDto {
            nom: "Kouassi".to_string(),
            prenom: "Awa".to_string(),
            email: SafeEmail().fake(),
            service_id: Some(1),
            telephone: None,
        };
        assert!(dto.validate().is_ok());

        let dto = RegisterRequestDto {
            nom: String::new(),
            prenom: "Awa".to_string(),
            email: "awa@example.com".to_string(),
            service_id: None,
            telephone: Some("not a phone".to_string()),
        };
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("nom"));
        assert!(fields.contains_key("telephone"));
    }

    #[test]
    fn test_login_validation() {
        let dto = LoginRequestDto {
            email: "awa@example.com".to_string(),
            password: String::new(),
        };
        assert!(dto.validate().is_err());
    }
}
