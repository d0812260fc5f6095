mod user_dto;

pub use user_dto::{
    AssignRoleDto, AssignServiceDto, CreateUserDto, ResetPasswordDto, UpdateUserDto,
    UserResponseDto,
};

use crate::shared::constants::{STATUS_ACTIVE, STATUS_INACTIVE, STATUS_SUSPENDED};

pub fn validate_statut(value: &str) -> Result<(), validator::ValidationError> {
    if [STATUS_ACTIVE, STATUS_INACTIVE, STATUS_SUSPENDED].contains(&value) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("statut");
        err.message = Some("statut must be 'actif', 'inactif' or 'suspendu'".into());
        Err(err)
    }
}
