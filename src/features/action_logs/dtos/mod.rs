mod log_action_dto;

pub use log_action_dto::{LogActionResponseDto, LogActionUserDto};
