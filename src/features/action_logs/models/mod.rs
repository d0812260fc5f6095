mod log_action;

pub use log_action::LogActionWithUser;
