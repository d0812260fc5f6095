mod lookup;
mod user_service;

pub use lookup::{fetch_user_with_service, find_user_by_email};
pub use user_service::UserService;
