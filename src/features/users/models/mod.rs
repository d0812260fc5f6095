mod user;

pub use user::{User, UserWithService, USER_WITH_SERVICE_SELECT};
