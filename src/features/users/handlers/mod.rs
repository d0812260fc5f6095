pub mod user_handler;

pub use user_handler::{
    __path_assign_role, __path_assign_service, __path_create_user, __path_freeze_user,
    __path_get_user, __path_list_users, __path_reset_password, __path_unfreeze_user,
    __path_update_user, assign_role, assign_service, create_user, freeze_user, get_user,
    list_users, reset_password, unfreeze_user, update_user,
};
