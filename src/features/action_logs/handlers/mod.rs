pub mod action_log_handler;

pub use action_log_handler::{
    __path_get_action_log, __path_list_action_logs, get_action_log, list_action_logs,
};
