pub mod statistics_handler;

pub use statistics_handler::{
    __path_active_users, __path_document_activity, __path_document_flow, __path_global_stats,
    __path_recent_actions, __path_sharing_stats, __path_storage_breakdown,
    __path_user_actions_chart, __path_user_activity, active_users, document_activity,
    document_flow, global_stats, recent_actions, sharing_stats, storage_breakdown,
    user_actions_chart, user_activity,
};
