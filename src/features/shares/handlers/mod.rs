pub mod share_handler;

pub use share_handler::{
    __path_leave_share, __path_list_document_shares, __path_remove_document_share,
    __path_remove_share, __path_share_document, __path_share_with_service, __path_shared_with_me,
    leave_share, list_document_shares, remove_document_share, remove_share, share_document,
    share_with_service, shared_with_me,
};
