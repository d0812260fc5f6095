pub mod document_handler;

pub use document_handler::{
    __path_download_document, __path_force_delete_document, __path_get_document,
    __path_list_documents, __path_list_trash, __path_preview_document, __path_recent_documents,
    __path_restore_document, __path_search_recent_documents, __path_send_document_email,
    __path_trash_document, __path_update_document, __path_upload_document, download_document,
    force_delete_document, get_document, list_documents, list_trash, preview_document,
    recent_documents, restore_document, search_recent_documents, send_document_email,
    trash_document, update_document, upload_document,
};
