pub mod share_link_handler;

pub use share_link_handler::{
    __path_access_shared_document, __path_create_share_link, __path_shared_document_info,
    access_shared_document, create_share_link, shared_document_info,
};
