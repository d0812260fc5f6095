pub mod search_handler;

pub use search_handler::{
    __path_filter_options, __path_search_documents, filter_options, search_documents,
};
