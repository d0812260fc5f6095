mod document;

pub use document::{DocumentWithRelations, DOCUMENT_SELECT};
