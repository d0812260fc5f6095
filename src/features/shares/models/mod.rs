mod document_share;

pub use document_share::{ShareWithUsers, SharedWithMeRow, SHARE_SELECT};
