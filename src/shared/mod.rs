pub mod constants;
pub mod file_response;
pub mod filter;
pub mod mime;
pub mod test_helpers;
pub mod types;
pub mod validation;
