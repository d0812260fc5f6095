//! Advanced document search and the options that feed its form.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::SearchService;
