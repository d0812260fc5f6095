//! Admin dashboard statistics (`/api/statistiques`).
//!
//! Aggregation happens in SQL; [`charts`] shapes the rows into chart and graph payloads.

pub mod charts;
pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::StatisticsService;
