//! Bearer-token authentication.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/auth/register` | Self-registration, password sent by mail |
//! | POST | `/api/auth/login` | Exchange credentials for a bearer token |
//! | POST | `/api/auth/logout` | Revoke the current token |
//! | GET | `/api/auth/me` | Current user |

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use services::TokenService;
