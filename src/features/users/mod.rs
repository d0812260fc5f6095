//! User accounts.
//!
//! The account model and lookups are shared with authentication and sharing; the routes are
//! the admin account management surface.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users` | List accounts (generic filter) |
//! | POST | `/api/users` | Create an account |
//! | GET | `/api/users/{id}` | Show an account |
//! | PUT | `/api/users/{id}` | Update an account |
//! | DELETE | `/api/users/{id}` | Freeze an account |
//! | PATCH | `/api/users/{id}/unfreeze` | Reactivate a frozen account |
//! | PATCH | `/api/users/{id}/reset-password` | Replace the password |
//! | PATCH | `/api/users/{id}/assign-role` | Change the role |
//! | PATCH | `/api/users/{id}/assign-service` | Change the service |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::UserService;
