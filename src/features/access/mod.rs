//! Document access policy.
//!
//! Every route that reads a document goes through this module: the pure predicates in
//! [`policy`] decide single-document access, and [`policy::push_visible_condition`] applies the
//! same rule to SQL listings.

pub mod policy;
pub mod services;

pub use policy::{AccessGrant, PermissionLevel};
pub use services::{AccessService, TrashScope};
