pub mod access;
pub mod action_logs;
pub mod auth;
pub mod documents;
pub mod favorites;
pub mod notifications;
pub mod org_services;
pub mod search;
pub mod share_links;
pub mod shares;
pub mod statistics;
pub mod users;
