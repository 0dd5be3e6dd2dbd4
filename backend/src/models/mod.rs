//! Data models shared across database access and API handlers.

pub mod listing;
pub mod profile;
pub mod session;
