pub mod auth;
pub mod listings;

pub use auth::*;
pub use listings::*;
