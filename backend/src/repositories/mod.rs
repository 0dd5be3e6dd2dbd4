pub mod listing;

pub use listing::{ListingRepository, ListingRepositoryTrait};
