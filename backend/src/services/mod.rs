pub mod steam;

pub use steam::{IdentityProvider, OpenIdError, SteamOpenId};
