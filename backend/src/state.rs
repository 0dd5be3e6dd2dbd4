use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    config::Config,
    repositories::{ListingRepository, ListingRepositoryTrait},
    services::steam::{IdentityProvider, OpenIdError, SteamOpenId},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub listings: Arc<dyn ListingRepositoryTrait>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(
        config: Config,
        listings: Arc<dyn ListingRepositoryTrait>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config,
            listings,
            identity,
        }
    }

    /// Wires the Postgres listing store and the live Steam provider.
    pub fn from_pool(pool: PgPool, config: Config) -> Result<Self, OpenIdError> {
        let identity = SteamOpenId::new(&config)?;
        Ok(Self::new(
            config,
            Arc::new(ListingRepository::new(pool)),
            Arc::new(identity),
        ))
    }

    pub fn admin_steam_id(&self) -> Option<&str> {
        self.config.admin_steam_id.as_deref()
    }
}
