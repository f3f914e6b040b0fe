use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::{Config, ConfigError};
use crate::db::store::{DocStore, UserDirectory};
use crate::services::auth_service::SessionAuthenticator;
use crate::ws::namecache::NameCache;
use crate::ws::presence::{Presence, SharedRooms};
use crate::ws::relay::Relay;
use crate::ws::rooms::RoomRegistry;

/// Process-wide state, built once at startup and shared by every handler
pub struct AppState {
    pub config: Config,
    pub authenticator: SessionAuthenticator,
    pub store: Arc<dyn DocStore>,
    pub names: Arc<NameCache>,
    pub rooms: SharedRooms,
    pub presence: Presence,
    pub relay: Relay,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn DocStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Result<Self, ConfigError> {
        let authenticator = SessionAuthenticator::new(config.require_jwt_secret()?);
        let names = Arc::new(NameCache::new(
            directory,
            config.name_cache_policy(),
            config.name_cache_capacity,
        ));
        let rooms: SharedRooms = Arc::new(Mutex::new(RoomRegistry::new()));
        let presence = Presence::new(rooms.clone(), store.clone(), names.clone());
        let relay = Relay::new(rooms.clone());

        Ok(Self {
            config,
            authenticator,
            store,
            names,
            rooms,
            presence,
            relay,
        })
    }
}
