use axum::extract::FromRef;

use crate::entertainment::{EntertainmentStore, PhotoStore};
use crate::statistics::{StatisticsQueryService, StatisticsRecomputer};
use crate::user::UserManager;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedEntertainmentStore = Arc<dyn EntertainmentStore>;
pub type GuardedUserManager = Arc<UserManager>;
pub type GuardedPhotoStore = Arc<PhotoStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub entertainment_store: GuardedEntertainmentStore,
    pub user_manager: GuardedUserManager,
    pub photo_store: GuardedPhotoStore,
    pub statistics_recomputer: StatisticsRecomputer,
    pub statistics_query: StatisticsQueryService,
}

impl FromRef<ServerState> for GuardedEntertainmentStore {
    fn from_ref(input: &ServerState) -> Self {
        input.entertainment_store.clone()
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedPhotoStore {
    fn from_ref(input: &ServerState) -> Self {
        input.photo_store.clone()
    }
}

impl FromRef<ServerState> for StatisticsRecomputer {
    fn from_ref(input: &ServerState) -> Self {
        input.statistics_recomputer.clone()
    }
}

impl FromRef<ServerState> for StatisticsQueryService {
    fn from_ref(input: &ServerState) -> Self {
        input.statistics_query.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
