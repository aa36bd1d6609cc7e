//! Shared application state

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::application::ports::outbound::{KeyValueStorePort, MonsterCatalogPort};
use crate::application::services::{
    DirectoryServiceImpl, EncounterServiceImpl, MonsterCatalogService, StorageKeys,
};
use crate::domain::value_objects::{DiceError, DiceRoll};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::monster_catalog::MonsterCatalogClient;
use crate::infrastructure::persistence::KeyValueBackend;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    // Application services
    pub directory_service: DirectoryServiceImpl,
    pub encounter_service: EncounterServiceImpl,
    pub monster_catalog_service: MonsterCatalogService,
    dice_rng: Mutex<StdRng>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        // Storage backend selected by configuration
        let store = KeyValueBackend::from_config(&config.storage).await?;

        // Remote monster catalog (fails inline when no URL is set)
        let catalog = MonsterCatalogClient::new(&config.monster_catalog)?;

        Ok(Self::with_adapters(
            config,
            Arc::new(store),
            Arc::new(catalog),
            StdRng::from_entropy(),
        ))
    }

    /// Wire the services over explicit adapters
    pub fn with_adapters(
        config: AppConfig,
        store: Arc<dyn KeyValueStorePort>,
        catalog: Arc<dyn MonsterCatalogPort>,
        mut rng: StdRng,
    ) -> Self {
        let keys = StorageKeys::new(config.storage.namespace.clone());
        let settings = config.tracker.clone();

        // One lock for every read-modify-write over the shared store
        let write_lock = Arc::new(tokio::sync::Mutex::new(()));
        let directory_service =
            DirectoryServiceImpl::new(store.clone(), keys.clone(), settings.clone())
                .with_write_lock(write_lock.clone());
        let encounter_service = EncounterServiceImpl::with_rng(
            store,
            keys,
            settings.clone(),
            StdRng::seed_from_u64(rng.gen()),
        )
        .with_write_lock(write_lock);
        let monster_catalog_service = MonsterCatalogService::new(catalog, settings);

        Self {
            config,
            directory_service,
            encounter_service,
            monster_catalog_service,
            dice_rng: Mutex::new(rng),
        }
    }

    pub fn roll_dice(&self, count: u32, sides: u32, modifier: i32) -> Result<DiceRoll, DiceError> {
        let mut rng = self.dice_rng.lock().unwrap_or_else(PoisonError::into_inner);
        DiceRoll::roll(&mut *rng, count, sides, modifier)
    }
}
