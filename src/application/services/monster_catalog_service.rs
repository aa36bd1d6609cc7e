//! Monster catalog cache
//!
//! Holds the last successful fetch from the remote catalog. Each refresh
//! takes a generation ticket and only writes back if the ticket is still
//! current, so an `invalidate()` issued mid-fetch makes the late response
//! harmless. Nothing here ever touches an encounter.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::application::ports::outbound::{MonsterCatalogPort, MonsterStatBlock};
use crate::application::services::ServiceError;
use crate::domain::entities::{AbilityScores, CharacterCategory, CharacterTemplate};
use crate::domain::value_objects::TrackerSettings;

/// What the catalog currently offers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub monsters: Vec<MonsterStatBlock>,
    /// Inline message when the last fetch failed
    pub error: Option<String>,
}

#[derive(Default)]
struct CatalogState {
    generation: u64,
    snapshot: CatalogSnapshot,
}

pub struct MonsterCatalogService {
    port: Arc<dyn MonsterCatalogPort>,
    settings: TrackerSettings,
    state: RwLock<CatalogState>,
}

impl MonsterCatalogService {
    pub fn new(port: Arc<dyn MonsterCatalogPort>, settings: TrackerSettings) -> Self {
        Self {
            port,
            settings,
            state: RwLock::new(CatalogState::default()),
        }
    }

    /// Current cache contents
    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.state.read().await.snapshot.clone()
    }

    /// Fetch the catalog and replace the cache if no newer request superseded this one
    pub async fn refresh(&self) -> CatalogSnapshot {
        let ticket = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.generation
        };

        let result = self.port.fetch_monsters().await;

        let mut state = self.state.write().await;
        if state.generation != ticket {
            debug!(ticket, current = state.generation, "Discarding stale catalog fetch");
            return state.snapshot.clone();
        }

        state.snapshot = match result {
            Ok(monsters) => {
                info!(count = monsters.len(), "Loaded monster catalog");
                CatalogSnapshot {
                    monsters,
                    error: None,
                }
            }
            Err(e) => {
                warn!("Monster catalog fetch failed: {}", e);
                CatalogSnapshot {
                    monsters: Vec::new(),
                    error: Some(format!("Could not load monsters: {}", e)),
                }
            }
        };
        state.snapshot.clone()
    }

    /// Drop the cache and orphan any fetch in flight
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.snapshot = CatalogSnapshot::default();
    }

    /// Build a directory template from the cached entry at `index`
    pub async fn to_template(&self, index: usize) -> Result<CharacterTemplate> {
        let state = self.state.read().await;
        let block = state
            .snapshot
            .monsters
            .get(index)
            .ok_or_else(|| ServiceError::not_found(format!("Monster #{}", index)))?;
        Ok(stat_block_to_template(block, &self.settings))
    }
}

/// Convert a remote stat block, substituting defaults for missing numbers
pub fn stat_block_to_template(block: &MonsterStatBlock, settings: &TrackerSettings) -> CharacterTemplate {
    let dexterity_modifier = block
        .dexterity
        .map(AbilityScores::modifier)
        .unwrap_or(settings.default_dexterity_modifier);

    let notes = [
        block.size.as_deref(),
        block.creature_type.as_deref(),
        block.challenge_rating.as_deref().map(|cr| format!("CR {}", cr)).as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");

    let name = match block.name.trim() {
        "" => "Unnamed monster",
        name => name,
    };

    CharacterTemplate::new(
        name,
        CharacterCategory::Monster,
        block.hit_points.unwrap_or(settings.default_max_hp),
    )
    .with_armor_class(block.armor_class.unwrap_or(settings.default_armor_class))
    .with_dexterity_modifier(dexterity_modifier)
    .with_notes(notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{CatalogError, MockMonsterCatalogPort};
    use async_trait::async_trait;
    use tokio::sync::{Mutex, Notify};

    fn goblin() -> MonsterStatBlock {
        MonsterStatBlock {
            name: "Goblin".to_string(),
            hit_points: Some(7),
            armor_class: Some(15),
            dexterity: Some(14),
            size: Some("Small".to_string()),
            creature_type: Some("humanoid".to_string()),
            challenge_rating: Some("1/4".to_string()),
        }
    }

    #[tokio::test]
    async fn test_refresh_fills_cache() {
        let mut port = MockMonsterCatalogPort::new();
        port.expect_fetch_monsters()
            .times(1)
            .returning(|| Ok(vec![goblin()]));
        let service = MonsterCatalogService::new(Arc::new(port), TrackerSettings::default());

        let snapshot = service.refresh().await;
        assert_eq!(snapshot.monsters, vec![goblin()]);
        assert_eq!(snapshot.error, None);
        assert_eq!(service.snapshot().await, snapshot);
    }

    #[tokio::test]
    async fn test_failure_leaves_cache_empty_with_message() {
        let mut port = MockMonsterCatalogPort::new();
        port.expect_fetch_monsters()
            .returning(|| Err(CatalogError::Http("connection refused".to_string())));
        let service = MonsterCatalogService::new(Arc::new(port), TrackerSettings::default());

        let snapshot = service.refresh().await;
        assert!(snapshot.monsters.is_empty());
        assert!(snapshot
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("Could not load monsters")));
    }

    struct GatedCatalog {
        started: Notify,
        release: Notify,
        monsters: Mutex<Vec<MonsterStatBlock>>,
    }

    #[async_trait]
    impl MonsterCatalogPort for GatedCatalog {
        async fn fetch_monsters(&self) -> Result<Vec<MonsterStatBlock>, CatalogError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(self.monsters.lock().await.clone())
        }
    }

    #[tokio::test]
    async fn test_invalidate_discards_in_flight_fetch() {
        let port = Arc::new(GatedCatalog {
            started: Notify::new(),
            release: Notify::new(),
            monsters: Mutex::new(vec![goblin()]),
        });
        let service = Arc::new(MonsterCatalogService::new(
            port.clone(),
            TrackerSettings::default(),
        ));

        let refresh = tokio::spawn({
            let service = service.clone();
            async move { service.refresh().await }
        });
        port.started.notified().await;
        service.invalidate().await;
        port.release.notify_one();
        refresh.await.unwrap();

        assert_eq!(service.snapshot().await, CatalogSnapshot::default());
    }

    #[tokio::test]
    async fn test_to_template_uses_ability_modifier_and_defaults() {
        let mut port = MockMonsterCatalogPort::new();
        port.expect_fetch_monsters().returning(|| {
            Ok(vec![
                goblin(),
                MonsterStatBlock {
                    name: "Ooze".to_string(),
                    dexterity: Some(3),
                    ..Default::default()
                },
            ])
        });
        let service = MonsterCatalogService::new(Arc::new(port), TrackerSettings::default());
        service.refresh().await;

        let goblin = service.to_template(0).await.unwrap();
        assert_eq!(goblin.category, CharacterCategory::Monster);
        assert_eq!(goblin.max_hp, 7);
        assert_eq!(goblin.armor_class, 15);
        assert_eq!(goblin.dexterity_modifier, 2);
        assert_eq!(goblin.notes, "Small, humanoid, CR 1/4");

        let ooze = service.to_template(1).await.unwrap();
        assert_eq!(ooze.max_hp, 10);
        assert_eq!(ooze.armor_class, 10);
        assert_eq!(ooze.dexterity_modifier, -4);

        assert!(service.to_template(2).await.is_err());
    }
}
