//! Encounter Service - Runs the per-campaign fight
//!
//! Every mutation is load → mutate through the `Encounter` aggregate → save,
//! serialized by one async lock so concurrent requests cannot interleave
//! inside a read-modify-write.

use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::application::dto::lenient::nonzero_or;
use crate::application::dto::{parse_category, AddCombatantRequestDto};
use crate::application::ports::outbound::KeyValueStorePort;
use crate::application::services::records::{self, StorageKeys};
use crate::application::services::ServiceError;
use crate::domain::aggregates::{Encounter, EncounterError};
use crate::domain::entities::{Campaign, CharacterTemplate, Combatant, CombatantPatch};
use crate::domain::services::{initiative, HpShortcut};
use crate::domain::value_objects::{
    CampaignId, CharacterId, CombatantId, Condition, HpFloor, TrackerSettings,
};

/// How to set current HP in one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HpTarget {
    Value(i32),
    Shortcut(HpShortcut),
}

/// A combatant together with the template it still points at
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedCombatant {
    pub combatant: Combatant,
    pub template: Option<CharacterTemplate>,
}

/// Encounter service trait defining the application use cases
#[async_trait]
pub trait EncounterService: Send + Sync {
    /// Start a fresh encounter, replacing any previous one for the campaign
    async fn start(&self, campaign_id: CampaignId, hp_floor: Option<HpFloor>) -> Result<Encounter>;

    async fn get(&self, campaign_id: CampaignId) -> Result<Encounter>;

    async fn end(&self, campaign_id: CampaignId) -> Result<()>;

    /// Add from a template when `template_id` is set, otherwise a custom entry
    async fn add_combatant(
        &self,
        campaign_id: CampaignId,
        request: AddCombatantRequestDto,
    ) -> Result<(Encounter, CombatantId)>;

    async fn remove_combatant(&self, campaign_id: CampaignId, id: CombatantId)
        -> Result<Encounter>;

    async fn update_combatant(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
        patch: CombatantPatch,
    ) -> Result<Encounter>;

    async fn advance_turn(&self, campaign_id: CampaignId) -> Result<Encounter>;

    async fn apply_delta(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
        amount: i32,
    ) -> Result<Encounter>;

    async fn set_hp(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
        target: HpTarget,
    ) -> Result<Encounter>;

    async fn set_temporary_hp(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
        value: i32,
    ) -> Result<Encounter>;

    async fn add_condition(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
        condition: Condition,
    ) -> Result<Encounter>;

    async fn remove_condition(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
        condition: Condition,
    ) -> Result<Encounter>;

    /// Insert combatants under fresh ids through the initiative ordering
    async fn import_combatants(
        &self,
        campaign_id: CampaignId,
        combatants: Vec<Combatant>,
    ) -> Result<Encounter>;

    /// Combatants joined with their templates; ones whose template was deleted are skipped
    async fn linked_roster(
        &self,
        campaign_id: CampaignId,
    ) -> Result<(Encounter, Vec<LinkedCombatant>)>;
}

/// Default implementation of EncounterService over the key-value store
pub struct EncounterServiceImpl {
    store: Arc<dyn KeyValueStorePort>,
    keys: StorageKeys,
    settings: TrackerSettings,
    write_lock: Arc<Mutex<()>>,
    rng: StdMutex<StdRng>,
}

impl EncounterServiceImpl {
    pub fn new(
        store: Arc<dyn KeyValueStorePort>,
        keys: StorageKeys,
        settings: TrackerSettings,
    ) -> Self {
        Self::with_rng(store, keys, settings, StdRng::from_entropy())
    }

    /// Use a caller-provided generator, e.g. a seeded one for reproducible rolls
    pub fn with_rng(
        store: Arc<dyn KeyValueStorePort>,
        keys: StorageKeys,
        settings: TrackerSettings,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            keys,
            settings,
            write_lock: Arc::new(Mutex::new(())),
            rng: StdMutex::new(rng),
        }
    }

    /// Share the write lock with the directory service
    pub fn with_write_lock(mut self, write_lock: Arc<Mutex<()>>) -> Self {
        self.write_lock = write_lock;
        self
    }

    async fn load(&self, campaign_id: CampaignId) -> Result<Option<Encounter>> {
        let encounter: Option<Encounter> =
            records::load(self.store.as_ref(), &self.keys.battle(campaign_id))
                .await
                .context("Failed to load encounter")?;
        Ok(encounter.map(|mut encounter| {
            encounter.normalize();
            encounter
        }))
    }

    async fn load_required(&self, campaign_id: CampaignId) -> Result<Encounter> {
        self.load(campaign_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Encounter for campaign {}", campaign_id)).into())
    }

    async fn save(&self, encounter: &Encounter) -> Result<()> {
        records::save(
            self.store.as_ref(),
            &self.keys.battle(encounter.campaign_id()),
            encounter,
        )
        .await
        .context("Failed to save encounter")
    }

    async fn load_templates(&self) -> Result<Vec<CharacterTemplate>> {
        records::load_list(self.store.as_ref(), &self.keys.characters())
            .await
            .context("Failed to load characters")
    }

    /// Load, mutate and save under the write lock
    ///
    /// The generator lock is confined to the synchronous closure.
    async fn mutate<T, F>(&self, campaign_id: CampaignId, f: F) -> Result<(Encounter, T)>
    where
        F: FnOnce(&mut Encounter, &mut StdRng) -> Result<T> + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut encounter = self.load_required(campaign_id).await?;
        let value = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut encounter, &mut *rng)?
        };
        self.save(&encounter).await?;
        Ok((encounter, value))
    }

    fn validate_name(&self, name: Option<&str>) -> Result<String> {
        let name = name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(ServiceError::validation("Combatant name cannot be empty").into());
        }
        if name.chars().count() > self.settings.max_name_length {
            return Err(ServiceError::validation(format!(
                "Combatant name cannot exceed {} characters",
                self.settings.max_name_length
            ))
            .into());
        }
        Ok(name.to_string())
    }

    /// Resolve the template a request refers to, if any
    async fn requested_template(
        &self,
        request: &AddCombatantRequestDto,
    ) -> Result<Option<CharacterTemplate>> {
        let Some(raw) = request.template_id.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        let id: CharacterId = raw
            .parse()
            .map_err(|_| ServiceError::validation(format!("Invalid template id: {}", raw)))?;
        let template = self
            .load_templates()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ServiceError::not_found(format!("Character {}", id)))?;
        Ok(Some(template))
    }
}

#[async_trait]
impl EncounterService for EncounterServiceImpl {
    #[instrument(skip(self))]
    async fn start(&self, campaign_id: CampaignId, hp_floor: Option<HpFloor>) -> Result<Encounter> {
        let _guard = self.write_lock.lock().await;
        let campaigns: Vec<Campaign> =
            records::load_list(self.store.as_ref(), &self.keys.campaigns())
                .await
                .context("Failed to load campaigns")?;
        if !campaigns.iter().any(|c| c.id == campaign_id) {
            return Err(ServiceError::not_found(format!("Campaign {}", campaign_id)).into());
        }

        let hp_floor = hp_floor.unwrap_or(self.settings.default_hp_floor);
        let encounter = Encounter::new(campaign_id, hp_floor);
        self.save(&encounter).await?;

        info!(campaign_id = %campaign_id, hp_floor = %hp_floor, "Started encounter");
        Ok(encounter)
    }

    #[instrument(skip(self))]
    async fn get(&self, campaign_id: CampaignId) -> Result<Encounter> {
        self.load_required(campaign_id).await
    }

    #[instrument(skip(self))]
    async fn end(&self, campaign_id: CampaignId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self.load(campaign_id).await?.is_none() {
            return Err(
                ServiceError::not_found(format!("Encounter for campaign {}", campaign_id)).into(),
            );
        }
        self.store
            .remove(&self.keys.battle(campaign_id))
            .await
            .context("Failed to remove encounter")?;

        info!(campaign_id = %campaign_id, "Ended encounter");
        Ok(())
    }

    #[instrument(skip(self, request))]
    async fn add_combatant(
        &self,
        campaign_id: CampaignId,
        request: AddCombatantRequestDto,
    ) -> Result<(Encounter, CombatantId)> {
        let template = self.requested_template(&request).await?;
        let manual_initiative = request.initiative;

        let (encounter, id) = match template {
            Some(template) => {
                self.mutate(campaign_id, move |encounter, rng| {
                    Ok(encounter.add_from_template(rng, &template, manual_initiative))
                })
                .await?
            }
            None => {
                let name = self.validate_name(request.name.as_deref())?;
                let category = parse_category(request.category.as_deref());
                let max_hp = nonzero_or(request.max_hp, self.settings.default_max_hp);
                let armor_class =
                    nonzero_or(request.armor_class, self.settings.default_armor_class);
                let dexterity_modifier = request
                    .dexterity_modifier
                    .unwrap_or(self.settings.default_dexterity_modifier);

                self.mutate(campaign_id, move |encounter, rng| {
                    let initiative =
                        initiative::resolve_initiative(rng, manual_initiative, dexterity_modifier);
                    let combatant = Combatant::new(name, category, max_hp, initiative)
                        .with_armor_class(armor_class)
                        .with_dexterity_modifier(dexterity_modifier);
                    Ok(encounter.add_combatant(combatant))
                })
                .await?
            }
        };

        info!(campaign_id = %campaign_id, combatant_id = %id, "Added combatant");
        Ok((encounter, id))
    }

    #[instrument(skip(self))]
    async fn remove_combatant(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
    ) -> Result<Encounter> {
        let (encounter, removed) = self
            .mutate(campaign_id, move |encounter, _| {
                encounter
                    .remove_combatant(id)
                    .ok_or_else(|| EncounterError::CombatantNotFound(id).into())
            })
            .await?;

        info!(campaign_id = %campaign_id, combatant_id = %id, "Removed combatant: {}", removed.name);
        Ok(encounter)
    }

    #[instrument(skip(self, patch))]
    async fn update_combatant(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
        mut patch: CombatantPatch,
    ) -> Result<Encounter> {
        // A zero max HP or AC falls back to the defaults, as on creation
        patch.max_hp = patch
            .max_hp
            .map(|max_hp| nonzero_or(Some(max_hp), self.settings.default_max_hp));
        patch.armor_class = patch
            .armor_class
            .map(|ac| nonzero_or(Some(ac), self.settings.default_armor_class));

        let (encounter, _) = self
            .mutate(campaign_id, move |encounter, _| {
                if encounter.update_combatant(id, patch) {
                    Ok(())
                } else {
                    Err(EncounterError::CombatantNotFound(id).into())
                }
            })
            .await?;

        debug!(campaign_id = %campaign_id, combatant_id = %id, "Updated combatant");
        Ok(encounter)
    }

    #[instrument(skip(self))]
    async fn advance_turn(&self, campaign_id: CampaignId) -> Result<Encounter> {
        let (encounter, current) = self
            .mutate(campaign_id, |encounter, _| Ok(encounter.advance_turn()))
            .await?;

        debug!(
            campaign_id = %campaign_id,
            round = encounter.round(),
            current = ?current,
            "Advanced turn"
        );
        Ok(encounter)
    }

    #[instrument(skip(self))]
    async fn apply_delta(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
        amount: i32,
    ) -> Result<Encounter> {
        let (encounter, current_hp) = self
            .mutate(campaign_id, move |encounter, _| {
                Ok(encounter.apply_delta(id, amount)?.current_hp)
            })
            .await?;

        debug!(combatant_id = %id, amount, current_hp, "Applied HP change");
        Ok(encounter)
    }

    #[instrument(skip(self))]
    async fn set_hp(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
        target: HpTarget,
    ) -> Result<Encounter> {
        let (encounter, current_hp) = self
            .mutate(campaign_id, move |encounter, _| {
                let value = match target {
                    HpTarget::Value(value) => value,
                    HpTarget::Shortcut(shortcut) => {
                        let combatant = encounter
                            .find(id)
                            .ok_or(EncounterError::CombatantNotFound(id))?;
                        shortcut.value_for(combatant.max_hp)
                    }
                };
                Ok(encounter.set_hp(id, value)?.current_hp)
            })
            .await?;

        debug!(combatant_id = %id, current_hp, "Set HP");
        Ok(encounter)
    }

    #[instrument(skip(self))]
    async fn set_temporary_hp(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
        value: i32,
    ) -> Result<Encounter> {
        let (encounter, _) = self
            .mutate(campaign_id, move |encounter, _| {
                encounter.set_temporary_hp(id, value)?;
                Ok(())
            })
            .await?;
        Ok(encounter)
    }

    #[instrument(skip(self))]
    async fn add_condition(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
        condition: Condition,
    ) -> Result<Encounter> {
        let (encounter, _) = self
            .mutate(campaign_id, move |encounter, _| {
                encounter.add_condition(id, condition)?;
                Ok(())
            })
            .await?;

        debug!(combatant_id = %id, condition = %condition, "Added condition");
        Ok(encounter)
    }

    #[instrument(skip(self))]
    async fn remove_condition(
        &self,
        campaign_id: CampaignId,
        id: CombatantId,
        condition: Condition,
    ) -> Result<Encounter> {
        let (encounter, _) = self
            .mutate(campaign_id, move |encounter, _| {
                encounter.remove_condition(id, condition)?;
                Ok(())
            })
            .await?;

        debug!(combatant_id = %id, condition = %condition, "Removed condition");
        Ok(encounter)
    }

    #[instrument(skip(self, combatants), fields(count = combatants.len()))]
    async fn import_combatants(
        &self,
        campaign_id: CampaignId,
        combatants: Vec<Combatant>,
    ) -> Result<Encounter> {
        let (encounter, count) = self
            .mutate(campaign_id, move |encounter, _| {
                let count = combatants.len();
                for mut combatant in combatants {
                    combatant.id = CombatantId::new();
                    encounter.add_combatant(combatant);
                }
                Ok(count)
            })
            .await?;

        info!(campaign_id = %campaign_id, count, "Imported combatants");
        Ok(encounter)
    }

    #[instrument(skip(self))]
    async fn linked_roster(
        &self,
        campaign_id: CampaignId,
    ) -> Result<(Encounter, Vec<LinkedCombatant>)> {
        let encounter = self.load_required(campaign_id).await?;
        let templates = self.load_templates().await?;

        let roster = encounter
            .combatants()
            .iter()
            .filter_map(|combatant| match combatant.template_id {
                None => Some(LinkedCombatant {
                    combatant: combatant.clone(),
                    template: None,
                }),
                Some(template_id) => templates
                    .iter()
                    .find(|t| t.id == template_id)
                    .map(|template| LinkedCombatant {
                        combatant: combatant.clone(),
                        template: Some(template.clone()),
                    }),
            })
            .collect();
        Ok((encounter, roster))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::CreateCharacterRequestDto;
    use crate::application::services::{DirectoryService, DirectoryServiceImpl};
    use crate::domain::entities::CharacterCategory;
    use crate::domain::services::HealthStatus;
    use crate::infrastructure::persistence::InMemoryKeyValueStore;

    struct Fixture {
        directory: DirectoryServiceImpl,
        encounters: EncounterServiceImpl,
        store: Arc<dyn KeyValueStorePort>,
        write_lock: Arc<Mutex<()>>,
        campaign_id: CampaignId,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn KeyValueStorePort> = Arc::new(InMemoryKeyValueStore::new());
        let write_lock = Arc::new(Mutex::new(()));
        let directory = DirectoryServiceImpl::new(
            store.clone(),
            StorageKeys::default(),
            TrackerSettings::default(),
        )
        .with_write_lock(write_lock.clone());
        let encounters = EncounterServiceImpl::with_rng(
            store.clone(),
            StorageKeys::default(),
            TrackerSettings::default(),
            StdRng::seed_from_u64(7),
        )
        .with_write_lock(write_lock.clone());
        let campaign_id = directory.create_campaign("Tomb").await.unwrap().id;
        Fixture {
            directory,
            encounters,
            store,
            write_lock,
            campaign_id,
        }
    }

    fn custom(name: &str, max_hp: i32, initiative: i32) -> AddCombatantRequestDto {
        AddCombatantRequestDto {
            name: Some(name.to_string()),
            max_hp: Some(max_hp),
            initiative: Some(initiative),
            ..Default::default()
        }
    }

    fn is_not_found(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<ServiceError>(), Some(ServiceError::NotFound(_)))
            || err.downcast_ref::<EncounterError>().is_some()
    }

    #[tokio::test]
    async fn test_operations_without_encounter_are_not_found() {
        let f = fixture().await;
        let err = f.encounters.advance_turn(f.campaign_id).await.unwrap_err();
        assert!(is_not_found(&err));
        let err = f.encounters.get(f.campaign_id).await.unwrap_err();
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn test_start_requires_existing_campaign() {
        let f = fixture().await;
        let err = f.encounters.start(CampaignId::new(), None).await.unwrap_err();
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn test_start_uses_default_floor() {
        let f = fixture().await;
        let encounter = f.encounters.start(f.campaign_id, None).await.unwrap();
        assert_eq!(encounter.hp_floor(), HpFloor::NegativeMax);
        assert_eq!(encounter.round(), 1);
        assert!(encounter.combatants().is_empty());
    }

    #[tokio::test]
    async fn test_turn_cycle_persists_across_calls() {
        let f = fixture().await;
        f.encounters.start(f.campaign_id, None).await.unwrap();
        let (_, first) = f
            .encounters
            .add_combatant(f.campaign_id, custom("A", 10, 15))
            .await
            .unwrap();
        f.encounters
            .add_combatant(f.campaign_id, custom("B", 10, 15))
            .await
            .unwrap();
        f.encounters
            .add_combatant(f.campaign_id, custom("C", 10, 8))
            .await
            .unwrap();

        for _ in 0..3 {
            f.encounters.advance_turn(f.campaign_id).await.unwrap();
        }

        let encounter = f.encounters.get(f.campaign_id).await.unwrap();
        let names: Vec<&str> = encounter.combatants().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(encounter.current_turn(), Some(first));
        assert_eq!(encounter.round(), 2);
    }

    #[tokio::test]
    async fn test_custom_combatant_needs_a_name() {
        let f = fixture().await;
        f.encounters.start(f.campaign_id, None).await.unwrap();
        let err = f
            .encounters
            .add_combatant(f.campaign_id, AddCombatantRequestDto::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_custom_combatant_defaults_and_rolled_initiative() {
        let f = fixture().await;
        f.encounters.start(f.campaign_id, None).await.unwrap();
        let (encounter, id) = f
            .encounters
            .add_combatant(
                f.campaign_id,
                AddCombatantRequestDto {
                    name: Some("Wolf".to_string()),
                    dexterity_modifier: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let wolf = encounter.find(id).unwrap();
        assert_eq!(wolf.max_hp, 10);
        assert_eq!(wolf.armor_class, 10);
        assert!((3..=22).contains(&wolf.initiative));
    }

    #[tokio::test]
    async fn test_template_combatant_is_a_snapshot() {
        let f = fixture().await;
        let template = f
            .directory
            .create_character(CreateCharacterRequestDto {
                name: "Ogre".to_string(),
                category: Some("monster".to_string()),
                max_hp: Some(59),
                armor_class: Some(11),
                dexterity_modifier: Some(-1),
                ..Default::default()
            })
            .await
            .unwrap();
        f.encounters.start(f.campaign_id, None).await.unwrap();

        let (encounter, id) = f
            .encounters
            .add_combatant(
                f.campaign_id,
                AddCombatantRequestDto {
                    template_id: Some(template.id.to_string()),
                    initiative: Some(9),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let ogre = encounter.find(id).unwrap();
        assert_eq!(ogre.template_id, Some(template.id));
        assert_eq!(ogre.current_hp, 59);
        assert_eq!(ogre.initiative, 9);
        assert_eq!(ogre.category, CharacterCategory::Monster);

        f.directory
            .update_character(
                template.id,
                crate::application::dto::UpdateCharacterRequestDto {
                    max_hp: Some(100),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let encounter = f.encounters.get(f.campaign_id).await.unwrap();
        assert_eq!(encounter.find(id).unwrap().max_hp, 59);
    }

    #[tokio::test]
    async fn test_unknown_template_is_not_found() {
        let f = fixture().await;
        f.encounters.start(f.campaign_id, None).await.unwrap();
        let err = f
            .encounters
            .add_combatant(
                f.campaign_id,
                AddCombatantRequestDto {
                    template_id: Some(CharacterId::new().to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn test_overkill_and_heal_under_negative_floor() {
        let f = fixture().await;
        f.encounters
            .start(f.campaign_id, Some(HpFloor::NegativeMax))
            .await
            .unwrap();
        let (_, id) = f
            .encounters
            .add_combatant(f.campaign_id, custom("Knight", 20, 10))
            .await
            .unwrap();

        let encounter = f.encounters.apply_delta(f.campaign_id, id, -45).await.unwrap();
        let knight = encounter.find(id).unwrap();
        assert_eq!(knight.current_hp, -20);
        assert_eq!(encounter.status_of(knight), HealthStatus::Dead);

        let encounter = f.encounters.apply_delta(f.campaign_id, id, 5).await.unwrap();
        let knight = encounter.find(id).unwrap();
        assert_eq!(knight.current_hp, -15);
        assert_eq!(encounter.status_of(knight), HealthStatus::Unconscious);
    }

    #[tokio::test]
    async fn test_set_hp_shortcut_and_value() {
        let f = fixture().await;
        f.encounters.start(f.campaign_id, Some(HpFloor::Zero)).await.unwrap();
        let (_, id) = f
            .encounters
            .add_combatant(f.campaign_id, custom("Cleric", 21, 10))
            .await
            .unwrap();

        let encounter = f
            .encounters
            .set_hp(f.campaign_id, id, HpTarget::Shortcut(HpShortcut::Half))
            .await
            .unwrap();
        assert_eq!(encounter.find(id).unwrap().current_hp, 10);

        let encounter = f
            .encounters
            .set_hp(f.campaign_id, id, HpTarget::Value(-7))
            .await
            .unwrap();
        assert_eq!(encounter.find(id).unwrap().current_hp, 0);
    }

    #[tokio::test]
    async fn test_exhaustion_six_pins_hp_through_healing() {
        let f = fixture().await;
        f.encounters.start(f.campaign_id, None).await.unwrap();
        let (_, id) = f
            .encounters
            .add_combatant(f.campaign_id, custom("Ranger", 12, 10))
            .await
            .unwrap();

        f.encounters
            .add_condition(f.campaign_id, id, Condition::Exhaustion(6))
            .await
            .unwrap();
        let encounter = f.encounters.apply_delta(f.campaign_id, id, 50).await.unwrap();
        let ranger = encounter.find(id).unwrap();
        assert_eq!(ranger.current_hp, -12);
        assert_eq!(encounter.status_of(ranger), HealthStatus::Dead);

        let encounter = f
            .encounters
            .remove_condition(f.campaign_id, id, Condition::Exhaustion(6))
            .await
            .unwrap();
        assert!(encounter.find(id).unwrap().conditions.is_empty());
    }

    #[tokio::test]
    async fn test_missing_combatant_is_not_found() {
        let f = fixture().await;
        f.encounters.start(f.campaign_id, None).await.unwrap();
        let err = f
            .encounters
            .apply_delta(f.campaign_id, CombatantId::new(), -3)
            .await
            .unwrap_err();
        assert!(is_not_found(&err));
    }

    #[tokio::test]
    async fn test_import_gives_fresh_ids_in_initiative_order() {
        let f = fixture().await;
        f.encounters.start(f.campaign_id, None).await.unwrap();
        let low = Combatant::new("Low", CharacterCategory::Npc, 5, 3);
        let high = Combatant::new("High", CharacterCategory::Npc, 5, 18);

        let encounter = f
            .encounters
            .import_combatants(f.campaign_id, vec![low.clone(), high.clone()])
            .await
            .unwrap();

        let names: Vec<&str> = encounter.combatants().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["High", "Low"]);
        assert!(encounter
            .combatants()
            .iter()
            .all(|c| c.id != low.id && c.id != high.id));
    }

    #[tokio::test]
    async fn test_linked_roster_skips_deleted_templates() {
        let f = fixture().await;
        let template = f
            .directory
            .create_character(CreateCharacterRequestDto {
                name: "Zombie".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        f.encounters.start(f.campaign_id, None).await.unwrap();
        f.encounters
            .add_combatant(
                f.campaign_id,
                AddCombatantRequestDto {
                    template_id: Some(template.id.to_string()),
                    initiative: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        f.encounters
            .add_combatant(f.campaign_id, custom("Hero", 10, 12))
            .await
            .unwrap();

        assert_eq!(f.encounters.linked_roster(f.campaign_id).await.unwrap().1.len(), 2);

        f.directory.delete_character(template.id).await.unwrap();
        let (encounter, roster) = f.encounters.linked_roster(f.campaign_id).await.unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].combatant.name, "Hero");
        assert_eq!(encounter.combatants().len(), 2);
    }

    #[tokio::test]
    async fn test_end_clears_record() {
        let f = fixture().await;
        f.encounters.start(f.campaign_id, None).await.unwrap();
        f.encounters.end(f.campaign_id).await.unwrap();
        assert!(f.encounters.get(f.campaign_id).await.is_err());
        assert!(f.encounters.end(f.campaign_id).await.is_err());
    }

    #[tokio::test]
    async fn test_patch_with_zero_stats_uses_defaults() {
        let f = fixture().await;
        f.encounters.start(f.campaign_id, None).await.unwrap();
        let (_, id) = f
            .encounters
            .add_combatant(f.campaign_id, custom("Ogre", 59, 8))
            .await
            .unwrap();

        let encounter = f
            .encounters
            .update_combatant(
                f.campaign_id,
                id,
                CombatantPatch {
                    max_hp: Some(0),
                    armor_class: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let ogre = encounter.find(id).unwrap();
        assert_eq!(ogre.max_hp, 10);
        assert_eq!(ogre.armor_class, 10);
    }

    #[tokio::test]
    async fn test_campaign_delete_waits_for_encounter_writes() {
        let f = fixture().await;
        f.encounters.start(f.campaign_id, None).await.unwrap();
        let battle_key = StorageKeys::default().battle(f.campaign_id);

        let guard = f.write_lock.lock().await;
        let directory = Arc::new(f.directory);
        let delete = tokio::spawn({
            let directory = directory.clone();
            let campaign_id = f.campaign_id;
            async move { directory.delete_campaign(campaign_id).await }
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!delete.is_finished());
        assert!(f.store.get(&battle_key).await.unwrap().is_some());

        drop(guard);
        delete.await.unwrap().unwrap();
        assert_eq!(f.store.get(&battle_key).await.unwrap(), None);
        let err = f.encounters.start(f.campaign_id, None).await.unwrap_err();
        assert!(is_not_found(&err));
    }
}
