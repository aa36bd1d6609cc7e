//! Directory Service - Campaigns and reusable character templates
//!
//! Templates are read as snapshots when a combatant is created; editing a
//! template afterwards never reaches combatants already in a fight.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::application::dto::lenient::nonzero_or;
use crate::application::dto::{
    parse_category, parse_level, CreateCharacterRequestDto, UpdateCharacterRequestDto,
};
use crate::application::ports::outbound::KeyValueStorePort;
use crate::application::services::records::{self, StorageKeys};
use crate::application::services::ServiceError;
use crate::domain::entities::{Campaign, CharacterTemplate};
use crate::domain::value_objects::{CampaignId, CharacterId, TrackerSettings};

/// Directory service trait defining the application use cases
#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn list_characters(&self) -> Result<Vec<CharacterTemplate>>;

    async fn get_character(&self, id: CharacterId) -> Result<Option<CharacterTemplate>>;

    /// Create a template; blank or junk numbers fall back to tracker defaults
    async fn create_character(&self, request: CreateCharacterRequestDto)
        -> Result<CharacterTemplate>;

    async fn update_character(
        &self,
        id: CharacterId,
        request: UpdateCharacterRequestDto,
    ) -> Result<CharacterTemplate>;

    async fn delete_character(&self, id: CharacterId) -> Result<()>;

    /// Append templates under fresh ids; returns the stored copies
    async fn import_characters(
        &self,
        templates: Vec<CharacterTemplate>,
    ) -> Result<Vec<CharacterTemplate>>;

    async fn list_campaigns(&self) -> Result<Vec<Campaign>>;

    async fn get_campaign(&self, id: CampaignId) -> Result<Option<Campaign>>;

    async fn create_campaign(&self, name: &str) -> Result<Campaign>;

    /// Delete a campaign together with its encounter record
    async fn delete_campaign(&self, id: CampaignId) -> Result<()>;
}

/// Default implementation of DirectoryService over the key-value store
pub struct DirectoryServiceImpl {
    store: Arc<dyn KeyValueStorePort>,
    keys: StorageKeys,
    settings: TrackerSettings,
    write_lock: Arc<Mutex<()>>,
}

impl DirectoryServiceImpl {
    pub fn new(
        store: Arc<dyn KeyValueStorePort>,
        keys: StorageKeys,
        settings: TrackerSettings,
    ) -> Self {
        Self {
            store,
            keys,
            settings,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Serialize writes with another service over the same store
    ///
    /// Deleting a campaign removes its encounter record, so the directory and
    /// the encounter service must share one lock.
    pub fn with_write_lock(mut self, write_lock: Arc<Mutex<()>>) -> Self {
        self.write_lock = write_lock;
        self
    }

    fn validate_name(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Name cannot be empty").into());
        }
        if name.chars().count() > self.settings.max_name_length {
            return Err(ServiceError::validation(format!(
                "Name cannot exceed {} characters",
                self.settings.max_name_length
            ))
            .into());
        }
        Ok(name.to_string())
    }

    async fn load_characters(&self) -> Result<Vec<CharacterTemplate>> {
        records::load_list(self.store.as_ref(), &self.keys.characters())
            .await
            .context("Failed to load characters")
    }

    async fn save_characters(&self, characters: &[CharacterTemplate]) -> Result<()> {
        records::save(self.store.as_ref(), &self.keys.characters(), characters)
            .await
            .context("Failed to save characters")
    }

    async fn load_campaigns(&self) -> Result<Vec<Campaign>> {
        records::load_list(self.store.as_ref(), &self.keys.campaigns())
            .await
            .context("Failed to load campaigns")
    }

    async fn save_campaigns(&self, campaigns: &[Campaign]) -> Result<()> {
        records::save(self.store.as_ref(), &self.keys.campaigns(), campaigns)
            .await
            .context("Failed to save campaigns")
    }
}

#[async_trait]
impl DirectoryService for DirectoryServiceImpl {
    #[instrument(skip(self))]
    async fn list_characters(&self) -> Result<Vec<CharacterTemplate>> {
        let characters = self.load_characters().await?;
        debug!(count = characters.len(), "Listed characters");
        Ok(characters)
    }

    #[instrument(skip(self))]
    async fn get_character(&self, id: CharacterId) -> Result<Option<CharacterTemplate>> {
        Ok(self.load_characters().await?.into_iter().find(|c| c.id == id))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create_character(
        &self,
        request: CreateCharacterRequestDto,
    ) -> Result<CharacterTemplate> {
        let name = self.validate_name(&request.name)?;
        let category = parse_category(request.category.as_deref());
        let max_hp = nonzero_or(request.max_hp, self.settings.default_max_hp);

        let mut template = CharacterTemplate::new(name, category, max_hp)
            .with_armor_class(nonzero_or(
                request.armor_class,
                self.settings.default_armor_class,
            ))
            .with_dexterity_modifier(
                request
                    .dexterity_modifier
                    .unwrap_or(self.settings.default_dexterity_modifier),
            )
            .with_notes(request.notes);
        if let Some(level) = parse_level(request.level) {
            template = template.with_level(level);
        }
        if let Some(sheet) = request.sheet {
            template = template.with_sheet(sheet);
        }

        let _guard = self.write_lock.lock().await;
        let mut characters = self.load_characters().await?;
        characters.push(template.clone());
        self.save_characters(&characters).await?;

        info!(character_id = %template.id, "Created character template: {}", template.name);
        Ok(template)
    }

    #[instrument(skip(self, request))]
    async fn update_character(
        &self,
        id: CharacterId,
        request: UpdateCharacterRequestDto,
    ) -> Result<CharacterTemplate> {
        let name = request
            .name
            .as_deref()
            .map(|name| self.validate_name(name))
            .transpose()?;

        let _guard = self.write_lock.lock().await;
        let mut characters = self.load_characters().await?;
        let template = characters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ServiceError::not_found(format!("Character {}", id)))?;

        if let Some(name) = name {
            template.name = name;
        }
        if request.category.is_some() {
            template.category = parse_category(request.category.as_deref());
        }
        if let Some(max_hp) = request.max_hp {
            template.set_max_hp(nonzero_or(Some(max_hp), self.settings.default_max_hp));
        }
        if let Some(armor_class) = request.armor_class {
            template.armor_class = nonzero_or(Some(armor_class), self.settings.default_armor_class);
        }
        if let Some(modifier) = request.dexterity_modifier {
            template.dexterity_modifier = modifier;
        }
        if request.level.is_some() {
            template.level = parse_level(request.level);
        }
        if let Some(notes) = request.notes {
            template.notes = notes;
        }
        if let Some(sheet) = request.sheet {
            template.sheet = Some(sheet);
        }

        let updated = template.clone();
        self.save_characters(&characters).await?;

        info!(character_id = %id, "Updated character template");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_character(&self, id: CharacterId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut characters = self.load_characters().await?;
        let before = characters.len();
        characters.retain(|c| c.id != id);
        if characters.len() == before {
            return Err(ServiceError::not_found(format!("Character {}", id)).into());
        }
        self.save_characters(&characters).await?;

        info!(character_id = %id, "Deleted character template");
        Ok(())
    }

    #[instrument(skip(self, templates), fields(count = templates.len()))]
    async fn import_characters(
        &self,
        templates: Vec<CharacterTemplate>,
    ) -> Result<Vec<CharacterTemplate>> {
        let imported: Vec<CharacterTemplate> = templates
            .into_iter()
            .map(|mut template| {
                template.id = CharacterId::new();
                template.set_max_hp(template.max_hp);
                template
            })
            .collect();

        let _guard = self.write_lock.lock().await;
        let mut characters = self.load_characters().await?;
        characters.extend(imported.iter().cloned());
        self.save_characters(&characters).await?;

        info!(count = imported.len(), "Imported character templates");
        Ok(imported)
    }

    #[instrument(skip(self))]
    async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        self.load_campaigns().await
    }

    #[instrument(skip(self))]
    async fn get_campaign(&self, id: CampaignId) -> Result<Option<Campaign>> {
        Ok(self.load_campaigns().await?.into_iter().find(|c| c.id == id))
    }

    #[instrument(skip(self))]
    async fn create_campaign(&self, name: &str) -> Result<Campaign> {
        let campaign = Campaign::new(self.validate_name(name)?);

        let _guard = self.write_lock.lock().await;
        let mut campaigns = self.load_campaigns().await?;
        campaigns.push(campaign.clone());
        self.save_campaigns(&campaigns).await?;

        info!(campaign_id = %campaign.id, "Created campaign: {}", campaign.name);
        Ok(campaign)
    }

    #[instrument(skip(self))]
    async fn delete_campaign(&self, id: CampaignId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut campaigns = self.load_campaigns().await?;
        let before = campaigns.len();
        campaigns.retain(|c| c.id != id);
        if campaigns.len() == before {
            return Err(ServiceError::not_found(format!("Campaign {}", id)).into());
        }
        self.save_campaigns(&campaigns).await?;
        self.store
            .remove(&self.keys.battle(id))
            .await
            .context("Failed to remove encounter record")?;

        info!(campaign_id = %id, "Deleted campaign");
        Ok(())
    }
}
