//! Encounter Aggregate - The roster, turn order and round of one fight
//!
//! All combatant mutations go through this aggregate root so that the
//! initiative ordering, the turn pointer and the per-combatant HP and
//! condition invariants stay consistent with each other.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{CharacterTemplate, Combatant, CombatantPatch};
use crate::domain::services::{condition_registry, health_ledger, initiative, HealthStatus};
use crate::domain::value_objects::{CampaignId, CombatantId, Condition, HpFloor};

/// The Encounter Aggregate Root
///
/// Serialized as the per-campaign battle record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    campaign_id: CampaignId,
    is_active: bool,
    #[serde(default)]
    hp_floor: HpFloor,
    /// Descending initiative; ties keep insertion order
    combatants: Vec<Combatant>,
    round: u32,
    current_turn: Option<CombatantId>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncounterError {
    #[error("Combatant not found: {0}")]
    CombatantNotFound(CombatantId),
}

impl Encounter {
    /// Start a fresh, active encounter at round 1
    pub fn new(campaign_id: CampaignId, hp_floor: HpFloor) -> Self {
        Self {
            campaign_id,
            is_active: true,
            hp_floor,
            combatants: Vec::new(),
            round: 1,
            current_turn: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn hp_floor(&self) -> HpFloor {
        self.hp_floor
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn current_turn(&self) -> Option<CombatantId> {
        self.current_turn
    }

    pub fn find(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn current_combatant(&self) -> Option<&Combatant> {
        self.current_turn.and_then(|id| self.find(id))
    }

    pub fn status_of(&self, combatant: &Combatant) -> HealthStatus {
        health_ledger::classify_status(combatant, self.hp_floor)
    }

    pub fn hp_percentage_of(&self, combatant: &Combatant) -> f64 {
        health_ledger::hp_percentage(combatant, self.hp_floor)
    }

    // ========================================================================
    // Roster
    // ========================================================================

    /// Insert a combatant behind everyone with the same or higher initiative
    ///
    /// The first combatant to join an empty encounter takes the turn.
    pub fn add_combatant(&mut self, mut combatant: Combatant) -> CombatantId {
        condition_registry::enforce_invariants(&mut combatant, self.hp_floor);
        let id = combatant.id;
        let was_empty = self.combatants.is_empty();

        let position = self
            .combatants
            .iter()
            .position(|c| c.initiative < combatant.initiative)
            .unwrap_or(self.combatants.len());
        self.combatants.insert(position, combatant);

        if was_empty && self.current_turn.is_none() {
            self.current_turn = Some(id);
        }
        id
    }

    /// Instantiate a template, rolling initiative unless a manual value is given
    pub fn add_from_template<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        template: &CharacterTemplate,
        manual_initiative: Option<i32>,
    ) -> CombatantId {
        let value =
            initiative::resolve_initiative(rng, manual_initiative, template.dexterity_modifier);
        self.add_combatant(Combatant::from_template(template, value))
    }

    /// Remove a combatant; clears the turn pointer if it was acting
    pub fn remove_combatant(&mut self, id: CombatantId) -> Option<Combatant> {
        let index = self.combatants.iter().position(|c| c.id == id)?;
        if self.current_turn == Some(id) {
            self.current_turn = None;
        }
        Some(self.combatants.remove(index))
    }

    /// Merge a patch into a combatant; returns false when the id is unknown
    ///
    /// A changed initiative re-seats the combatant as if newly inserted.
    pub fn update_combatant(&mut self, id: CombatantId, patch: CombatantPatch) -> bool {
        let Some(index) = self.combatants.iter().position(|c| c.id == id) else {
            return false;
        };

        let initiative_before = self.combatants[index].initiative;
        let floor = self.hp_floor;
        let combatant = &mut self.combatants[index];
        combatant.apply_patch(patch);
        condition_registry::enforce_invariants(combatant, floor);

        if combatant.initiative != initiative_before {
            let moved = self.combatants.remove(index);
            let position = self
                .combatants
                .iter()
                .position(|c| c.initiative < moved.initiative)
                .unwrap_or(self.combatants.len());
            self.combatants.insert(position, moved);
        }
        true
    }

    // ========================================================================
    // Turn order
    // ========================================================================

    /// Pass the turn to the next combatant, bumping the round on wrap-around
    ///
    /// With no acting combatant the turn goes to the head of the list and
    /// the round is left alone.
    pub fn advance_turn(&mut self) -> Option<CombatantId> {
        if self.combatants.is_empty() {
            return None;
        }

        let current_index = self
            .current_turn
            .and_then(|id| self.combatants.iter().position(|c| c.id == id));

        let next_index = match current_index {
            Some(index) => {
                let next = (index + 1) % self.combatants.len();
                if next == 0 {
                    self.round = self.round.saturating_add(1);
                }
                next
            }
            None => 0,
        };

        let next_id = self.combatants[next_index].id;
        self.current_turn = Some(next_id);
        Some(next_id)
    }

    // ========================================================================
    // Health and conditions
    // ========================================================================

    fn combatant_mut(&mut self, id: CombatantId) -> Result<&mut Combatant, EncounterError> {
        self.combatants
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(EncounterError::CombatantNotFound(id))
    }

    pub fn apply_delta(&mut self, id: CombatantId, amount: i32) -> Result<&Combatant, EncounterError> {
        let floor = self.hp_floor;
        let combatant = self.combatant_mut(id)?;
        health_ledger::apply_delta(combatant, amount, floor);
        Ok(&*combatant)
    }

    pub fn set_hp(&mut self, id: CombatantId, value: i32) -> Result<&Combatant, EncounterError> {
        let floor = self.hp_floor;
        let combatant = self.combatant_mut(id)?;
        health_ledger::set_absolute(combatant, value, floor);
        Ok(&*combatant)
    }

    pub fn set_temporary_hp(
        &mut self,
        id: CombatantId,
        value: i32,
    ) -> Result<&Combatant, EncounterError> {
        let combatant = self.combatant_mut(id)?;
        health_ledger::set_temporary_hp(combatant, value);
        Ok(&*combatant)
    }

    pub fn add_condition(
        &mut self,
        id: CombatantId,
        condition: Condition,
    ) -> Result<&Combatant, EncounterError> {
        let floor = self.hp_floor;
        let combatant = self.combatant_mut(id)?;
        condition_registry::add_condition(combatant, condition, floor);
        Ok(&*combatant)
    }

    pub fn remove_condition(
        &mut self,
        id: CombatantId,
        condition: Condition,
    ) -> Result<&Combatant, EncounterError> {
        let combatant = self.combatant_mut(id)?;
        condition_registry::remove_condition(combatant, condition);
        Ok(&*combatant)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Repair a record read back from storage
    ///
    /// Stored HP and condition tags can drift apart if only one was edited,
    /// so every combatant is re-normalized, the roster is re-sorted (stable)
    /// and a dangling turn pointer is dropped.
    pub fn normalize(&mut self) {
        let floor = self.hp_floor;
        for combatant in &mut self.combatants {
            condition_registry::enforce_invariants(combatant, floor);
        }
        self.combatants
            .sort_by(|a, b| b.initiative.cmp(&a.initiative));
        if let Some(id) = self.current_turn {
            if self.find(id).is_none() {
                self.current_turn = None;
            }
        }
        self.round = self.round.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CharacterCategory;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn encounter() -> Encounter {
        Encounter::new(CampaignId::new(), HpFloor::NegativeMax)
    }

    fn combatant(name: &str, initiative: i32) -> Combatant {
        Combatant::new(name, CharacterCategory::Monster, 10, initiative)
    }

    fn names(encounter: &Encounter) -> Vec<&str> {
        encounter.combatants().iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut e = encounter();
        let first = e.add_combatant(combatant("first", 15));
        e.add_combatant(combatant("second", 15));
        e.add_combatant(combatant("third", 8));

        assert_eq!(names(&e), vec!["first", "second", "third"]);
        assert_eq!(e.current_turn(), Some(first));

        e.advance_turn();
        e.advance_turn();
        assert_eq!(e.round(), 1);
        e.advance_turn();
        assert_eq!(e.current_turn(), Some(first));
        assert_eq!(e.round(), 2);
    }

    #[test]
    fn test_list_stays_sorted_after_many_inserts() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut e = encounter();
        for i in 0..40 {
            let value = rng.gen_range(-5..25);
            e.add_combatant(combatant(&format!("c{}", i), value));
        }

        let list = e.combatants();
        for pair in list.windows(2) {
            assert!(pair[0].initiative >= pair[1].initiative);
            if pair[0].initiative == pair[1].initiative {
                let a: usize = pair[0].name[1..].parse().expect("index");
                let b: usize = pair[1].name[1..].parse().expect("index");
                assert!(a < b, "tie order broken: {} before {}", a, b);
            }
        }
    }

    #[test]
    fn test_full_cycle_returns_to_start_and_bumps_round_once() {
        let mut e = encounter();
        for (name, init) in [("a", 20), ("b", 12), ("c", 12), ("d", 3), ("e", -1)] {
            e.add_combatant(combatant(name, init));
        }
        e.advance_turn();
        e.advance_turn();
        let start = e.current_turn();
        let round = e.round();

        for _ in 0..e.combatants().len() {
            e.advance_turn();
        }

        assert_eq!(e.current_turn(), start);
        assert_eq!(e.round(), round + 1);
    }

    #[test]
    fn test_advance_on_empty_is_noop() {
        let mut e = encounter();
        assert_eq!(e.advance_turn(), None);
        assert_eq!(e.round(), 1);
        assert_eq!(e.current_turn(), None);
    }

    #[test]
    fn test_removing_active_clears_pointer_and_advance_restores_it() {
        let mut e = encounter();
        let a = e.add_combatant(combatant("a", 18));
        let b = e.add_combatant(combatant("b", 10));

        assert!(e.remove_combatant(a).is_some());
        assert_eq!(e.current_turn(), None);

        assert_eq!(e.advance_turn(), Some(b));
        assert_eq!(e.round(), 1);
    }

    #[test]
    fn test_removing_other_keeps_pointer() {
        let mut e = encounter();
        let a = e.add_combatant(combatant("a", 18));
        let b = e.add_combatant(combatant("b", 10));
        e.remove_combatant(b);
        assert_eq!(e.current_turn(), Some(a));
        assert!(e.remove_combatant(b).is_none());
    }

    #[test]
    fn test_add_from_template_rolls_or_uses_manual() {
        let mut rng = StdRng::seed_from_u64(5);
        let template = CharacterTemplate::new("Wolf", CharacterCategory::Monster, 11)
            .with_dexterity_modifier(2);
        let mut e = encounter();

        let manual = e.add_from_template(&mut rng, &template, Some(-2));
        let rolled = e.add_from_template(&mut rng, &template, None);

        assert_eq!(e.find(manual).map(|c| c.initiative), Some(-2));
        let rolled_value = e.find(rolled).map(|c| c.initiative).expect("added");
        assert!((3..=22).contains(&rolled_value));
        assert_ne!(manual, rolled);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut e = encounter();
        e.add_combatant(combatant("a", 5));
        let before = e.clone();
        assert!(!e.update_combatant(CombatantId::new(), CombatantPatch::default()));
        assert_eq!(e, before);
    }

    #[test]
    fn test_update_clamps_and_reseats() {
        let mut e = encounter();
        let a = e.add_combatant(combatant("a", 20));
        e.add_combatant(combatant("b", 10));

        assert!(e.update_combatant(
            a,
            CombatantPatch {
                current_hp: Some(500),
                initiative: Some(10),
                ..Default::default()
            }
        ));

        assert_eq!(names(&e), vec!["b", "a"]);
        assert_eq!(e.find(a).map(|c| c.current_hp), Some(10));
    }

    #[test]
    fn test_health_ops_report_missing_combatant() {
        let mut e = encounter();
        let ghost = CombatantId::new();
        assert_eq!(
            e.apply_delta(ghost, -3).err(),
            Some(EncounterError::CombatantNotFound(ghost))
        );
        assert!(e.add_condition(ghost, Condition::Prone).is_err());
    }

    #[test]
    fn test_fatigue_survives_healing_through_aggregate() {
        let mut e = encounter();
        let a = e.add_combatant(combatant("a", 12));
        e.add_condition(a, Condition::MAXIMAL_FATIGUE).expect("present");
        let c = e.apply_delta(a, 8).expect("present");
        assert_eq!(c.current_hp, -10);
        let c = e.find(a).expect("present");
        assert_eq!(e.status_of(c), HealthStatus::Dead);
    }

    #[test]
    fn test_normalize_repairs_loaded_record() {
        let mut e = encounter();
        let a = e.add_combatant(combatant("a", 12));
        e.add_combatant(combatant("b", 4));

        let mut value = serde_json::to_value(&e).expect("serialization should succeed");
        let roster = value["combatants"].as_array_mut().expect("array");
        roster[0]["conditions"] = serde_json::json!(["Exhaustion 6"]);
        roster[0]["current_hp"] = serde_json::json!(10);
        roster[1]["initiative"] = serde_json::json!(30);
        value["current_turn"] = serde_json::json!(CombatantId::new());
        value["round"] = serde_json::json!(0);

        let mut loaded: Encounter =
            serde_json::from_value(value).expect("deserialization should succeed");
        loaded.normalize();

        assert_eq!(names(&loaded), vec!["b", "a"]);
        assert_eq!(loaded.find(a).map(|c| c.current_hp), Some(-10));
        assert_eq!(loaded.current_turn(), None);
        assert_eq!(loaded.round(), 1);
    }
}
