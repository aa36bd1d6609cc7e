//! Initiative rolls

use rand::Rng;

use crate::domain::value_objects::roll_d20;

/// One d20 draw plus the dexterity modifier
pub fn roll_initiative<R: Rng + ?Sized>(rng: &mut R, dexterity_modifier: i32) -> i32 {
    roll_d20(rng).saturating_add(dexterity_modifier)
}

/// Use a manual initiative verbatim, or roll one when none was given
pub fn resolve_initiative<R: Rng + ?Sized>(
    rng: &mut R,
    manual: Option<i32>,
    dexterity_modifier: i32,
) -> i32 {
    match manual {
        Some(value) => value,
        None => roll_initiative(rng, dexterity_modifier),
    }
}
