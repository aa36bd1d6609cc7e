//! Dice rolling
//!
//! Randomness enters the system only here. Callers pass the random source
//! so rolls can be seeded in tests.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Die sizes offered by the roller
pub const DICE_TYPES: [u32; 10] = [2, 3, 4, 6, 8, 10, 12, 20, 30, 100];

/// Upper limit on dice in a single roll
pub const MAX_DICE_PER_ROLL: u32 = 100;

/// One uniform draw from a d20
pub fn roll_d20<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(1..=20)
}

/// The outcome of rolling `count` dice of one size plus a flat modifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub sides: u32,
    pub rolls: Vec<u32>,
    pub modifier: i32,
    pub total: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    #[error("Unsupported die: d{0}")]
    UnsupportedDie(u32),
    #[error("Dice count must be between 1 and {max}, got {count}")]
    InvalidCount { count: u32, max: u32 },
}

impl DiceRoll {
    pub fn roll<R: Rng + ?Sized>(
        rng: &mut R,
        count: u32,
        sides: u32,
        modifier: i32,
    ) -> Result<Self, DiceError> {
        if !DICE_TYPES.contains(&sides) {
            return Err(DiceError::UnsupportedDie(sides));
        }
        if count == 0 || count > MAX_DICE_PER_ROLL {
            return Err(DiceError::InvalidCount {
                count,
                max: MAX_DICE_PER_ROLL,
            });
        }

        let rolls: Vec<u32> = (0..count).map(|_| rng.gen_range(1..=sides)).collect();
        let sum: u32 = rolls.iter().sum();
        Ok(Self {
            sides,
            rolls,
            modifier,
            total: (sum as i32).saturating_add(modifier),
        })
    }
}
