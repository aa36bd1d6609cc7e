//! Condition catalog
//!
//! The fixed set of status-effect tags a combatant can carry. Tags are
//! serialized by their display names so stored encounters stay readable.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A status effect drawn from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Condition {
    Blinded,
    Charmed,
    Deafened,
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,
    /// Exhaustion levels 1..=6 only; build it through `Condition::exhaustion`
    Exhaustion(u8),
}

impl Condition {
    /// Highest exhaustion level; carrying it means death
    pub const MAX_EXHAUSTION: u8 = 6;

    /// The maximal-fatigue tag
    pub const MAXIMAL_FATIGUE: Condition = Condition::Exhaustion(Self::MAX_EXHAUSTION);

    /// Exhaustion at `level`, or `None` outside 1..=6
    pub fn exhaustion(level: u8) -> Option<Condition> {
        (1..=Self::MAX_EXHAUSTION)
            .contains(&level)
            .then_some(Condition::Exhaustion(level))
    }

    /// Every tag in the catalog, in display order
    pub fn catalog() -> Vec<Condition> {
        let mut all = vec![
            Condition::Blinded,
            Condition::Charmed,
            Condition::Deafened,
            Condition::Frightened,
            Condition::Grappled,
            Condition::Incapacitated,
            Condition::Invisible,
            Condition::Paralyzed,
            Condition::Petrified,
            Condition::Poisoned,
            Condition::Prone,
            Condition::Restrained,
            Condition::Stunned,
            Condition::Unconscious,
        ];
        all.extend((1..=Self::MAX_EXHAUSTION).filter_map(Condition::exhaustion));
        all
    }

    pub fn is_maximal_fatigue(&self) -> bool {
        *self == Self::MAXIMAL_FATIGUE
    }

    pub fn name(&self) -> String {
        match self {
            Condition::Exhaustion(level) => format!("Exhaustion {}", level),
            other => format!("{:?}", other),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown condition: {0}")]
pub struct UnknownCondition(pub String);

impl std::str::FromStr for Condition {
    type Err = UnknownCondition;

    /// Case-insensitive; accepts "Exhaustion 3", "exhaustion-3" and "exhaustion3"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        if let Some(level) = normalized.strip_prefix("exhaustion") {
            return level
                .parse::<u8>()
                .ok()
                .and_then(Condition::exhaustion)
                .ok_or_else(|| UnknownCondition(s.to_string()));
        }

        Condition::catalog()
            .into_iter()
            .find(|c| c.name().to_ascii_lowercase() == normalized)
            .ok_or_else(|| UnknownCondition(s.to_string()))
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
