//! Players, unit templates, and unit identities

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// PLAYERS
// ============================================================================

/// One of the two sides of a match
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Player {
    One = 0,
    Two = 1,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::One, Player::Two];

    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player 1"),
            Player::Two => write!(f, "player 2"),
        }
    }
}

// ============================================================================
// UNIT TEMPLATES
// ============================================================================

/// Identifier of an ability in the catalog (e.g. `00002-defensive-stance`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityId(pub String);

impl AbilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AbilityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base statistics of a unit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stats {
    pub health: i32,
    pub reach: i32,
    pub move_range: i32,
    pub power: i32,
}

impl Stats {
    pub const fn new(health: i32, reach: i32, move_range: i32, power: i32) -> Self {
        Self { health, reach, move_range, power }
    }
}

/// Immutable unit template produced by the squad generator
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub stats: Stats,
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
}

impl Unit {
    pub fn new(stats: Stats) -> Self {
        Self { stats, abilities: Vec::new() }
    }

    pub fn with_ability(mut self, id: impl Into<AbilityId>) -> Self {
        self.abilities.push(id.into());
        self
    }

    pub fn has_ability(&self, id: &str) -> bool {
        self.abilities.iter().any(|a| a.as_str() == id)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.stats;
        write!(
            f,
            "hp {} reach {} move {} power {}",
            s.health, s.reach, s.move_range, s.power
        )?;
        if !self.abilities.is_empty() {
            let names: Vec<&str> = self.abilities.iter().map(AbilityId::as_str).collect();
            write!(f, " [{}]", names.join(", "))?;
        }
        Ok(())
    }
}

// ============================================================================
// MATCH UNITS
// ============================================================================

/// Dense unit identifier, unique within one match
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u16);

impl UnitId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A unit template bound to an id and an owner for the duration of a match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerUnit {
    pub id: UnitId,
    pub owner: Player,
    pub unit: Unit,
}

impl PlayerUnit {
    pub fn stats(&self) -> Stats {
        self.unit.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent().index(), 0);
    }

    #[test]
    fn test_unit_abilities() {
        let unit = Unit::new(Stats::new(3, 1, 2, 1)).with_ability("00000-charge");
        assert!(unit.has_ability("00000-charge"));
        assert!(!unit.has_ability("00002-defensive-stance"));
        assert_eq!(unit.to_string(), "hp 3 reach 1 move 2 power 1 [00000-charge]");
    }
}
