//! Match state: unit registry, board occupancy, and per-unit counters
//!
//! Storage is arena-style. The registry of every unit that started the match
//! is shared behind an `Arc` and never changes; everything that does change
//! (positions, occupancy, counters) lives in small dense arrays indexed by
//! [`UnitId`], so cloning a state costs a handful of small copies rather than
//! rebuilding maps.

use crate::board::{Position, BOARD_SIZE, CELL_COUNT};
use crate::unit::{Player, PlayerUnit, Unit, UnitId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// COUNTERS
// ============================================================================

/// Named per-unit counters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Counter {
    Health,
    RoundAttacks,
    RoundAbilities,
    DefensiveStance,
}

impl Counter {
    pub const ALL: [Counter; 4] = [
        Counter::Health,
        Counter::RoundAttacks,
        Counter::RoundAbilities,
        Counter::DefensiveStance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Counter::Health => "health",
            Counter::RoundAttacks => "round-attacks",
            Counter::RoundAbilities => "round-abilities",
            Counter::DefensiveStance => "defensive-stance",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Counter values of a single unit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters([i32; 4]);

impl Counters {
    pub fn get(&self, counter: Counter) -> i32 {
        self.0[counter.slot()]
    }

    pub fn set(&mut self, counter: Counter, value: i32) {
        self.0[counter.slot()] = value;
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Errors raised while building or validating a state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("position {0} is off the board")]
    OutOfBounds(Position),
    #[error("position {0} is already occupied")]
    Occupied(Position),
    #[error("unit {0} has no health")]
    NoHealth(UnitId),
    #[error("too many units for one match: {0}")]
    TooManyUnits(usize),
    #[error("board and position index disagree for unit {0}")]
    Inconsistent(UnitId),
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state (clone to mutate)
#[derive(Clone)]
pub struct GameState {
    /// Every unit that started the match, indexed by id
    units: Arc<[PlayerUnit]>,

    /// Position index: id -> cell, `None` once removed
    positions: Vec<Option<Position>>,

    /// Board occupancy: cell -> id
    board: [Option<UnitId>; CELL_COUNT],

    /// Counters, indexed by id
    counters: Vec<Counters>,

    current_player: Player,
    actions_left: u8,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Create a state from unit placements. Ids are assigned in input order.
    pub fn new(placements: &[(Player, Unit, Position)]) -> Result<Self, StateError> {
        if placements.len() > u16::MAX as usize {
            return Err(StateError::TooManyUnits(placements.len()));
        }

        let mut units = Vec::with_capacity(placements.len());
        let mut positions = Vec::with_capacity(placements.len());
        let mut counters = Vec::with_capacity(placements.len());
        let mut board = [None; CELL_COUNT];

        for (index, (owner, unit, pos)) in placements.iter().enumerate() {
            let id = UnitId(index as u16);
            if !pos.is_valid() {
                return Err(StateError::OutOfBounds(*pos));
            }
            if board[pos.index()].is_some() {
                return Err(StateError::Occupied(*pos));
            }
            if unit.stats.health <= 0 {
                return Err(StateError::NoHealth(id));
            }

            board[pos.index()] = Some(id);
            positions.push(Some(*pos));
            let mut c = Counters::default();
            c.set(Counter::Health, unit.stats.health);
            counters.push(c);
            units.push(PlayerUnit {
                id,
                owner: *owner,
                unit: unit.clone(),
            });
        }

        Ok(Self {
            units: units.into(),
            positions,
            board,
            counters,
            current_player: Player::One,
            actions_left: 0,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Player whose turn it is
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Actions remaining in the current turn
    pub fn actions_left(&self) -> u8 {
        self.actions_left
    }

    /// Live unit by id
    pub fn unit(&self, id: UnitId) -> Option<&PlayerUnit> {
        self.position(id)?;
        self.units.get(id.index())
    }

    /// Whether the unit is still on the board
    pub fn is_alive(&self, id: UnitId) -> bool {
        self.position(id).is_some()
    }

    /// Live units in id order
    pub fn units(&self) -> impl Iterator<Item = &PlayerUnit> + '_ {
        self.units
            .iter()
            .filter(move |u| self.positions[u.id.index()].is_some())
    }

    /// Live units of one player in id order
    pub fn units_of(&self, player: Player) -> impl Iterator<Item = &PlayerUnit> + '_ {
        self.units().filter(move |u| u.owner == player)
    }

    /// Live enemies of `player` in id order
    pub fn enemies_of(&self, player: Player) -> impl Iterator<Item = &PlayerUnit> + '_ {
        self.units_of(player.opponent())
    }

    /// Number of units the match started with, dead or alive
    pub fn roster_len(&self) -> usize {
        self.units.len()
    }

    /// Cell of a live unit
    pub fn position(&self, id: UnitId) -> Option<Position> {
        self.positions.get(id.index()).copied().flatten()
    }

    /// Id of the unit standing on `pos`
    pub fn occupant(&self, pos: Position) -> Option<UnitId> {
        if !pos.is_valid() {
            return None;
        }
        self.board[pos.index()]
    }

    /// Unit standing on `pos`
    pub fn unit_at(&self, pos: Position) -> Option<&PlayerUnit> {
        self.occupant(pos).and_then(|id| self.units.get(id.index()))
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.occupant(pos).is_some()
    }

    /// Counter value, 0 for removed units or unset counters
    pub fn counter(&self, id: UnitId, counter: Counter) -> i32 {
        self.counters
            .get(id.index())
            .map_or(0, |c| c.get(counter))
    }

    /// Current health of a unit (0 once removed)
    pub fn health(&self, id: UnitId) -> i32 {
        if self.is_alive(id) {
            self.counter(id, Counter::Health)
        } else {
            0
        }
    }

    /// Sum of health over a player's live units
    pub fn total_health(&self, player: Player) -> i32 {
        self.units_of(player).map(|u| self.health(u.id)).sum()
    }

    /// Number of live units a player owns
    pub fn unit_count(&self, player: Player) -> usize {
        self.units_of(player).count()
    }

    // ========================================================================
    // MUTATORS
    // ========================================================================
    //
    // These operate on an owned copy. Actions clone first and mutate the
    // clone, so callers holding the original never observe a change.

    /// Start a turn: set the active player and clear per-round counters
    pub fn begin_turn(&mut self, player: Player, actions: u8) {
        self.current_player = player;
        self.actions_left = actions;
        self.clear_counter_all(Counter::RoundAttacks);
        self.clear_counter_all(Counter::RoundAbilities);
    }

    /// Spend one action of the current turn
    pub fn consume_action(&mut self) {
        self.actions_left = self.actions_left.saturating_sub(1);
    }

    /// Set a counter on a live unit. Ignored for removed units.
    pub fn set_counter(&mut self, id: UnitId, counter: Counter, value: i32) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(c) = self.counters.get_mut(id.index()) {
            c.set(counter, value);
        }
    }

    /// Add `delta` to a counter on a live unit
    pub fn inc_counter(&mut self, id: UnitId, counter: Counter, delta: i32) {
        let value = self.counter(id, counter) + delta;
        self.set_counter(id, counter, value);
    }

    /// Reset a counter to 0
    pub fn clear_counter(&mut self, id: UnitId, counter: Counter) {
        self.set_counter(id, counter, 0);
    }

    /// Reset a counter to 0 on every unit
    pub fn clear_counter_all(&mut self, counter: Counter) {
        for c in &mut self.counters {
            c.set(counter, 0);
        }
    }

    /// Move a live unit to an empty cell. Does not check legality.
    pub fn relocate(&mut self, id: UnitId, to: Position) {
        let Some(from) = self.position(id) else {
            return;
        };
        if !to.is_valid() || from == to {
            return;
        }
        if let Some(occupant) = self.board[to.index()] {
            tracing::trace!(unit = %id, %to, %occupant, "relocation onto occupied cell skipped");
            return;
        }
        self.board[from.index()] = None;
        self.board[to.index()] = Some(id);
        self.positions[id.index()] = Some(to);
    }

    /// Deal damage to a unit.
    ///
    /// An active defensive stance absorbs one point of a positive hit and is
    /// cleared. Health is then reduced, and a unit left at 0 or below is
    /// removed from the board. This is the only way units die.
    ///
    /// Returns the damage actually applied.
    pub fn apply_damage(&mut self, target: UnitId, amount: i32) -> i32 {
        if !self.is_alive(target) {
            return 0;
        }

        let mut damage = amount;
        if damage > 0 && self.counter(target, Counter::DefensiveStance) > 0 {
            damage -= 1;
            self.clear_counter(target, Counter::DefensiveStance);
        }

        self.inc_counter(target, Counter::Health, -damage);
        if self.counter(target, Counter::Health) <= 0 {
            self.remove(target);
        }
        damage
    }

    fn remove(&mut self, id: UnitId) {
        if let Some(pos) = self.positions[id.index()].take() {
            self.board[pos.index()] = None;
        }
        self.counters[id.index()] = Counters::default();
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    /// Check that board occupancy and the position index agree and that
    /// every live unit has health left
    pub fn validate(&self) -> Result<(), StateError> {
        for unit in self.units.iter() {
            match self.positions[unit.id.index()] {
                Some(pos) => {
                    if self.board[pos.index()] != Some(unit.id) {
                        return Err(StateError::Inconsistent(unit.id));
                    }
                    if self.counter(unit.id, Counter::Health) <= 0 {
                        return Err(StateError::NoHealth(unit.id));
                    }
                }
                None => {
                    if self.board.contains(&Some(unit.id)) {
                        return Err(StateError::Inconsistent(unit.id));
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("current_player", &self.current_player)
            .field("actions_left", &self.actions_left)
            .field("positions", &self.positions)
            .field("counters", &self.counters)
            .finish()
    }
}

/// ASCII board: `.` for empty cells, the unit id otherwise
impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for x in 0..BOARD_SIZE {
            write!(f, "{x:>3}")?;
        }
        writeln!(f)?;
        for y in 0..BOARD_SIZE {
            write!(f, "{y:>3}")?;
            for x in 0..BOARD_SIZE {
                match self.occupant(Position::new(x, y)) {
                    Some(id) => write!(f, "{:>3}", id.0)?,
                    None => write!(f, "{:>3}", ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
