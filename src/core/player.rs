//! Players, turn order and per-player state.
//!
//! ## PlayerId
//!
//! Type-safe seat index. Seat 0 takes the first turn.
//!
//! ## TurnOrder
//!
//! Every "next player" question goes through [`TurnOrder`], which rotates
//! through seats generically. Nothing in the engine hardcodes "the other
//! player", even though matches are two-player.
//!
//! ## PlayerMap
//!
//! Per-seat storage backed by a `Vec`, indexed by `PlayerId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::mana::ManaPool;

/// Seat identifier. Indices are 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over every seat of a `player_count` game.
    ///
    /// ```
    /// use duel_rules::core::PlayerId;
    ///
    /// let seats: Vec<_> = PlayerId::all(2).collect();
    /// assert_eq!(seats, vec![PlayerId::new(0), PlayerId::new(1)]);
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Seat rotation for a fixed number of players.
///
/// ```
/// use duel_rules::core::{PlayerId, TurnOrder};
///
/// let order = TurnOrder::new(2);
/// assert_eq!(order.next(PlayerId::new(1)), PlayerId::new(0));
/// let apnap: Vec<_> = order.starting_from(PlayerId::new(1)).collect();
/// assert_eq!(apnap, vec![PlayerId::new(1), PlayerId::new(0)]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrder {
    player_count: usize,
}

impl TurnOrder {
    /// Create a rotation over `player_count` seats.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");
        Self { player_count }
    }

    /// Number of seats.
    #[must_use]
    pub fn player_count(self) -> usize {
        self.player_count
    }

    /// The seat after `player` in turn order.
    #[must_use]
    pub fn next(self, player: PlayerId) -> PlayerId {
        PlayerId(((player.index() + 1) % self.player_count) as u8)
    }

    /// Every seat, beginning with `first` and following turn order.
    ///
    /// With `first` set to the active player this is APNAP order.
    pub fn starting_from(self, first: PlayerId) -> impl Iterator<Item = PlayerId> {
        let count = self.player_count;
        (0..count).map(move |offset| PlayerId(((first.index() + offset) % count) as u8))
    }

    /// Every seat except `player`, in turn order after it.
    pub fn opponents_of(self, player: PlayerId) -> impl Iterator<Item = PlayerId> {
        self.starting_from(player).skip(1)
    }
}

/// Per-player data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use duel_rules::core::{PlayerId, PlayerMap};
///
/// let mut life: PlayerMap<i32> = PlayerMap::new(2, |_| 20);
/// life[PlayerId::new(1)] -= 3;
/// assert_eq!(life[PlayerId::new(1)], 17);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a map with one value per seat from a factory.
    pub fn new(player_count: usize, factory: impl FnMut(PlayerId) -> T) -> Self {
        let order = TurnOrder::new(player_count);
        Self {
            data: PlayerId::all(order.player_count()).map(factory).collect(),
        }
    }

    /// Create a map with all entries set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over `(PlayerId, &T)` pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over `(PlayerId, &mut T)` pairs in seat order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

/// Why a player lost the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossReason {
    /// Life total at or below zero.
    ZeroLife,
    /// Attempted to draw from an empty library.
    EmptyLibraryDraw,
    /// Poison counters reached the configured threshold.
    PoisonThreshold,
}

impl std::fmt::Display for LossReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            LossReason::ZeroLife => "life total reached zero",
            LossReason::EmptyLibraryDraw => "drew from an empty library",
            LossReason::PoisonThreshold => "poison threshold reached",
        };
        f.write_str(text)
    }
}

/// Why a match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// The loser's life total reached zero.
    LifeLoss,
    /// The loser drew from an empty library.
    EmptyLibraryDraw,
    /// The loser reached the poison threshold.
    PoisonThreshold,
    /// The configured turn limit was reached.
    TurnLimit,
    /// Every player lost at the same time.
    Draw,
}

impl From<LossReason> for EndReason {
    fn from(reason: LossReason) -> Self {
        match reason {
            LossReason::ZeroLife => EndReason::LifeLoss,
            LossReason::EmptyLibraryDraw => EndReason::EmptyLibraryDraw,
            LossReason::PoisonThreshold => EndReason::PoisonThreshold,
        }
    }
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            EndReason::LifeLoss => "life loss",
            EndReason::EmptyLibraryDraw => "empty library draw",
            EndReason::PoisonThreshold => "poison threshold",
            EndReason::TurnLimit => "turn limit",
            EndReason::Draw => "draw",
        };
        f.write_str(text)
    }
}

/// Mutable per-player state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Current life total.
    pub life: i32,
    /// Poison counters.
    pub poison: u32,
    /// Unspent mana. Emptied at every step boundary.
    pub mana_pool: ManaPool,
    /// Set once the player has lost.
    pub lost: Option<LossReason>,
    /// Set by a draw from an empty library; checked by the cleanup loop.
    pub drew_from_empty_library: bool,
    /// Lands played during the current turn.
    pub lands_played: u32,
    /// Life gained during the current turn.
    pub life_gained_this_turn: i32,
}

impl PlayerState {
    /// Fresh state for a player starting at `life`.
    #[must_use]
    pub fn new(life: i32) -> Self {
        Self {
            life,
            poison: 0,
            mana_pool: ManaPool::default(),
            lost: None,
            drew_from_empty_library: false,
            lands_played: 0,
            life_gained_this_turn: 0,
        }
    }

    /// Whether the player is still in the game.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.lost.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_order_rotation_wraps() {
        let order = TurnOrder::new(3);
        assert_eq!(order.next(PlayerId::new(0)), PlayerId::new(1));
        assert_eq!(order.next(PlayerId::new(2)), PlayerId::new(0));
    }

    #[test]
    fn test_turn_order_starting_from() {
        let order = TurnOrder::new(3);
        let seats: Vec<_> = order.starting_from(PlayerId::new(2)).collect();
        assert_eq!(seats, vec![PlayerId::new(2), PlayerId::new(0), PlayerId::new(1)]);
    }

    #[test]
    fn test_opponents_of_skips_self() {
        let order = TurnOrder::new(2);
        let opponents: Vec<_> = order.opponents_of(PlayerId::new(0)).collect();
        assert_eq!(opponents, vec![PlayerId::new(1)]);
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_turn_order_zero_players() {
        let _ = TurnOrder::new(0);
    }

    #[test]
    fn test_player_map_iter_mut() {
        let mut map: PlayerMap<PlayerState> = PlayerMap::new(2, |_| PlayerState::new(20));
        for (player, state) in map.iter_mut() {
            state.life -= player.index() as i32;
        }
        assert_eq!(map[PlayerId::new(0)].life, 20);
        assert_eq!(map[PlayerId::new(1)].life, 19);
    }

    #[test]
    fn test_player_state_loss() {
        let mut state = PlayerState::new(20);
        assert!(state.is_alive());
        state.lost = Some(LossReason::PoisonThreshold);
        assert!(!state.is_alive());
        assert_eq!(LossReason::ZeroLife.to_string(), "life total reached zero");
    }

    #[test]
    fn test_player_map_serialization() {
        let map: PlayerMap<i32> = PlayerMap::new(2, |p| p.index() as i32 + 1);
        let json = serde_json::to_string(&map).unwrap();
        let back: PlayerMap<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }
}
