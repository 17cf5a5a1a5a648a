use crate::room::RoomError;
use bingo_engine::catalog::BoardId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Opaque id handed to a client when it joins; commands carry it back.
pub type PlayerId = String;

/// Maximum boards a player may hold in one round.
pub const MAX_PICKS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub picks: Vec<BoardId>,
    pub ready: bool,
    pub disqualified: bool,
}

impl Player {
    fn new(id: PlayerId) -> Self {
        let name = format!("Player-{}", &id[..4.min(id.len())]);
        Self {
            id,
            name,
            picks: Vec::new(),
            ready: false,
            disqualified: false,
        }
    }
}

/// The room roster. Not synchronized itself; it lives inside the room's
/// state lock.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fresh player and returns its id.
    pub fn join(&mut self) -> PlayerId {
        let id = Uuid::new_v4().to_string();
        self.players.insert(id.clone(), Player::new(id.clone()));
        id
    }

    /// Removes a player. Unknown ids are ignored; a stream can close after
    /// a round reset already forgot the player.
    pub fn leave(&mut self, player_id: &str) -> bool {
        self.players.remove(player_id).is_some()
    }

    pub fn get(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    /// Replaces a player's board picks for the upcoming round.
    pub fn set_picks(&mut self, player_id: &str, picks: Vec<BoardId>) -> Result<(), RoomError> {
        if picks.len() > MAX_PICKS {
            return Err(RoomError::TooManyPicks(picks.len()));
        }
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(RoomError::UnknownPlayer)?;
        player.picks = picks;
        Ok(())
    }

    /// Marks a player ready. Requires at least one pick.
    pub fn mark_ready(&mut self, player_id: &str) -> Result<(), RoomError> {
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(RoomError::UnknownPlayer)?;
        if player.picks.is_empty() {
            return Err(RoomError::NoPicksSelected);
        }
        player.ready = true;
        Ok(())
    }

    pub fn set_disqualified(&mut self, player_id: &str) -> Result<(), RoomError> {
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(RoomError::UnknownPlayer)?;
        player.disqualified = true;
        Ok(())
    }

    /// True if any player has at least one pick.
    pub fn any_picks(&self) -> bool {
        self.players.values().any(|p| !p.picks.is_empty())
    }

    pub fn count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Clears per-round state for every player. Players stay in the room
    /// between rounds; their picks, ready flags and penalties do not.
    pub fn reset_round(&mut self) {
        for player in self.players.values_mut() {
            player.picks.clear();
            player.ready = false;
            player.disqualified = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_assigns_unique_ids_and_names() {
        let mut registry = PlayerRegistry::new();
        let a = registry.join();
        let b = registry.join();
        assert_ne!(a, b);
        assert_eq!(registry.count(), 2);

        let player = registry.get(&a).expect("player exists");
        assert!(player.name.starts_with("Player-"));
        assert!(player.picks.is_empty());
        assert!(!player.ready);
    }

    #[test]
    fn leave_removes_player_and_tolerates_unknown() {
        let mut registry = PlayerRegistry::new();
        let id = registry.join();
        assert!(registry.leave(&id));
        assert!(!registry.leave(&id));
        assert!(registry.is_empty());
    }

    #[test]
    fn set_picks_enforces_limit() {
        let mut registry = PlayerRegistry::new();
        let id = registry.join();

        registry.set_picks(&id, vec![1, 2]).expect("two picks fit");
        assert_eq!(registry.get(&id).unwrap().picks, vec![1, 2]);

        let err = registry.set_picks(&id, vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, RoomError::TooManyPicks(3)));
        // A rejected update leaves the previous picks in place.
        assert_eq!(registry.get(&id).unwrap().picks, vec![1, 2]);
    }

    #[test]
    fn set_picks_unknown_player() {
        let mut registry = PlayerRegistry::new();
        let err = registry.set_picks("nope", vec![1]).unwrap_err();
        assert!(matches!(err, RoomError::UnknownPlayer));
    }

    #[test]
    fn ready_requires_picks() {
        let mut registry = PlayerRegistry::new();
        let id = registry.join();

        let err = registry.mark_ready(&id).unwrap_err();
        assert!(matches!(err, RoomError::NoPicksSelected));

        registry.set_picks(&id, vec![1]).unwrap();
        registry.mark_ready(&id).expect("ready with picks");
        assert!(registry.get(&id).unwrap().ready);
    }

    #[test]
    fn reset_round_clears_per_round_state_but_keeps_players() {
        let mut registry = PlayerRegistry::new();
        let id = registry.join();
        registry.set_picks(&id, vec![1]).unwrap();
        registry.mark_ready(&id).unwrap();
        registry.set_disqualified(&id).unwrap();

        registry.reset_round();

        let player = registry.get(&id).expect("player survives reset");
        assert!(player.picks.is_empty());
        assert!(!player.ready);
        assert!(!player.disqualified);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn any_picks_reflects_roster() {
        let mut registry = PlayerRegistry::new();
        let a = registry.join();
        let _b = registry.join();
        assert!(!registry.any_picks());
        registry.set_picks(&a, vec![2]).unwrap();
        assert!(registry.any_picks());
    }
}
