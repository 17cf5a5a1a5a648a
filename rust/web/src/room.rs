use crate::errors::IntoErrorResponse;
use crate::events::{EventBus, GameEvent};
use crate::history::{RoundHistoryStore, RoundRecord};
use crate::metrics::MetricsCollector;
use crate::registry::{PlayerId, PlayerRegistry, MAX_PICKS};
use bingo_engine::catalog::{BoardCatalog, BoardId};
use bingo_engine::draw::DrawSequence;
use bingo_engine::prize::prize_pool;
use bingo_engine::win::{find_winning_line, WinningLine};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use warp::http::StatusCode;

/// Tunables for the room lifecycle.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Lobby countdown length before calling begins.
    pub countdown_secs: u32,
    /// Pause between consecutive number calls.
    pub call_interval: Duration,
    /// Share of the collected stakes paid to the winner.
    pub payout_ratio: f64,
    /// Per-player stake the room opens with.
    pub default_stake: u32,
    /// Fixed draw seed; `None` uses OS entropy.
    pub draw_seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 60,
            call_interval: Duration::from_secs(3),
            payout_ratio: 0.8,
            default_stake: 10,
            draw_seed: None,
        }
    }
}

impl RoomConfig {
    /// Short intervals so lifecycle tests finish quickly.
    pub fn for_tests() -> Self {
        Self {
            countdown_secs: 1,
            call_interval: Duration::from_millis(10),
            draw_seed: Some(42),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Countdown,
    Calling,
}

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("player not found in this room")]
    UnknownPlayer,
    #[error("at most {MAX_PICKS} boards may be picked, got {0}")]
    TooManyPicks(usize),
    #[error("board {0} does not exist in the catalog")]
    InvalidBoard(BoardId),
    #[error("at least one board must be picked first")]
    NoPicksSelected,
    #[error("invalid stake: {0}")]
    InvalidStake(&'static str),
    #[error("claim rejected: {0}")]
    ClaimRejected(&'static str),
    #[error("room state lock poisoned")]
    StatePoisoned,
}

impl IntoErrorResponse for RoomError {
    fn status_code(&self) -> StatusCode {
        match self {
            RoomError::UnknownPlayer => StatusCode::NOT_FOUND,
            RoomError::TooManyPicks(_)
            | RoomError::InvalidBoard(_)
            | RoomError::NoPicksSelected
            | RoomError::InvalidStake(_) => StatusCode::BAD_REQUEST,
            RoomError::ClaimRejected(_) => StatusCode::CONFLICT,
            RoomError::StatePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RoomError::UnknownPlayer => "unknown_player",
            RoomError::TooManyPicks(_) => "too_many_picks",
            RoomError::InvalidBoard(_) => "invalid_board",
            RoomError::NoPicksSelected => "no_picks_selected",
            RoomError::InvalidStake(_) => "invalid_stake",
            RoomError::ClaimRejected(_) => "claim_rejected",
            RoomError::StatePoisoned => "internal_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            RoomError::TooManyPicks(requested) => Some(serde_json::json!({
                "requested": requested,
                "max": MAX_PICKS,
            })),
            RoomError::InvalidBoard(board_id) => Some(serde_json::json!({
                "board_id": board_id,
            })),
            _ => None,
        }
    }
}

/// Snapshot handed to a client when it joins, pushed as the first event on
/// its stream.
#[derive(Debug, Clone)]
pub struct JoinInfo {
    pub player_id: PlayerId,
    pub phase: Phase,
    pub countdown_remaining: u32,
    pub stake: u32,
    pub prize: u64,
    pub call_history: Vec<u8>,
}

/// Public view of the room for `GET /api/room/state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub phase: Phase,
    pub countdown_remaining: u32,
    pub stake: u32,
    pub prize: u64,
    pub player_count: usize,
    pub call_history: Vec<u8>,
    pub last_call: Option<u8>,
}

/// Result of a bingo claim.
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    Valid {
        board_id: BoardId,
        line: WinningLine,
        prize: u64,
    },
    Invalid {
        message: &'static str,
    },
}

#[derive(Debug)]
struct RoomState {
    phase: Phase,
    countdown_remaining: u32,
    stake: u32,
    call_history: Vec<u8>,
    draw: Option<DrawSequence>,
    players: PlayerRegistry,
}

#[derive(Debug, Default)]
struct RoomTimers {
    countdown: Option<JoinHandle<()>>,
    caller: Option<JoinHandle<()>>,
}

impl RoomTimers {
    fn abort_all(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
        if let Some(handle) = self.caller.take() {
            handle.abort();
        }
    }
}

enum CountdownStep {
    Continue,
    BeginCalling,
}

enum CallStep {
    Called,
    Exhausted,
    Halted,
}

/// The shared bingo room.
///
/// All mutable state sits behind one `Mutex<RoomState>`; timer handles sit
/// behind a separate lock so a phase change can cancel the previous phase's
/// task before mutating state. Neither lock is ever held across an await.
pub struct Room {
    config: RoomConfig,
    catalog: Arc<BoardCatalog>,
    bus: EventBus,
    metrics: MetricsCollector,
    history: Arc<RoundHistoryStore>,
    state: Mutex<RoomState>,
    timers: Mutex<RoomTimers>,
}

impl Room {
    pub fn new(
        config: RoomConfig,
        catalog: Arc<BoardCatalog>,
        bus: EventBus,
        metrics: MetricsCollector,
        history: Arc<RoundHistoryStore>,
    ) -> Self {
        let state = RoomState {
            phase: Phase::Lobby,
            countdown_remaining: 0,
            stake: config.default_stake,
            call_history: Vec::new(),
            draw: None,
            players: PlayerRegistry::new(),
        };
        Self {
            config,
            catalog,
            bus,
            metrics,
            history,
            state: Mutex::new(state),
            timers: Mutex::new(RoomTimers::default()),
        }
    }

    pub fn catalog(&self) -> &BoardCatalog {
        &self.catalog
    }

    /// Opens the room: begins the first lobby countdown. Called once at
    /// server start.
    pub fn open(self: &Arc<Self>) -> Result<(), RoomError> {
        self.start_countdown()
    }

    /// Admits a new player and tells everyone the roster changed.
    pub fn join(&self) -> Result<JoinInfo, RoomError> {
        let info = {
            let mut state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
            let player_id = state.players.join();
            let count = state.players.count();
            let prize = self.pool(&state);
            let info = JoinInfo {
                player_id,
                phase: state.phase,
                countdown_remaining: state.countdown_remaining,
                stake: state.stake,
                prize,
                call_history: state.call_history.clone(),
            };
            tracing::info!(player_id = %info.player_id, player_count = count, "player joined");
            info
        };

        self.metrics.record_connection();
        self.broadcast_players()?;
        Ok(info)
    }

    /// Removes a player when its event stream closes. A round in progress
    /// keeps running; the pool shrinks with the roster.
    pub fn leave(&self, player_id: &str) -> Result<(), RoomError> {
        let removed = {
            let mut state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
            state.players.leave(player_id)
        };

        if removed {
            tracing::info!(player_id = %player_id, "player left");
            self.metrics.record_disconnection();
            self.broadcast_players()?;
        }
        Ok(())
    }

    /// Sets a player's board picks, validating every id against the catalog.
    pub fn set_picks(&self, player_id: &str, picks: Vec<BoardId>) -> Result<Vec<BoardId>, RoomError> {
        for &board_id in &picks {
            if !self.catalog.contains(board_id) {
                return Err(RoomError::InvalidBoard(board_id));
            }
        }

        let mut state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
        state.players.set_picks(player_id, picks.clone())?;
        Ok(picks)
    }

    /// Marks a player ready for the next round.
    pub fn request_start(&self, player_id: &str) -> Result<(), RoomError> {
        let mut state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
        state.players.mark_ready(player_id)
    }

    /// Changes the room stake. Accepted in any phase; the new amount flows
    /// into the next computed prize pool.
    pub fn set_stake(&self, player_id: &str, amount: u32) -> Result<(u32, u64), RoomError> {
        if amount == 0 {
            return Err(RoomError::InvalidStake("stake must be positive"));
        }

        let (prize, tick) = {
            let mut state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
            if state.players.get(player_id).is_none() {
                return Err(RoomError::UnknownPlayer);
            }
            state.stake = amount;
            let prize = self.pool(&state);
            let tick = GameEvent::Tick {
                countdown_remaining: state.countdown_remaining,
                player_count: state.players.count(),
                prize,
                stake: state.stake,
            };
            (prize, tick)
        };

        tracing::info!(player_id = %player_id, stake = amount, "stake changed");
        self.bus.broadcast(tick);
        Ok((amount, prize))
    }

    /// Judges a bingo claim against the board and the call history.
    ///
    /// The room is the sole judge: whatever the claimant's client computed,
    /// the line is re-checked here against the authoritative history. A
    /// false claim during calling disqualifies the player for the rest of
    /// the round.
    pub fn claim_bingo(self: &Arc<Self>, player_id: &str) -> Result<ClaimOutcome, RoomError> {
        let verdict = {
            let mut state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
            let player = state.players.get(player_id).ok_or(RoomError::UnknownPlayer)?;
            if player.disqualified {
                return Err(RoomError::ClaimRejected(
                    "a previous false claim disqualified you for this round",
                ));
            }
            if player.picks.is_empty() {
                return Err(RoomError::NoPicksSelected);
            }
            if state.phase != Phase::Calling {
                return Ok(ClaimOutcome::Invalid {
                    message: "no round in progress",
                });
            }
            let Some(&last_call) = state.call_history.last() else {
                return Ok(ClaimOutcome::Invalid {
                    message: "no numbers have been called yet",
                });
            };

            let mut win = None;
            for &board_id in &player.picks {
                let Some(grid) = self.catalog.lookup(board_id) else {
                    continue;
                };
                if let Some(line) = find_winning_line(grid, &state.call_history, last_call) {
                    win = Some((board_id, line));
                    break;
                }
            }

            match win {
                Some((board_id, line)) => {
                    let prize = self.pool(&state);
                    let calls_made = state.call_history.len();
                    Ok((board_id, line, prize, calls_made))
                }
                None => {
                    state.players.set_disqualified(player_id)?;
                    Err("no completed line matches the call history")
                }
            }
        };

        match verdict {
            Ok((board_id, line, prize, calls_made)) => {
                tracing::info!(player_id = %player_id, board_id, prize, "bingo claim accepted");
                self.metrics.record_claim_accepted();
                self.bus.broadcast(GameEvent::Winner {
                    player_id: player_id.to_string(),
                    prize,
                });
                self.resolve_round(Some(player_id.to_string()), prize, calls_made)?;
                Ok(ClaimOutcome::Valid {
                    board_id,
                    line,
                    prize,
                })
            }
            Err(message) => {
                tracing::info!(player_id = %player_id, message, "bingo claim rejected");
                self.metrics.record_claim_rejected();
                Ok(ClaimOutcome::Invalid { message })
            }
        }
    }

    pub fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
        Ok(RoomSnapshot {
            phase: state.phase,
            countdown_remaining: state.countdown_remaining,
            stake: state.stake,
            prize: self.pool(&state),
            player_count: state.players.count(),
            call_history: state.call_history.clone(),
            last_call: state.call_history.last().copied(),
        })
    }

    fn pool(&self, state: &RoomState) -> u64 {
        prize_pool(state.players.count(), state.stake, self.config.payout_ratio)
    }

    fn broadcast_players(&self) -> Result<(), RoomError> {
        let (count, tick) = {
            let state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
            (
                state.players.count(),
                GameEvent::Tick {
                    countdown_remaining: state.countdown_remaining,
                    player_count: state.players.count(),
                    prize: self.pool(&state),
                    stake: state.stake,
                },
            )
        };
        self.bus.broadcast(GameEvent::Players { count });
        self.bus.broadcast(tick);
        Ok(())
    }

    /// Enters the countdown phase. The timers lock is held across the state
    /// change and task spawn so two entries cannot race a double spawn.
    fn start_countdown(self: &Arc<Self>) -> Result<(), RoomError> {
        let mut timers = self.timers.lock().map_err(|_| RoomError::StatePoisoned)?;
        timers.abort_all();

        let tick = {
            let mut state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
            state.phase = Phase::Countdown;
            state.countdown_remaining = self.config.countdown_secs;
            state.call_history.clear();
            state.draw = None;
            GameEvent::Tick {
                countdown_remaining: state.countdown_remaining,
                player_count: state.players.count(),
                prize: self.pool(&state),
                stake: state.stake,
            }
        };

        tracing::info!(countdown_secs = self.config.countdown_secs, "countdown started");
        self.bus.broadcast(GameEvent::Phase {
            phase: Phase::Countdown,
        });
        self.bus.broadcast(tick);

        let room = Arc::clone(self);
        timers.countdown = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            ticker.tick().await; // first tick is immediate
            loop {
                ticker.tick().await;
                match room.countdown_tick() {
                    Ok(CountdownStep::Continue) => {}
                    Ok(CountdownStep::BeginCalling) => {
                        if let Err(e) = room.start_calling() {
                            tracing::error!(error = %e, "failed to begin calling");
                        }
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "countdown tick failed");
                        break;
                    }
                }
            }
        }));
        Ok(())
    }

    fn countdown_tick(&self) -> Result<CountdownStep, RoomError> {
        let (step, tick) = {
            let mut state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
            if state.phase != Phase::Countdown {
                return Ok(CountdownStep::Continue);
            }
            state.countdown_remaining = state.countdown_remaining.saturating_sub(1);

            let step = if state.countdown_remaining == 0 {
                if state.players.any_picks() {
                    CountdownStep::BeginCalling
                } else {
                    // Nobody is playing yet; rewind and keep waiting.
                    state.countdown_remaining = self.config.countdown_secs;
                    CountdownStep::Continue
                }
            } else {
                CountdownStep::Continue
            };

            let tick = GameEvent::Tick {
                countdown_remaining: state.countdown_remaining,
                player_count: state.players.count(),
                prize: self.pool(&state),
                stake: state.stake,
            };
            (step, tick)
        };

        self.bus.broadcast(tick);
        Ok(step)
    }

    /// Enters the calling phase and starts drawing numbers.
    fn start_calling(self: &Arc<Self>) -> Result<(), RoomError> {
        let mut timers = self.timers.lock().map_err(|_| RoomError::StatePoisoned)?;
        timers.abort_all();

        {
            let mut state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
            state.phase = Phase::Calling;
            state.countdown_remaining = 0;
            state.call_history.clear();
            state.draw = Some(match self.config.draw_seed {
                Some(seed) => DrawSequence::new_with_seed(seed),
                None => DrawSequence::new(),
            });
        }

        tracing::info!("calling started");
        self.bus.broadcast(GameEvent::Phase {
            phase: Phase::Calling,
        });
        self.bus.broadcast(GameEvent::GameStart);

        let room = Arc::clone(self);
        let interval = self.config.call_interval;
        timers.caller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match room.emit_call() {
                    Ok(CallStep::Called) => {}
                    Ok(CallStep::Exhausted) => {
                        tracing::info!("draw exhausted with no winner");
                        if let Err(e) = room.finish_exhausted_round() {
                            tracing::error!(error = %e, "failed to resolve exhausted round");
                        }
                        break;
                    }
                    Ok(CallStep::Halted) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "call tick failed");
                        break;
                    }
                }
            }
        }));
        Ok(())
    }

    fn emit_call(&self) -> Result<CallStep, RoomError> {
        let event = {
            let mut state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
            if state.phase != Phase::Calling {
                return Ok(CallStep::Halted);
            }
            let Some(draw) = state.draw.as_mut() else {
                return Ok(CallStep::Halted);
            };
            let Some(number) = draw.next_call() else {
                return Ok(CallStep::Exhausted);
            };
            state.call_history.push(number);
            GameEvent::Call {
                number,
                call_history: state.call_history.clone(),
            }
        };

        self.metrics.record_call();
        self.bus.broadcast(event);
        Ok(CallStep::Called)
    }

    fn finish_exhausted_round(self: &Arc<Self>) -> Result<(), RoomError> {
        let (prize, calls_made) = {
            let state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
            (self.pool(&state), state.call_history.len())
        };
        self.resolve_round(None, prize, calls_made)
    }

    /// Ends the current round, records it, resets per-round player state
    /// and loops back into a fresh countdown.
    fn resolve_round(
        self: &Arc<Self>,
        winner: Option<PlayerId>,
        prize: u64,
        calls_made: usize,
    ) -> Result<(), RoomError> {
        if let Err(e) = self
            .history
            .record(RoundRecord::new(winner.clone(), prize, calls_made))
        {
            tracing::error!(error = %e, "failed to record round");
        }
        self.metrics.record_round_completed();

        {
            let mut state = self.state.lock().map_err(|_| RoomError::StatePoisoned)?;
            state.players.reset_round();
            state.phase = Phase::Lobby;
            state.draw = None;
        }

        tracing::info!(winner = ?winner, prize, calls_made, "round resolved");
        self.bus.broadcast(GameEvent::Phase { phase: Phase::Lobby });
        self.start_countdown()
    }

    #[cfg(test)]
    pub(crate) fn force_calling(&self, call_history: Vec<u8>) {
        let mut state = self.state.lock().expect("state lock");
        state.phase = Phase::Calling;
        state.call_history = call_history;
        state.draw = Some(DrawSequence::new_with_seed(0));
    }
}

impl Drop for Room {
    fn drop(&mut self) {
        if let Ok(mut timers) = self.timers.lock() {
            timers.abort_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_room() -> Arc<Room> {
        Arc::new(Room::new(
            RoomConfig::for_tests(),
            Arc::new(BoardCatalog::sample()),
            EventBus::new(),
            MetricsCollector::new(),
            Arc::new(RoundHistoryStore::new()),
        ))
    }

    fn room_with_bus() -> (Arc<Room>, EventBus) {
        let bus = EventBus::new();
        let room = Arc::new(Room::new(
            RoomConfig::for_tests(),
            Arc::new(BoardCatalog::sample()),
            bus.clone(),
            MetricsCollector::new(),
            Arc::new(RoundHistoryStore::new()),
        ));
        (room, bus)
    }

    // Sample board 1, column 0 holds [1, 2, 3, 4, 5].
    const BOARD_ONE_COLUMN: [u8; 5] = [1, 2, 3, 4, 5];

    #[tokio::test]
    async fn join_and_leave_update_roster_and_broadcast() {
        let (room, bus) = room_with_bus();
        let mut sub = bus.subscribe();

        let info = room.join().expect("join");
        assert_eq!(info.stake, 10);
        assert_eq!(room.snapshot().unwrap().player_count, 1);
        assert!(matches!(
            sub.receiver.try_recv(),
            Ok(GameEvent::Players { count: 1 })
        ));

        room.leave(&info.player_id).expect("leave");
        assert_eq!(room.snapshot().unwrap().player_count, 0);
    }

    #[tokio::test]
    async fn set_picks_rejects_unknown_board() {
        let room = test_room();
        let info = room.join().unwrap();
        let err = room.set_picks(&info.player_id, vec![999]).unwrap_err();
        assert!(matches!(err, RoomError::InvalidBoard(999)));
    }

    #[tokio::test]
    async fn set_picks_accepts_catalog_boards() {
        let room = test_room();
        let info = room.join().unwrap();
        let picks = room.set_picks(&info.player_id, vec![1, 2]).unwrap();
        assert_eq!(picks, vec![1, 2]);
    }

    #[tokio::test]
    async fn stake_change_recomputes_pool() {
        let room = test_room();
        let info = room.join().unwrap();
        room.join().unwrap();

        let (stake, prize) = room.set_stake(&info.player_id, 25).unwrap();
        assert_eq!(stake, 25);
        // 2 players * 25 * 0.8
        assert_eq!(prize, 40);

        let err = room.set_stake(&info.player_id, 0).unwrap_err();
        assert!(matches!(err, RoomError::InvalidStake(_)));
    }

    #[tokio::test]
    async fn stake_can_change_during_calling() {
        let room = test_room();
        let info = room.join().unwrap();
        room.force_calling(vec![9]);
        let (stake, prize) = room.set_stake(&info.player_id, 50).unwrap();
        assert_eq!(stake, 50);
        assert_eq!(prize, 40);
    }

    #[tokio::test]
    async fn valid_claim_wins_and_resets_round() {
        let (room, bus) = room_with_bus();
        let info = room.join().unwrap();
        room.set_picks(&info.player_id, vec![1]).unwrap();

        let mut sub = bus.subscribe();
        let mut history = vec![20u8];
        history.extend(BOARD_ONE_COLUMN);
        room.force_calling(history);

        let outcome = room.claim_bingo(&info.player_id).expect("claim");
        match outcome {
            ClaimOutcome::Valid { board_id, prize, .. } => {
                assert_eq!(board_id, 1);
                // 1 player * 10 * 0.8
                assert_eq!(prize, 8);
            }
            other => panic!("expected valid claim, got {:?}", other),
        }

        let mut saw_winner = false;
        while let Ok(event) = sub.receiver.try_recv() {
            if matches!(event, GameEvent::Winner { .. }) {
                saw_winner = true;
            }
        }
        assert!(saw_winner, "winner event should be broadcast");

        // Round reset: picks cleared, next countdown running.
        let snapshot = room.snapshot().unwrap();
        assert_eq!(snapshot.phase, Phase::Countdown);
        let err = room.claim_bingo(&info.player_id).unwrap_err();
        assert!(matches!(err, RoomError::NoPicksSelected));
    }

    #[tokio::test]
    async fn stale_claim_without_last_call_is_invalid() {
        let room = test_room();
        let info = room.join().unwrap();
        room.set_picks(&info.player_id, vec![1]).unwrap();

        // Column complete, but the final call landed elsewhere.
        let mut history = BOARD_ONE_COLUMN.to_vec();
        history.push(60);
        room.force_calling(history);

        let outcome = room.claim_bingo(&info.player_id).expect("claim handled");
        assert!(matches!(outcome, ClaimOutcome::Invalid { .. }));
    }

    #[tokio::test]
    async fn false_claim_disqualifies_for_round() {
        let room = test_room();
        let info = room.join().unwrap();
        room.set_picks(&info.player_id, vec![1]).unwrap();
        room.force_calling(vec![70, 71]);

        let outcome = room.claim_bingo(&info.player_id).expect("first claim");
        assert!(matches!(outcome, ClaimOutcome::Invalid { .. }));

        let err = room.claim_bingo(&info.player_id).unwrap_err();
        assert!(matches!(err, RoomError::ClaimRejected(_)));
    }

    #[tokio::test]
    async fn claim_outside_calling_is_invalid_without_penalty() {
        let room = test_room();
        let info = room.join().unwrap();
        room.set_picks(&info.player_id, vec![1]).unwrap();

        let outcome = room.claim_bingo(&info.player_id).expect("claim handled");
        assert!(matches!(
            outcome,
            ClaimOutcome::Invalid {
                message: "no round in progress"
            }
        ));

        // No penalty; the next claim is still judged, not rejected outright.
        assert!(room.claim_bingo(&info.player_id).is_ok());
    }

    #[tokio::test]
    async fn claim_from_unknown_player_fails() {
        let room = test_room();
        let err = room.claim_bingo("ghost").unwrap_err();
        assert!(matches!(err, RoomError::UnknownPlayer));
    }

    #[tokio::test]
    async fn ready_requires_picks_first() {
        let room = test_room();
        let info = room.join().unwrap();
        let err = room.request_start(&info.player_id).unwrap_err();
        assert!(matches!(err, RoomError::NoPicksSelected));

        room.set_picks(&info.player_id, vec![2]).unwrap();
        room.request_start(&info.player_id).expect("ready");
    }

    #[tokio::test]
    async fn countdown_advances_to_calling_when_picks_exist() {
        let (room, bus) = room_with_bus();
        let info = room.join().unwrap();
        room.set_picks(&info.player_id, vec![1]).unwrap();

        let mut sub = bus.subscribe();
        room.open().expect("open");

        // Countdown is one second in the test config.
        let deadline = tokio::time::Duration::from_secs(5);
        let started = tokio::time::timeout(deadline, async {
            loop {
                match sub.receiver.recv().await {
                    Some(GameEvent::GameStart) => break true,
                    Some(_) => {}
                    None => break false,
                }
            }
        })
        .await
        .expect("countdown should elapse");
        assert!(started, "expected a game_start event");

        // Calls follow shortly after.
        let called = tokio::time::timeout(deadline, async {
            loop {
                match sub.receiver.recv().await {
                    Some(GameEvent::Call { number, .. }) => break Some(number),
                    Some(_) => {}
                    None => break None,
                }
            }
        })
        .await
        .expect("a call should arrive");
        assert!(matches!(called, Some(1..=75)));
    }

    #[tokio::test]
    async fn countdown_restarts_when_nobody_picked() {
        let (room, bus) = room_with_bus();
        room.join().unwrap();

        let mut sub = bus.subscribe();
        room.open().expect("open");

        // With no picks the one-second test countdown must expire at least
        // twice without calling ever starting.
        tokio::time::sleep(Duration::from_millis(2500)).await;

        while let Ok(event) = sub.receiver.try_recv() {
            assert!(
                !matches!(event, GameEvent::GameStart),
                "calling must not start without picks"
            );
        }
        assert_eq!(room.snapshot().unwrap().phase, Phase::Countdown);
    }
}
