use crate::registry::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("round history lock poisoned")]
    StoragePoisoned,
}

/// Outcome of one completed round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_id: String,
    /// `None` when the round drained all 75 numbers without a valid claim.
    pub winner: Option<PlayerId>,
    pub prize: u64,
    pub calls_made: usize,
    pub completed_at: DateTime<Utc>,
}

impl RoundRecord {
    pub fn new(winner: Option<PlayerId>, prize: u64, calls_made: usize) -> Self {
        Self {
            round_id: Uuid::new_v4().to_string(),
            winner,
            prize,
            calls_made,
            completed_at: Utc::now(),
        }
    }
}

/// Aggregates over the retained history window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundStatistics {
    pub total_rounds: usize,
    pub rounds_won: usize,
    pub total_prize_awarded: u64,
    pub average_calls: f64,
}

/// In-memory ring of recent round outcomes. Oldest records fall off once
/// capacity is reached; the room keeps running regardless.
#[derive(Debug)]
pub struct RoundHistoryStore {
    rounds: RwLock<VecDeque<RoundRecord>>,
    capacity: usize,
}

impl Default for RoundHistoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RoundHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rounds: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn record(&self, record: RoundRecord) -> Result<(), HistoryError> {
        let mut rounds = self
            .rounds
            .write()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        if rounds.len() == self.capacity {
            rounds.pop_front();
        }
        rounds.push_back(record);
        Ok(())
    }

    /// Most recent rounds first, at most `limit` of them.
    pub fn recent(&self, limit: usize) -> Result<Vec<RoundRecord>, HistoryError> {
        let rounds = self
            .rounds
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        Ok(rounds.iter().rev().take(limit).cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.rounds.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> Result<RoundStatistics, HistoryError> {
        let rounds = self
            .rounds
            .read()
            .map_err(|_| HistoryError::StoragePoisoned)?;
        let total_rounds = rounds.len();
        let rounds_won = rounds.iter().filter(|r| r.winner.is_some()).count();
        let total_prize_awarded = rounds
            .iter()
            .filter(|r| r.winner.is_some())
            .map(|r| r.prize)
            .sum();
        let average_calls = if total_rounds == 0 {
            0.0
        } else {
            rounds.iter().map(|r| r.calls_made).sum::<usize>() as f64 / total_rounds as f64
        };

        Ok(RoundStatistics {
            total_rounds,
            rounds_won,
            total_prize_awarded,
            average_calls,
        })
    }
}
