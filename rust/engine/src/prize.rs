/// Derives the current prize pool from the live player count and the room
/// stake, rounded down to a whole unit.
///
/// The pool is recomputed on every player join, leave and stake change
/// rather than stored, so it can never drift from the roster.
pub fn prize_pool(player_count: usize, stake: u32, payout_ratio: f64) -> u64 {
    (player_count as f64 * stake as f64 * payout_ratio).floor() as u64
}
