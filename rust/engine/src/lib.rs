//! # bingo-engine: Bingo Game Core
//!
//! The synchronous, I/O-free core of a 75-ball bingo room: board grids and
//! the board catalog, the number draw sequencer, the win validator, and the
//! prize pool calculator. All randomness flows through a seeded ChaCha20 RNG
//! so that draws are reproducible in tests.
//!
//! ## Core Modules
//!
//! - [`board`] - 5x5 board grids, cell representation, column-band validation
//! - [`catalog`] - The pre-generated board catalog (id -> grid lookup)
//! - [`draw`] - Exhaustive non-repeating random draw over 1..=75
//! - [`win`] - Line enumeration and the authoritative win check
//! - [`prize`] - Prize pool derivation from player count and stake
//! - [`errors`] - Error types for board and catalog validation
//!
//! ## Deterministic Draws
//!
//! The draw order is a single Fisher-Yates shuffle of the full domain;
//! seeding it makes the whole round reproducible:
//!
//! ```rust
//! use bingo_engine::draw::DrawSequence;
//!
//! let mut a = DrawSequence::new_with_seed(42);
//! let mut b = DrawSequence::new_with_seed(42);
//! assert_eq!(a.next_call(), b.next_call());
//! ```
//!
//! ## Prize Derivation
//!
//! The prize pool is never stored, only derived:
//!
//! ```rust
//! use bingo_engine::prize::prize_pool;
//!
//! // 5 players at stake 10 with an 80% payout ratio
//! assert_eq!(prize_pool(5, 10, 0.8), 40);
//! ```

pub mod board;
pub mod catalog;
pub mod draw;
pub mod errors;
pub mod prize;
pub mod win;
