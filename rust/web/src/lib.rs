//! # bingo_web: Shared-Room Bingo Server
//!
//! HTTP and SSE front end for a single shared 75-ball bingo room. The room
//! cycles lobby -> countdown -> calling on its own timers; clients join by
//! opening the event stream and drive the game through small JSON commands.
//!
//! - [`room`] - The room state machine, timers and claim handling
//! - [`registry`] - Player roster and per-player round state
//! - [`events`] - Broadcast bus feeding the SSE streams
//! - [`history`] - In-memory record of completed rounds
//! - [`server`] - Warp route wiring and server lifecycle
//! - [`handlers`] - HTTP and SSE request handlers

pub use logging::init_logging;
pub use server::{AppContext, ServerConfig, ServerHandle, WebServer};

pub mod errors;
pub mod events;
pub mod handlers;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod registry;
pub mod room;
pub mod server;
