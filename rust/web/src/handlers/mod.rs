pub mod health;
pub mod history;
pub mod room;
pub mod sse;

pub use health::{get_metrics, health};
pub use history::{get_recent_rounds, get_statistics};
pub use room::{
    ClaimRequest, SelectPicksRequest, StakeRequest, StartRequest, claim_bingo, get_room_state,
    request_start, select_picks, set_stake,
};
pub use sse::stream_room_events;
