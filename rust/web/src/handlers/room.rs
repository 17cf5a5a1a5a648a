use crate::errors::IntoErrorResponse;
use crate::registry::PlayerId;
use crate::room::{ClaimOutcome, Room, RoomError};
use bingo_engine::catalog::BoardId;
use bingo_engine::win::WinningLine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

#[derive(Debug, Deserialize)]
pub struct SelectPicksRequest {
    pub player_id: PlayerId,
    pub board_ids: Vec<BoardId>,
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub player_id: PlayerId,
}

#[derive(Debug, Deserialize)]
pub struct StakeRequest {
    pub player_id: PlayerId,
    pub amount: u32,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub player_id: PlayerId,
}

#[derive(Debug, Serialize)]
struct PicksResponse {
    player_id: PlayerId,
    board_ids: Vec<BoardId>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StartResponse {
    StartConfirm { ready: bool },
}

#[derive(Debug, Serialize)]
struct StakeResponse {
    stake: u32,
    prize: u64,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ClaimResponse {
    Valid {
        valid: bool,
        board_id: BoardId,
        line: WinningLine,
        prize: u64,
    },
    Invalid {
        valid: bool,
        message: &'static str,
    },
}

/// Replaces a player's board picks for the upcoming round.
///
/// **POST** `/api/room/picks`. Every board id must exist in the catalog and
/// at most two may be picked. Errors: `unknown_player`, `too_many_picks`,
/// `invalid_board`.
pub async fn select_picks(room: Arc<Room>, request: SelectPicksRequest) -> Response {
    match room.set_picks(&request.player_id, request.board_ids) {
        Ok(board_ids) => success_response(
            StatusCode::OK,
            PicksResponse {
                player_id: request.player_id,
                board_ids,
            },
        ),
        Err(err) => room_error(err),
    }
}

/// Marks a player ready for the next round.
///
/// **POST** `/api/room/start`. Requires at least one picked board. The room
/// starts on its own countdown regardless; readiness is a signal, not a
/// gate. Errors: `unknown_player`, `no_picks_selected`.
pub async fn request_start(room: Arc<Room>, request: StartRequest) -> Response {
    match room.request_start(&request.player_id) {
        Ok(()) => success_response(StatusCode::OK, StartResponse::StartConfirm { ready: true }),
        Err(err) => room_error(err),
    }
}

/// Changes the room stake.
///
/// **POST** `/api/room/stake`. Accepted in any phase; the prize pool is
/// derived, so the change shows up in the next broadcast tick. Errors:
/// `unknown_player`, `invalid_stake` (non-positive amount).
pub async fn set_stake(room: Arc<Room>, request: StakeRequest) -> Response {
    match room.set_stake(&request.player_id, request.amount) {
        Ok((stake, prize)) => success_response(StatusCode::OK, StakeResponse { stake, prize }),
        Err(err) => room_error(err),
    }
}

/// Judges a bingo claim.
///
/// **POST** `/api/room/claim`. A judged claim always returns 200 with a
/// `valid` flag; a false claim during calling disqualifies the player for
/// the round. Errors: `unknown_player`, `no_picks_selected`,
/// `claim_rejected` (already disqualified).
pub async fn claim_bingo(room: Arc<Room>, request: ClaimRequest) -> Response {
    match room.claim_bingo(&request.player_id) {
        Ok(ClaimOutcome::Valid {
            board_id,
            line,
            prize,
        }) => success_response(
            StatusCode::OK,
            ClaimResponse::Valid {
                valid: true,
                board_id,
                line,
                prize,
            },
        ),
        Ok(ClaimOutcome::Invalid { message }) => success_response(
            StatusCode::OK,
            ClaimResponse::Invalid {
                valid: false,
                message,
            },
        ),
        Err(err) => room_error(err),
    }
}

/// **GET** `/api/room/state`. Public snapshot of the room.
pub async fn get_room_state(room: Arc<Room>) -> Response {
    match room.snapshot() {
        Ok(snapshot) => success_response(StatusCode::OK, snapshot),
        Err(err) => room_error(err),
    }
}

fn success_response<T>(status: StatusCode, body: T) -> Response
where
    T: Serialize,
{
    reply::with_status(reply::json(&body), status).into_response()
}

fn room_error(err: RoomError) -> Response {
    err.into_http_response()
}
