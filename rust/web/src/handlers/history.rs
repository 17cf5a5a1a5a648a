use crate::errors::ErrorResponse;
use crate::history::RoundHistoryStore;
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct GetHistoryQuery {
    pub limit: Option<usize>,
}

/// **GET** `/api/history?limit=N`. Recent round outcomes, newest first.
pub async fn get_recent_rounds(history: Arc<RoundHistoryStore>, query: GetHistoryQuery) -> Response {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    match history.recent(limit) {
        Ok(rounds) => reply::json(&rounds).into_response(),
        Err(err) => storage_error(err.to_string()),
    }
}

/// **GET** `/api/history/stats`. Aggregates over the retained window.
pub async fn get_statistics(history: Arc<RoundHistoryStore>) -> Response {
    match history.stats() {
        Ok(stats) => reply::json(&stats).into_response(),
        Err(err) => storage_error(err.to_string()),
    }
}

fn storage_error(message: String) -> Response {
    ErrorResponse::new("history_error", message).into_response(StatusCode::INTERNAL_SERVER_ERROR)
}
