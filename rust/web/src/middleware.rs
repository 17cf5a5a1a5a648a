use std::time::Instant;
use warp::reject::Rejection;
use warp::reply::Reply;
use warp::Filter;

/// Wraps a filter with request/response logging.
pub fn with_request_logging<F, T>(
    filter: F,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone
where
    F: Filter<Extract = (T,), Error = Rejection> + Clone + Send + Sync + 'static,
    T: Reply,
{
    warp::any()
        .and(warp::path::full())
        .and(warp::method())
        .map(|path: warp::path::FullPath, method: warp::http::Method| {
            let start = Instant::now();
            tracing::info!(
                path = %path.as_str(),
                method = %method,
                "incoming request"
            );
            start
        })
        .and(filter)
        .map(|start: Instant, reply: T| {
            let duration = start.elapsed();
            tracing::info!(duration_ms = duration.as_millis(), "request completed");
            reply
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::http::StatusCode;

    #[tokio::test]
    async fn logged_route_still_replies() {
        let route = warp::path!("test")
            .and(warp::get())
            .map(|| warp::reply::json(&"success"));

        let logged_route = with_request_logging(route);

        let response = warp::test::request()
            .method("GET")
            .path("/test")
            .reply(&logged_route)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "\"success\"");
    }
}
