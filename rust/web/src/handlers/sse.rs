use crate::errors::IntoErrorResponse;
use crate::events::{EventBus, EventSubscription, GameEvent};
use crate::room::Room;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use warp::http;
use warp::reply::{self, Response};
use warp::sse;
use warp::Reply;

/// **GET** `/api/room/events`. Opens the SSE stream and joins the room.
///
/// Connecting is joining: the player is admitted before the stream starts,
/// receives an `init` event as the first message, and leaves when the
/// stream closes. There is no separate join or leave endpoint.
pub async fn stream_room_events(room: Arc<Room>, event_bus: EventBus) -> Response {
    let info = match room.join() {
        Ok(info) => info,
        Err(err) => return err.into_http_response(),
    };

    let subscription = event_bus.subscribe();
    event_bus.send_to(
        subscription.subscriber_id(),
        GameEvent::Init {
            player_id: info.player_id.clone(),
            phase: info.phase,
            countdown_remaining: info.countdown_remaining,
            stake: info.stake,
            prize: info.prize,
            call_history: info.call_history,
        },
    );

    let membership = RoomMembership {
        room,
        player_id: info.player_id,
    };
    let stream = subscription_stream(subscription, membership);
    let keep_alive = sse::keep_alive()
        .interval(Duration::from_secs(15))
        .text(":keep-alive\n");

    let reply = sse::reply(keep_alive.stream(stream));
    reply::with_header(reply, http::header::CACHE_CONTROL, "no-cache").into_response()
}

/// Removes the player from the room when its stream is dropped.
struct RoomMembership {
    room: Arc<Room>,
    player_id: String,
}

impl Drop for RoomMembership {
    fn drop(&mut self) {
        if let Err(err) = self.room.leave(&self.player_id) {
            tracing::error!(player_id = %self.player_id, error = %err, "failed to remove player on disconnect");
        }
    }
}

fn subscription_stream(
    subscription: EventSubscription,
    membership: RoomMembership,
) -> impl tokio_stream::Stream<Item = Result<sse::Event, Infallible>> {
    let mut subscription = subscription;
    let (_placeholder_tx, placeholder_rx) = mpsc::channel(1);
    let receiver = std::mem::replace(&mut subscription.receiver, placeholder_rx);
    // The guards ride along in the map closure so subscription and
    // membership drop when the client disconnects and the stream is freed.
    let guards = Arc::new((subscription, membership));

    ReceiverStream::new(receiver).map(move |event| {
        let _keep_alive = Arc::clone(&guards);
        Ok(render_event(event))
    })
}

fn render_event(event: GameEvent) -> sse::Event {
    match serde_json::to_string(&event) {
        Ok(json) => sse::Event::default().event("game_event").data(json),
        Err(err) => {
            let fallback = serde_json::json!({
                "type": "error",
                "message": format!("failed to serialize game event: {err}")
            })
            .to_string();
            sse::Event::default().event("game_event").data(fallback)
        }
    }
}
