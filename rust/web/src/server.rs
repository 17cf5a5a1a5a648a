use crate::events::EventBus;
use crate::handlers;
use crate::history::RoundHistoryStore;
use crate::metrics::MetricsCollector;
use crate::middleware::with_request_logging;
use crate::room::{Room, RoomConfig, RoomError};
use bingo_engine::catalog::BoardCatalog;
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::reply::Reply;
use warp::Filter;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
    room: RoomConfig,
    allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16, room: RoomConfig) -> Self {
        Self {
            host: host.into(),
            port,
            room,
            allowed_origins: Vec::new(),
        }
    }

    pub fn for_tests() -> Self {
        Self::new("127.0.0.1", 0, RoomConfig::for_tests())
    }

    /// Restricts CORS to the given origins. An empty list allows any origin.
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn room(&self) -> &RoomConfig {
        &self.room
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }
}

#[derive(Clone)]
pub struct AppContext {
    config: ServerConfig,
    event_bus: EventBus,
    room: Arc<Room>,
    history: Arc<RoundHistoryStore>,
    metrics: MetricsCollector,
}

impl AppContext {
    pub fn new(config: ServerConfig, catalog: BoardCatalog) -> Self {
        let event_bus = EventBus::new();
        let metrics = MetricsCollector::new();
        let history = Arc::new(RoundHistoryStore::new());
        let room = Arc::new(Room::new(
            config.room().clone(),
            Arc::new(catalog),
            event_bus.clone(),
            metrics.clone(),
            Arc::clone(&history),
        ));

        Self {
            config,
            event_bus,
            room,
            history,
            metrics,
        }
    }

    pub fn new_for_tests() -> Self {
        Self::new(ServerConfig::for_tests(), BoardCatalog::sample())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn event_bus(&self) -> EventBus {
        self.event_bus.clone()
    }

    pub fn room(&self) -> Arc<Room> {
        Arc::clone(&self.room)
    }

    pub fn history(&self) -> Arc<RoundHistoryStore> {
        Arc::clone(&self.history)
    }

    pub fn metrics(&self) -> MetricsCollector {
        self.metrics.clone()
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Room error: {0}")]
    RoomError(#[from] RoomError),
}

#[derive(Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: ServerConfig, catalog: BoardCatalog) -> Self {
        Self {
            context: AppContext::new(config, catalog),
        }
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let config = context.config().clone();
        let bind_addr = Self::bind_addr(&config)?;

        let preflight = if bind_addr.port() != 0 {
            Some(std::net::TcpListener::bind(bind_addr).map_err(ServerError::BindError)?)
        } else {
            None
        };
        drop(preflight);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let routes = with_request_logging(Self::routes(&context)).with(Self::cors(&config));
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        context.room().open()?;
        tracing::info!(address = %addr, "web server listening");

        let task = tokio::spawn(async move {
            server_future.await;
            Ok(())
        });

        Ok(ServerHandle::new(addr, shutdown_tx, task, context))
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        if let Some(source) = err.source() {
            if let Some(io_err) = source.downcast_ref::<std::io::Error>() {
                let recreated = std::io::Error::new(io_err.kind(), io_err.to_string());
                return ServerError::BindError(recreated);
            }
        }

        ServerError::ConfigError(err.to_string())
    }

    fn cors(config: &ServerConfig) -> warp::filters::cors::Cors {
        let mut cors = warp::cors()
            .allow_methods(vec!["GET", "POST"])
            .allow_headers(vec!["content-type"]);

        if config.allowed_origins().is_empty() {
            cors = cors.allow_any_origin();
        } else {
            for origin in config.allowed_origins() {
                cors = cors.allow_origin(origin.as_str());
            }
        }

        cors.build()
    }

    fn routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let health = Self::health_route(context);
        let api_routes = Self::api_routes(context);
        let history_routes = Self::history_routes(context);
        let sse_routes = Self::sse_routes(context);

        health
            .or(api_routes)
            .unify()
            .or(history_routes)
            .unify()
            .or(sse_routes)
            .unify()
            .boxed()
    }

    fn health_route(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let health = warp::path("health")
            .and(warp::get())
            .and(warp::path::end())
            .map(|| handlers::health().into_response());

        let metrics = warp::path!("api" / "metrics")
            .and(warp::get())
            .and(Self::with_metrics(context.metrics()))
            .map(|metrics: MetricsCollector| handlers::get_metrics(metrics).into_response());

        health.or(metrics).unify().boxed()
    }

    fn api_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let room = context.room();

        let picks = warp::path!("api" / "room" / "picks")
            .and(warp::post())
            .and(Self::with_room(room.clone()))
            .and(warp::body::json())
            .and_then(
                |room: Arc<Room>, request: handlers::SelectPicksRequest| async move {
                    let response = handlers::select_picks(room, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let start = warp::path!("api" / "room" / "start")
            .and(warp::post())
            .and(Self::with_room(room.clone()))
            .and(warp::body::json())
            .and_then(
                |room: Arc<Room>, request: handlers::StartRequest| async move {
                    let response = handlers::request_start(room, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let stake = warp::path!("api" / "room" / "stake")
            .and(warp::post())
            .and(Self::with_room(room.clone()))
            .and(warp::body::json())
            .and_then(
                |room: Arc<Room>, request: handlers::StakeRequest| async move {
                    let response = handlers::set_stake(room, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let claim = warp::path!("api" / "room" / "claim")
            .and(warp::post())
            .and(Self::with_room(room.clone()))
            .and(warp::body::json())
            .and_then(
                |room: Arc<Room>, request: handlers::ClaimRequest| async move {
                    let response = handlers::claim_bingo(room, request).await;
                    Ok::<_, Infallible>(response)
                },
            );

        let state = warp::path!("api" / "room" / "state")
            .and(warp::get())
            .and(Self::with_room(room))
            .and_then(|room: Arc<Room>| async move {
                let response = handlers::get_room_state(room).await;
                Ok::<_, Infallible>(response)
            });

        picks
            .or(start)
            .unify()
            .or(stake)
            .unify()
            .or(claim)
            .unify()
            .or(state)
            .unify()
            .boxed()
    }

    fn sse_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let room = context.room();
        let event_bus = context.event_bus();

        warp::path!("api" / "room" / "events")
            .and(warp::get())
            .and(Self::with_room(room))
            .and(Self::with_event_bus(event_bus))
            .and_then(|room: Arc<Room>, event_bus: EventBus| async move {
                let response = handlers::stream_room_events(room, event_bus).await;
                Ok::<_, Infallible>(response)
            })
            .boxed()
    }

    fn history_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let history = context.history();

        let stats = warp::path!("api" / "history" / "stats")
            .and(warp::get())
            .and(Self::with_history_store(history.clone()))
            .and_then(|history: Arc<RoundHistoryStore>| async move {
                let response = handlers::get_statistics(history).await;
                Ok::<_, Infallible>(response)
            });

        let recent = warp::path!("api" / "history")
            .and(warp::get())
            .and(warp::query::<handlers::history::GetHistoryQuery>())
            .and(Self::with_history_store(history))
            .and_then(
                |query: handlers::history::GetHistoryQuery,
                 history: Arc<RoundHistoryStore>| async move {
                    let response = handlers::get_recent_rounds(history, query).await;
                    Ok::<_, Infallible>(response)
                },
            );

        stats.or(recent).unify().boxed()
    }

    fn with_room(room: Arc<Room>) -> impl Filter<Extract = (Arc<Room>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&room))
    }

    fn with_event_bus(
        event_bus: EventBus,
    ) -> impl Filter<Extract = (EventBus,), Error = Infallible> + Clone {
        warp::any().map(move || event_bus.clone())
    }

    fn with_history_store(
        history: Arc<RoundHistoryStore>,
    ) -> impl Filter<Extract = (Arc<RoundHistoryStore>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&history))
    }

    fn with_metrics(
        metrics: MetricsCollector,
    ) -> impl Filter<Extract = (MetricsCollector,), Error = Infallible> + Clone {
        warp::any().map(move || metrics.clone())
    }
}

pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
    context: AppContext,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<Result<(), ServerError>>,
        context: AppContext,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
            context,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(result) => result?,
                Err(err) => {
                    return Err(ServerError::ConfigError(format!(
                        "server task join error: {err}"
                    )))
                }
            }
        }

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
