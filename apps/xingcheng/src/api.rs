//! # HTTP API
//!
//! JSON API over a single save profile, for a map front-end.
//!
//! Every mutating route runs one [`GameSession`] action under the state
//! lock, persists the profile through the configured store and answers
//! with the action's [`Report`]. A background task ticks a running
//! excavation once per `tick_interval_ms`; clients poll `GET /excavation`
//! for the countdown and the result of the last dig.

use crate::cli::DynStore;
use crate::config::ServerConfig;
use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{HeaderMap, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use serde_json::{Value, json};
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use xingcheng_core::achievements;
use xingcheng_core::report::ProfileSummary;
use xingcheng_core::{
    Catalog, Coordinate, CoreError, GameConfig, GameEvent, GameSession, ItemId, MarketFilter,
    ProfileStore, Report, UserProfile,
};

// =============================================================================
// ERRORS
// =============================================================================

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(CoreError::InvalidCoordinate { .. } | CoreError::UnknownRarity(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Core(CoreError::UnknownItem(_)) => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::InsufficientCurrency { .. }) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Core(CoreError::ExcavationInProgress { .. }) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Core(_) | ApiError::Io(_) | ApiError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// =============================================================================
// STATE
// =============================================================================

struct Game {
    session: GameSession,
    last_dig: Option<Report>,
}

/// Shared server state: the one session, its store and the server config.
///
/// The live session only changes after the store has accepted the new
/// profile, so a failed save leaves the game exactly as it was.
pub struct AppState {
    game: Mutex<Game>,
    store: Arc<dyn ProfileStore + Send + Sync>,
    config: ServerConfig,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl AppState {
    /// Load the saved profile (or a new one), run the launch check and
    /// persist its result.
    pub fn new(
        store: DynStore,
        config: ServerConfig,
        rules: GameConfig,
    ) -> Result<Self, CoreError> {
        let profile = store.load_or_initial()?;
        let mut session = GameSession::new(profile, Catalog::standard(), rules)?;
        for event in session.start() {
            tracing::info!(%event, "launch check");
        }
        store.save(session.profile())?;

        let limiter = NonZeroU32::new(config.rate_limit_per_sec)
            .map(|rate| RateLimiter::direct(Quota::per_second(rate)));

        Ok(Self {
            game: Mutex::new(Game {
                session,
                last_dig: None,
            }),
            store: Arc::from(store),
            config,
            limiter,
        })
    }

    /// Save on the blocking pool; the store does file or redb I/O.
    async fn persist(&self, profile: &UserProfile) -> Result<(), ApiError> {
        let store = Arc::clone(&self.store);
        let profile = profile.clone();
        tokio::task::spawn_blocking(move || store.save(&profile)).await??;
        Ok(())
    }

    /// Run an action on a copy of the session, persist it, then commit.
    async fn act<F>(&self, action: &str, f: F) -> Result<Report, ApiError>
    where
        F: FnOnce(&mut GameSession) -> Result<Vec<GameEvent>, CoreError>,
    {
        let mut game = self.game.lock().await;
        let mut next = game.session.clone();
        let events = f(&mut next)?;
        self.persist(next.profile()).await?;
        game.session = next;
        tracing::info!(action, events = events.len(), "action applied");
        Ok(Report::new(action, events, game.session.profile()))
    }

    /// Advance a running excavation by one tick. Returns the report when
    /// the dig finished on this tick.
    ///
    /// The countdown itself is not persisted. A finished dig is committed
    /// only once saved; on a failed save the dig stays on its last second
    /// and resolves again on the next tick.
    pub async fn tick_excavation(&self) -> Result<Option<Report>, ApiError> {
        let mut game = self.game.lock().await;
        if game.session.excavation().is_none() {
            return Ok(None);
        }

        let mut next = game.session.clone();
        // ThreadRng is not Send; keep it inside this synchronous block
        let events = {
            let mut rng = rand::rng();
            next.tick_excavation(&mut rng)
        };
        if next.excavation().is_some() {
            game.session = next;
            return Ok(None);
        }

        self.persist(next.profile()).await?;
        game.session = next;
        let report = Report::new("excavate", events, game.session.profile());
        for line in &report.notifications {
            tracing::info!(notification = %line, "excavation finished");
        }
        game.last_dig = Some(report.clone());
        Ok(Some(report))
    }
}

/// Spawn the excavation countdown timer.
pub fn spawn_excavation_ticker(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    let period = Duration::from_millis(state.config.tick_interval_ms.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = state.tick_excavation().await {
                tracing::error!(error = %e, "excavation tick failed");
            }
        }
    })
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the router. `/health` skips authentication; `/debug/*` is only
/// mounted when enabled.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut protected: Router<Arc<AppState>> = Router::new()
        .route("/profile", get(profile))
        .route("/location", post(set_location))
        .route("/check-in", post(check_in))
        .route("/excavation", post(start_excavation).get(excavation_status))
        .route("/market", get(market))
        .route("/market/buy", post(buy))
        .route("/museum", get(museum))
        .route("/oracle", get(oracle))
        .route("/achievements", get(achievement_list))
        .route("/tasks/walk", get(walk));

    if state.config.enable_debug {
        protected = protected
            .route("/debug/xp", post(debug_xp))
            .route("/debug/currency", post(debug_currency))
            .route("/debug/teleport", post(debug_teleport))
            .route("/debug/reset", post(debug_reset));
    }

    let protected =
        protected.route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn run(config: ServerConfig, store: DynStore, rules: GameConfig) -> Result<(), ApiError> {
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(store, config, rules)?);
    let ticker = spawn_excavation_ticker(state.clone());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "HTTP API listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");
        })
        .await?;

    ticker.abort();
    Ok(())
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

fn key_matches(expected: &str, headers: &HeaderMap) -> bool {
    let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return false;
    };
    token.as_bytes().ct_eq(expected.as_bytes()).into()
}

async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = &state.config.api_key
        && !key_matches(expected, request.headers())
    {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(limiter) = &state.limiter
        && limiter.check().is_err()
    {
        return Err(ApiError::RateLimited);
    }
    Ok(next.run(request).await)
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

#[derive(Debug, Deserialize)]
struct LocationRequest {
    lat: f64,
    lng: f64,
    /// Jump without counting the distance as walked.
    #[serde(default)]
    teleport: bool,
}

#[derive(Debug, Deserialize)]
struct BuyRequest {
    item_id: String,
}

#[derive(Debug, Deserialize)]
struct MarketQuery {
    rarity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AmountRequest {
    amount: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TeleportRequest {
    lat: f64,
    lng: f64,
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn profile(State(state): State<Arc<AppState>>) -> Json<Value> {
    let game = state.game.lock().await;
    let profile = game.session.profile();
    Json(json!({
        "profile": profile,
        "summary": ProfileSummary::from(profile),
        "position": game.session.position(),
    }))
}

async fn set_location(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LocationRequest>,
) -> Result<Json<Report>, ApiError> {
    let to = Coordinate::new(body.lat, body.lng)?;
    let report = if body.teleport {
        state.act("teleport", |s| Ok(s.teleport(to))).await?
    } else {
        state.act("goto", |s| Ok(s.move_to(to))).await?
    };
    Ok(Json(report))
}

async fn check_in(State(state): State<Arc<AppState>>) -> Result<Json<Report>, ApiError> {
    Ok(Json(state.act("check-in", |s| Ok(s.check_in())).await?))
}

async fn start_excavation(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let report = state
        .act("excavate", GameSession::start_excavation)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(report)))
}

async fn excavation_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let game = state.game.lock().await;
    let dig = game.session.excavation();
    Json(json!({
        "active": dig.is_some(),
        "duration": dig.map(|d| d.duration()),
        "progress": dig.map(|d| d.progress()),
        "last": game.last_dig,
    }))
}

async fn market(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = MarketFilter::from_str(query.rarity.as_deref().unwrap_or("all"))?;
    let game = state.game.lock().await;
    Ok(Json(json!({
        "currency": game.session.profile().currency,
        "items": game.session.catalog().market(filter),
    })))
}

async fn buy(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BuyRequest>,
) -> Result<Json<Report>, ApiError> {
    let id = ItemId::new(body.item_id);
    Ok(Json(state.act("buy", |s| s.buy_item(&id)).await?))
}

async fn museum(State(state): State<Arc<AppState>>) -> Json<Value> {
    let game = state.game.lock().await;
    let view = game.session.profile().museum_view(game.session.catalog());
    Json(json!({ "museum": view }))
}

async fn oracle(State(state): State<Arc<AppState>>) -> Json<Value> {
    // The lock is not held while divining
    tokio::time::sleep(Duration::from_millis(state.config.oracle_delay_ms)).await;
    let game = state.game.lock().await;
    Json(json!({
        "position": game.session.position(),
        "lore": game.session.consult_oracle(),
    }))
}

async fn achievement_list(State(state): State<Arc<AppState>>) -> Json<Value> {
    let game = state.game.lock().await;
    let statuses = achievements::status_list(game.session.profile(), game.session.catalog());
    Json(json!({ "achievements": statuses }))
}

async fn walk(State(state): State<Arc<AppState>>) -> Json<Value> {
    let game = state.game.lock().await;
    Json(json!({ "walk": game.session.daily_walk() }))
}

// -----------------------------------------------------------------------------
// Debug panel
// -----------------------------------------------------------------------------

async fn debug_xp(
    State(state): State<Arc<AppState>>,
    body: Option<Json<AmountRequest>>,
) -> Result<Json<Report>, ApiError> {
    let amount = body.unwrap_or_default().0.amount;
    Ok(Json(state.act("debug xp", |s| Ok(s.grant_xp(amount))).await?))
}

async fn debug_currency(
    State(state): State<Arc<AppState>>,
    body: Option<Json<AmountRequest>>,
) -> Result<Json<Report>, ApiError> {
    let amount = body.unwrap_or_default().0.amount;
    Ok(Json(
        state
            .act("debug currency", |s| Ok(s.grant_currency(amount)))
            .await?,
    ))
}

async fn debug_teleport(
    State(state): State<Arc<AppState>>,
    body: Option<Json<TeleportRequest>>,
) -> Result<Json<Report>, ApiError> {
    let to = match body {
        Some(Json(TeleportRequest { lat, lng })) => Coordinate::new(lat, lng)?,
        None => Coordinate::forbidden_city(),
    };
    Ok(Json(
        state.act("debug teleport", |s| Ok(s.teleport(to))).await?,
    ))
}

async fn debug_reset(State(state): State<Arc<AppState>>) -> Result<Json<Report>, ApiError> {
    let report = state.act("debug reset", |s| Ok(s.reset())).await?;
    state.game.lock().await.last_dig = None;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(auth: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(auth));
        headers
    }

    #[test]
    fn bearer_key_must_match_exactly() {
        assert!(key_matches("secret", &headers_with("Bearer secret")));
        assert!(!key_matches("secret", &headers_with("Bearer secre")));
        assert!(!key_matches("secret", &headers_with("Bearer secret2")));
        assert!(!key_matches("secret", &headers_with("secret")));
        assert!(!key_matches("secret", &HeaderMap::new()));
    }

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (CoreError::UnknownItem("x".into()), StatusCode::NOT_FOUND),
            (CoreError::UnknownRarity("x".into()), StatusCode::BAD_REQUEST),
            (
                CoreError::InsufficientCurrency {
                    needed: 10,
                    available: 1,
                },
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                CoreError::ExcavationInProgress { remaining: 3 },
                StatusCode::CONFLICT,
            ),
            (CoreError::InvalidHeader, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[tokio::test]
    async fn health_skips_auth_but_profile_does_not() {
        use tower::ServiceExt;

        let dir = tempfile::tempdir().expect("temp dir");
        let store = Box::new(xingcheng_core::JsonFileStore::new(dir.path().join("save.json")));
        let config = ServerConfig {
            api_key: Some("k".to_string()),
            ..ServerConfig::default()
        };
        let state = AppState::new(store, config, GameConfig::default()).expect("app state");
        let app = create_router(Arc::new(state));

        let cases = [
            ("/health", StatusCode::OK),
            ("/profile", StatusCode::UNAUTHORIZED),
        ];
        for (uri, expected) in cases {
            let request = axum::http::Request::builder()
                .uri(uri)
                .body(axum::body::Body::empty())
                .expect("request");
            let response = match app.clone().oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            };
            assert_eq!(response.status(), expected, "{uri}");
        }
    }
}
