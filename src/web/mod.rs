use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{
    net::TcpListener,
    sync::{broadcast, watch},
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, info};

use crate::{
    advisor::{consult, Advisor, CityBriefing},
    error::PlacementError,
    session::Session,
    tools::{catalog, Tool, ToolInfo},
    world::{CityStats, WorldSnapshot},
};

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub tick_rate_ms: u64,
    pub snapshot: WorldSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct PlaceRequest {
    pub tool: Tool,
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Deserialize)]
pub struct PauseRequest {
    pub paused: bool,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize)]
struct BriefingResponse {
    briefing: CityBriefing,
    prompt: String,
}

#[derive(Serialize)]
struct AdviceResponse {
    advice: String,
}

struct AppState {
    session: Arc<Mutex<Session>>,
    broadcaster: broadcast::Sender<String>,
    tick_rate_ms: u64,
    advisor: Option<Arc<dyn Advisor>>,
}

impl AppState {
    fn envelope(&self) -> StateEnvelope {
        let session = self.session.lock().expect("session lock poisoned");
        StateEnvelope {
            tick_rate_ms: self.tick_rate_ms,
            snapshot: session.snapshot(),
        }
    }
}

pub struct WebServerConfig {
    pub session: Session,
    pub tick_rate_ms: u64,
    pub host: String,
    pub port: u16,
    pub advisor: Option<Arc<dyn Advisor>>,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        session,
        tick_rate_ms,
        host,
        port,
        advisor,
    } = config;

    let (tx, _) = broadcast::channel::<String>(512);
    let (halt_tx, halt_rx) = watch::channel::<Option<String>>(None);
    let session = Arc::new(Mutex::new(session));

    tokio::spawn(drive_ticks(session.clone(), tx.clone(), tick_rate_ms, halt_tx));

    let state = Arc::new(AppState {
        session,
        broadcaster: tx,
        tick_rate_ms,
        advisor,
    });

    let router = Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/tools", get(tools))
        .route("/api/tool", post(place_tool))
        .route("/api/pause", post(set_paused))
        .route("/api/briefing", get(briefing))
        .route("/api/advice", get(advice))
        .route("/api/events", get(stream_events))
        .with_state(state);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("city server listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(halt_rx.clone()))
        .await?;

    let halted = halt_rx.borrow().clone();
    if let Some(reason) = halted {
        bail!("simulation halted: {reason}");
    }
    Ok(())
}

/// Steps the session on a fixed cadence. Placements take the same lock, so
/// they always land between two ticks. A failed step is published on `halt`
/// and ends the loop.
async fn drive_ticks(
    session: Arc<Mutex<Session>>,
    tx: broadcast::Sender<String>,
    tick_rate_ms: u64,
    halt: watch::Sender<Option<String>>,
) {
    let mut interval = tokio::time::interval(Duration::from_millis(tick_rate_ms.max(1)));
    interval.tick().await;
    loop {
        interval.tick().await;
        let payload = {
            let mut session = session.lock().expect("session lock poisoned");
            match session.tick() {
                Ok(true) => serde_json::to_string(&session.snapshot()).ok(),
                Ok(false) => None,
                Err(err) => {
                    let reason = format!("{err:#}");
                    error!(%reason, "simulation halted");
                    let _ = halt.send(Some(reason));
                    return;
                }
            }
        };
        if let Some(payload) = payload {
            let _ = tx.send(payload);
        }
    }
}

/// Resolves on ctrl-c or once the ticker reports a halt.
async fn shutdown_signal(mut halt: watch::Receiver<Option<String>>) {
    let halted = async move {
        while halt.changed().await.is_ok() {
            if halt.borrow().is_some() {
                break;
            }
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = halted => {}
    }
    info!("shutting down city server");
}

pub fn placement_status(err: &PlacementError) -> StatusCode {
    match err {
        PlacementError::OutOfBounds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PlacementError::InsufficientFunds { .. }
        | PlacementError::AlreadyZoned { .. }
        | PlacementError::Occupied { .. } => StatusCode::CONFLICT,
    }
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    Json(state.envelope())
}

async fn tools() -> Json<Vec<ToolInfo>> {
    Json(catalog())
}

async fn place_tool(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlaceRequest>,
) -> Result<Json<CityStats>, (StatusCode, Json<ErrorBody>)> {
    let mut session = state.session.lock().expect("session lock poisoned");
    match session.place(request.x, request.y, request.tool) {
        Ok(()) => Ok(Json(*session.world().stats())),
        Err(err) => Err((
            placement_status(&err),
            Json(ErrorBody {
                error: err.to_string(),
            }),
        )),
    }
}

async fn set_paused(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PauseRequest>,
) -> Json<StateEnvelope> {
    state
        .session
        .lock()
        .expect("session lock poisoned")
        .set_paused(request.paused);
    Json(state.envelope())
}

async fn briefing(State(state): State<Arc<AppState>>) -> Json<BriefingResponse> {
    let briefing = state.session.lock().expect("session lock poisoned").briefing();
    let prompt = briefing.prompt();
    Json(BriefingResponse { briefing, prompt })
}

async fn advice(State(state): State<Arc<AppState>>) -> Json<AdviceResponse> {
    let briefing = state.session.lock().expect("session lock poisoned").briefing();
    let advice = consult(state.advisor.as_deref(), &briefing).await;
    Json(AdviceResponse { advice })
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
