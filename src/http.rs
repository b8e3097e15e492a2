use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::{timeout, MissedTickBehavior};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{debug, warn};

use crate::broadcast::OutboundMessage;
use crate::command;
use crate::constants::{APP_NAME, LEADERBOARD_DEFAULT_LIMIT, LEADERBOARD_MAX_LIMIT};
use crate::protocol::{parse_client_message, ParsedClientMessage};
use crate::session;
use crate::state::SharedState;
use crate::types::{AppInfo, LeaderboardResponse, PlayerRank};

const HARDENING_HEADERS: [(&str, &str); 7] = [
    ("x-content-type-options", "nosniff"),
    ("x-xss-protection", "1; mode=block"),
    (
        "cache-control",
        "no-store, no-cache, must-revalidate, proxy-revalidate",
    ),
    ("pragma", "no-cache"),
    ("expires", "0"),
    ("surrogate-control", "no-store"),
    ("x-powered-by", "PHP 7.4.3"),
];

#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
    limit: Option<String>,
}

pub fn build_router(state: SharedState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/healthz", get(healthz))
        .route("/_api/app-info", get(app_info))
        .route("/_api/leaderboard", get(leaderboard_handler))
        .route("/_api/players/{id}/rank", get(rank_handler))
        .with_state(state);

    if let Some(dir) = static_dir {
        app = app
            .route_service("/", ServeFile::new(dir.join("index.html")))
            .nest_service("/public", ServeDir::new(dir));
    }

    let mut app = app.fallback(not_found);
    for (name, value) in HARDENING_HEADERS {
        app = app.layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }
    app
}

/// Accepts `dir` only when it actually holds an `index.html`.
pub fn resolve_static_dir(dir: Option<&Path>) -> Option<PathBuf> {
    let dir = dir?;
    if dir.join("index.html").is_file() {
        Some(dir.to_path_buf())
    } else {
        warn!(dir = %dir.display(), "static dir has no index.html, not serving pages");
        None
    }
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn app_info() -> impl IntoResponse {
    Json(AppInfo {
        app_name: APP_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Not Found",
    )
}

async fn leaderboard_handler(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> impl IntoResponse {
    let limit = parse_leaderboard_limit(query.limit.as_deref());
    let guard = state.lock().await;
    let mut entries = guard.world.leaderboard();
    let total = entries.len();
    entries.truncate(limit);
    Json(LeaderboardResponse {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        total,
        entries,
    })
}

async fn rank_handler(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<String>,
) -> axum::response::Response {
    let guard = state.lock().await;
    match guard.world.rank_of(&id) {
        Some(rank) => Json(PlayerRank { id, rank }).into_response(),
        None => not_found().await.into_response(),
    }
}

fn parse_leaderboard_limit(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(LEADERBOARD_DEFAULT_LIMIT)
        .clamp(1, LEADERBOARD_MAX_LIMIT)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let player_id = session::make_id("player");

    let (mut rx, settings) = {
        let mut guard = state.lock().await;
        let settings = guard.connection;
        let (tx, rx) = mpsc::channel::<OutboundMessage>(settings.queue_capacity);
        if let Err(error) = session::connect(&mut guard, &player_id, tx) {
            warn!(player_id = %player_id, %error, "failed to open session");
            return;
        }
        (rx, settings)
    };

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer_id = player_id.clone();
    let mut writer = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(settings.heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        heartbeat.tick().await;
        loop {
            let message = tokio::select! {
                outbound = rx.recv() => match outbound {
                    Some(OutboundMessage::Text(payload)) => Message::Text(payload.into()),
                    Some(OutboundMessage::Close) => {
                        let _ = timeout(settings.write_timeout, ws_sender.send(Message::Close(None))).await;
                        break;
                    }
                    None => break,
                },
                _ = heartbeat.tick() => Message::Ping(Bytes::new()),
            };
            match timeout(settings.write_timeout, ws_sender.send(message)).await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    debug!(player_id = %writer_id, %error, "socket write failed");
                    break;
                }
                Err(_) => {
                    debug!(player_id = %writer_id, "socket write timed out");
                    break;
                }
            }
        }
    });

    let mut writer_done = false;
    loop {
        tokio::select! {
            received = timeout(settings.client_timeout, ws_receiver.next()) => {
                let received = match received {
                    Ok(received) => received,
                    Err(_) => {
                        debug!(player_id = %player_id, "client went silent");
                        break;
                    }
                };
                let Some(Ok(message)) = received else {
                    break;
                };
                match message {
                    Message::Text(raw) => {
                        handle_client_frame(&state, &player_id, raw.as_str()).await;
                    }
                    Message::Binary(raw) => match std::str::from_utf8(&raw) {
                        Ok(text) => handle_client_frame(&state, &player_id, text).await,
                        Err(_) => debug!(player_id = %player_id, "ignoring non-utf8 binary frame"),
                    },
                    Message::Close(_) => break,
                    // Pongs and pings only prove liveness.
                    _ => {}
                }
            }
            _ = &mut writer => {
                writer_done = true;
                break;
            }
        }
    }

    {
        let mut guard = state.lock().await;
        session::disconnect(&mut guard, &player_id);
    }
    if !writer_done && timeout(settings.write_timeout, &mut writer).await.is_err() {
        writer.abort();
    }
}

async fn handle_client_frame(state: &SharedState, player_id: &str, raw: &str) {
    let Some(message) = parse_client_message(raw) else {
        debug!(player_id, "ignoring unrecognised client frame");
        return;
    };
    match message {
        ParsedClientMessage::MovePlayer(intent) => {
            let mut guard = state.lock().await;
            command::handle_move(&mut guard, player_id, intent);
        }
    }
}
