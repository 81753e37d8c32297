use axum::{
  extract::{Path, State, WebSocketUpgrade},
  http::{Method, StatusCode},
  response::IntoResponse,
  routing::get,
  Json, Router,
};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod game;
mod protocol;
mod transport;

use config::EngineConfig;
use game::room::Room;

struct AppState {
  rooms: DashMap<String, Arc<Room>>,
  config: EngineConfig,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
  ok: bool,
  rooms: usize,
}

#[derive(Debug, Serialize)]
struct RoomResponse {
  ok: bool,
  sessions: usize,
  segments: usize,
  score: i64,
  head: Option<game::types::SegmentId>,
  bonus: usize,
  merging: bool,
  path_points: usize,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
  ok: bool,
  error: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = EngineConfig::from_env()?;
  let port = config.port;
  tracing::info!(?config, "engine configured");

  let state = Arc::new(AppState {
    rooms: DashMap::new(),
    config,
  });

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET])
    .allow_headers(Any);

  let app: Router = Router::new()
    .route("/api/health", get(health))
    .route("/api/room/:room", get(ws_handler))
    .route("/api/room/:room/stats", get(room_stats))
    .layer(cors)
    .with_state(state);

  let address = format!("0.0.0.0:{port}");
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address).await?;
  axum::serve(listener, app).await?;

  Ok(())
}

impl AppState {
  fn room(&self, name: String) -> Arc<Room> {
    match self.rooms.entry(name) {
      dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
      dashmap::mapref::entry::Entry::Vacant(entry) => {
        tracing::info!(room = %entry.key(), "room created");
        let room = Arc::new(Room::new(self.config.clone()));
        entry.insert(room.clone());
        room
      }
    }
  }
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthResponse {
    ok: true,
    rooms: state.rooms.len(),
  })
}

async fn room_stats(
  Path(room): Path<String>,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  let name = app::room_name::sanitize_room_name(&room);
  let Some(room) = state.rooms.get(&name).map(|entry| entry.value().clone()) else {
    return (
      StatusCode::NOT_FOUND,
      Json(ErrorResponse {
        ok: false,
        error: "Room not found".to_string(),
      }),
    )
      .into_response();
  };
  let stats = room.stats().await;
  Json(RoomResponse {
    ok: true,
    sessions: stats.sessions,
    segments: stats.segments,
    score: stats.score,
    head: stats.head,
    bonus: stats.bonus,
    merging: stats.merging,
    path_points: stats.path_points,
  })
  .into_response()
}

async fn ws_handler(
  ws: WebSocketUpgrade,
  Path(room): Path<String>,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  let room = state.room(app::room_name::sanitize_room_name(&room));
  ws.on_upgrade(move |socket| transport::ws_session::handle_socket(socket, room))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn make_state() -> Arc<AppState> {
    Arc::new(AppState {
      rooms: DashMap::new(),
      config: EngineConfig::default(),
    })
  }

  #[tokio::test]
  async fn stats_for_unknown_room_is_not_found_and_creates_nothing() {
    let state = make_state();
    for name in ["ghost-a", "ghost-b", "ghost-c"] {
      let response = room_stats(Path(name.to_string()), State(state.clone()))
        .await
        .into_response();
      assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
    assert_eq!(state.rooms.len(), 0);
  }

  #[tokio::test]
  async fn stats_for_existing_room_reports_it() {
    let state = make_state();
    state.room("lobby".to_string());
    let response = room_stats(Path("lobby".to_string()), State(state.clone()))
      .await
      .into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.rooms.len(), 1);
  }
}
