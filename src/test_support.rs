//! Shared fixtures for unit tests: a local StatsAPI stand-in and a scripted model.

use crate::agent::{ChatModel, Exchange, ModelReply, ToolCallRequest};
use crate::error::{BullpenError, Result};
use crate::statsapi::{ResponseCache, RetryPolicy, StatsClient};
use crate::tools::{ToolDefinition, ToolDispatcher};
use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct StubState {
    hits: Arc<Mutex<Vec<String>>>,
    flaky_calls: Arc<AtomicU32>,
}

impl StubState {
    fn record(&self, uri: &Uri) {
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());
        self.hits.lock().unwrap().push(path);
    }
}

/// StatsAPI stand-in served by axum on an ephemeral local port.
pub struct StubUpstream {
    pub base_url: String,
    state: StubState,
}

impl StubUpstream {
    pub async fn spawn() -> Self {
        let state = StubState::default();

        let app = Router::new()
            .route("/schedule", get(schedule))
            .route("/teams/{team_id}/stats", get(team_stats))
            .route("/people/search", get(people_search))
            .route("/people/{person_id}/stats", get(person_stats))
            .route("/game/{game_pk}/linescore", get(linescore))
            .route("/unavailable", get(unavailable))
            .route("/flaky", get(flaky))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Path and query of every request received, in order.
    pub fn hits(&self) -> Vec<String> {
        self.state.hits.lock().unwrap().clone()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn hit_count(&self, prefix: &str) -> usize {
        self.hits().iter().filter(|h| h.starts_with(prefix)).count()
    }

    /// Client with a fresh cache and fast retries.
    pub fn client(&self) -> StatsClient {
        StatsClient::with_policy(
            &self.base_url,
            Duration::from_secs(2),
            RetryPolicy::new(3, Duration::from_millis(10)),
            Arc::new(ResponseCache::new(Duration::from_secs(60))),
        )
        .unwrap()
    }

    pub fn dispatcher(&self) -> ToolDispatcher {
        ToolDispatcher::new(Arc::new(self.client()))
    }
}

async fn schedule(State(state): State<StubState>, uri: Uri) -> Json<Value> {
    state.record(&uri);
    Json(json!({
        "copyright": "Copyright 2024 MLB Advanced Media, L.P.",
        "totalGames": 1,
        "dates": [{
            "date": "2024-05-01",
            "games": [{
                "gamePk": 745000,
                "teams": {
                    "away": {"team": {"id": 147, "name": "New York Yankees"}},
                    "home": {"team": {"id": 110, "name": "Baltimore Orioles"}}
                }
            }]
        }]
    }))
}

async fn team_stats(
    State(state): State<StubState>,
    Path(team_id): Path<u32>,
    uri: Uri,
) -> Json<Value> {
    state.record(&uri);
    Json(json!({
        "stats": [
            {"group": {"displayName": "hitting"}, "splits": [{"team": {"id": team_id}, "stat": {"avg": ".254"}}]},
            {"group": {"displayName": "pitching"}, "splits": [{"team": {"id": team_id}, "stat": {"era": "3.74"}}]}
        ]
    }))
}

async fn people_search(State(state): State<StubState>, uri: Uri) -> Json<Value> {
    state.record(&uri);
    Json(json!({
        "people": [{"id": 592450, "fullName": "Aaron Judge"}]
    }))
}

async fn person_stats(
    State(state): State<StubState>,
    Path(person_id): Path<u32>,
    uri: Uri,
) -> Json<Value> {
    state.record(&uri);
    Json(json!({
        "stats": [{"type": {"displayName": "season"}, "splits": [{"player": {"id": person_id}, "stat": {"homeRuns": 58}}]}]
    }))
}

async fn linescore(
    State(state): State<StubState>,
    Path(game_pk): Path<u64>,
    uri: Uri,
) -> Json<Value> {
    state.record(&uri);
    Json(json!({
        "gamePk": game_pk,
        "currentInning": 9,
        "teams": {"home": {"runs": 3}, "away": {"runs": 5}}
    }))
}

async fn unavailable(State(state): State<StubState>, uri: Uri) -> impl IntoResponse {
    state.record(&uri);
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance")
}

/// Fails twice, then succeeds.
async fn flaky(State(state): State<StubState>, uri: Uri) -> axum::response::Response {
    state.record(&uri);
    if state.flaky_calls.fetch_add(1, Ordering::SeqCst) < 2 {
        (StatusCode::BAD_GATEWAY, "try again").into_response()
    } else {
        Json(json!({"ok": true})).into_response()
    }
}

/// Model that replays a fixed list of replies and records what it was sent.
///
/// Once the script runs out it fails like a broken transport, unless built
/// with [`ScriptedModel::repeating`].
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ModelReply>>,
    repeat: Option<ModelReply>,
    seen: Mutex<Vec<Exchange>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<ModelReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            repeat: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn repeating(reply: ModelReply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            repeat: Some(reply),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Snapshot of the exchange passed on each call.
    pub fn exchanges(&self) -> Vec<Exchange> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, exchange: &Exchange, tools: &[ToolDefinition]) -> Result<ModelReply> {
        assert_eq!(tools.len(), 5);
        self.seen.lock().unwrap().push(exchange.clone());

        let next = self.replies.lock().unwrap().pop_front();
        next.or_else(|| self.repeat.clone())
            .ok_or_else(|| BullpenError::Model("connection refused".to_string()))
    }
}

pub fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}
