//! Maps tool invocations onto StatsAPI reads.

use super::call::ToolCall;
use super::registry::find_tool;
use crate::error::Result;
use crate::statsapi::StatsClient;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Executes tool calls against the statistics API.
pub struct ToolDispatcher {
    client: Arc<StatsClient>,
}

impl ToolDispatcher {
    /// Create a dispatcher over `client`.
    pub fn new(client: Arc<StatsClient>) -> Self {
        Self { client }
    }

    /// Run tool `name` with loose JSON `arguments`.
    ///
    /// An unknown name is not an error: it yields `{"error": "Unknown tool <name>"}`
    /// so every caller reports it the same way. Bad arguments and upstream
    /// failures are returned as errors.
    #[instrument(skip(self, arguments))]
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<Value> {
        if find_tool(name).is_none() {
            warn!("unknown tool requested: {}", name);
            return Ok(unknown_tool(name));
        }

        let call = ToolCall::from_arguments(name, arguments)?;
        self.execute(&call).await
    }

    /// Run an already validated call.
    pub async fn execute(&self, call: &ToolCall) -> Result<Value> {
        let request = call.upstream_request();
        info!("executing tool {} via {}", call.name(), request.path);
        self.client.fetch(&request.path, request.extract).await
    }
}

/// Structured result for a tool name that is not registered.
pub fn unknown_tool(name: &str) -> Value {
    json!({ "error": format!("Unknown tool {}", name) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BullpenError;
    use crate::test_support::StubUpstream;

    #[tokio::test]
    async fn test_unknown_tool_is_structured() {
        let stub = StubUpstream::spawn().await;
        let dispatcher = stub.dispatcher();

        let result = dispatcher.dispatch("box_score", json!({"gamePk": 1})).await.unwrap();
        assert_eq!(result, json!({"error": "Unknown tool box_score"}));
        assert!(stub.hits().is_empty());
    }

    #[tokio::test]
    async fn test_today_games_extracts_dates() {
        let stub = StubUpstream::spawn().await;
        let dispatcher = stub.dispatcher();

        let result = dispatcher
            .dispatch("today_games", json!({"date": "2024-05-01"}))
            .await
            .unwrap();

        assert_eq!(result[0]["date"], "2024-05-01");
        assert_eq!(stub.hits(), vec!["/schedule?sportId=1&date=2024-05-01"]);
    }

    #[tokio::test]
    async fn test_search_player_extracts_people() {
        let stub = StubUpstream::spawn().await;
        let dispatcher = stub.dispatcher();

        let result = dispatcher
            .dispatch("search_player", json!({"query": "judge"}))
            .await
            .unwrap();

        assert_eq!(result[0]["fullName"], "Aaron Judge");
    }

    #[tokio::test]
    async fn test_team_and_player_stats_extract_stats() {
        let stub = StubUpstream::spawn().await;
        let dispatcher = stub.dispatcher();

        let team = dispatcher
            .dispatch("team_stats", json!({"teamId": 147, "season": "2024"}))
            .await
            .unwrap();
        let player = dispatcher
            .dispatch("player_stats", json!({"personId": 592450, "season": "2024"}))
            .await
            .unwrap();

        assert_eq!(team[0]["group"]["displayName"], "hitting");
        assert!(player.is_array());
        assert_eq!(
            stub.hits(),
            vec![
                "/teams/147/stats?group=hitting,pitching&season=2024",
                "/people/592450/stats?stats=season&season=2024",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_argument_is_an_error() {
        let stub = StubUpstream::spawn().await;
        let dispatcher = stub.dispatcher();

        let err = dispatcher.dispatch("today_games", json!({})).await.unwrap_err();
        assert!(matches!(err, BullpenError::InvalidArguments { .. }));
        assert!(stub.hits().is_empty());
    }
}
