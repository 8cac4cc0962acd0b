//! Typed tool invocations.
//!
//! Arguments arrive as loose JSON from the model or a control client. They are
//! turned into a [`ToolCall`] at the dispatch boundary so nothing past this
//! point handles untyped maps.

use crate::error::{BullpenError, Result};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use url::form_urlencoded;

/// A validated call to one of the registered tools.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "name", content = "arguments", rename_all = "snake_case")]
pub enum ToolCall {
    /// Games scheduled on a date.
    TodayGames {
        #[serde(deserialize_with = "scalar_text")]
        date: String,
    },

    /// Team hitting and pitching stats for a season.
    TeamStats {
        #[serde(rename = "teamId", deserialize_with = "scalar_text")]
        team_id: String,
        #[serde(deserialize_with = "scalar_text")]
        season: String,
    },

    /// Season stats for one player.
    PlayerStats {
        #[serde(rename = "personId", deserialize_with = "scalar_text")]
        person_id: String,
        #[serde(deserialize_with = "scalar_text")]
        season: String,
    },

    /// People search by name.
    SearchPlayer {
        #[serde(deserialize_with = "scalar_text")]
        query: String,
    },

    /// Linescore for one game.
    Linescore {
        #[serde(rename = "gamePk", deserialize_with = "scalar_text")]
        game_pk: String,
    },
}

/// Upstream read a tool call maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub path: String,
    pub extract: Option<&'static str>,
}

impl ToolCall {
    /// Build a call for a registered tool from loose JSON arguments.
    ///
    /// `null` arguments are treated as an empty object. The caller is expected
    /// to have checked `name` against the registry already.
    pub fn from_arguments(name: &str, arguments: Value) -> Result<Self> {
        let arguments = match arguments {
            Value::Null => json!({}),
            other => other,
        };

        serde_json::from_value(json!({ "name": name, "arguments": arguments })).map_err(|e| {
            BullpenError::InvalidArguments {
                tool: name.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Registry name of this call.
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::TodayGames { .. } => "today_games",
            ToolCall::TeamStats { .. } => "team_stats",
            ToolCall::PlayerStats { .. } => "player_stats",
            ToolCall::SearchPlayer { .. } => "search_player",
            ToolCall::Linescore { .. } => "linescore",
        }
    }

    /// Path template and extracted field for this call.
    pub fn upstream_request(&self) -> UpstreamRequest {
        match self {
            ToolCall::TodayGames { date } => UpstreamRequest {
                path: format!("/schedule?sportId=1&date={}", encode(date)),
                extract: Some("dates"),
            },
            ToolCall::TeamStats { team_id, season } => UpstreamRequest {
                path: format!(
                    "/teams/{}/stats?group=hitting,pitching&season={}",
                    encode(team_id),
                    encode(season)
                ),
                extract: Some("stats"),
            },
            ToolCall::PlayerStats { person_id, season } => UpstreamRequest {
                path: format!(
                    "/people/{}/stats?stats=season&season={}",
                    encode(person_id),
                    encode(season)
                ),
                extract: Some("stats"),
            },
            ToolCall::SearchPlayer { query } => UpstreamRequest {
                path: format!("/people/search?query={}", encode(query)),
                extract: Some("people"),
            },
            ToolCall::Linescore { game_pk } => UpstreamRequest {
                path: format!("/game/{}/linescore", encode(game_pk)),
                extract: None,
            },
        }
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Accept a JSON string, number or boolean and keep its text form.
///
/// Models send ids as `147` or `"147"` and seasons as `2024` or `"2024"`
/// interchangeably.
fn scalar_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}
