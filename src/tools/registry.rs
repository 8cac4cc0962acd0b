//! Static catalogue of the tools a model or control client may call.

use serde_json::{json, Map, Value};

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
        }
    }
}

/// One parameter of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub required: bool,
    /// Optional JSON-schema `format` hint.
    pub format: Option<&'static str>,
}

impl ParamSpec {
    const fn required(name: &'static str, kind: ParamType) -> Self {
        Self {
            name,
            kind,
            required: true,
            format: None,
        }
    }
}

/// A named, schema-described read operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolDefinition {
    /// JSON schema of the tool's arguments object.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in self.params {
            let mut prop = json!({ "type": param.kind.as_str() });
            if let Some(format) = param.format {
                prop["format"] = json!(format);
            }
            properties.insert(param.name.to_string(), prop);
        }

        let required: Vec<&str> = self.required_params().collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Function descriptor as listed on the control channel.
    pub fn descriptor(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.input_schema(),
        })
    }

    /// Names of the parameters a call must supply.
    pub fn required_params(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params.iter().filter(|p| p.required).map(|p| p.name)
    }
}

static TOOLS: [ToolDefinition; 5] = [
    ToolDefinition {
        name: "today_games",
        description: "Get MLB games for a given date (YYYY-MM-DD).",
        params: &[ParamSpec {
            name: "date",
            kind: ParamType::String,
            required: true,
            format: Some("date"),
        }],
    },
    ToolDefinition {
        name: "team_stats",
        description: "Team hitting & pitching stats for a season.",
        params: &[
            ParamSpec::required("teamId", ParamType::Integer),
            ParamSpec::required("season", ParamType::String),
        ],
    },
    ToolDefinition {
        name: "player_stats",
        description: "Player season stats for given personId and season.",
        params: &[
            ParamSpec::required("personId", ParamType::Integer),
            ParamSpec::required("season", ParamType::String),
        ],
    },
    ToolDefinition {
        name: "search_player",
        description: "Search player by name query.",
        params: &[ParamSpec::required("query", ParamType::String)],
    },
    ToolDefinition {
        name: "linescore",
        description: "Linescore for a gamePk.",
        params: &[ParamSpec::required("gamePk", ParamType::Integer)],
    },
];

/// Every registered tool, in stable order.
pub fn tool_definitions() -> &'static [ToolDefinition] {
    &TOOLS
}

/// Look up a tool by name.
pub fn find_tool(name: &str) -> Option<&'static ToolDefinition> {
    TOOLS.iter().find(|t| t.name == name)
}
