//! Action detection: extracting a tool request from free model text.
//!
//! Two grammars are recognised:
//!
//! - **Fenced JSON**: the first fenced block (```` ``` ```` or
//!   ```` ```json ````) holding `{"action": "<tool>", "action_input": {...}}`.
//! - **Call syntax**: `tool_name(arg="value")` or `tool_name(arg='value')`.
//!
//! Detection never fails loudly. Text without a recognisable request, or a
//! fenced block with malformed JSON, simply yields `None`: the loop treats
//! that response as the final answer.

use regex_lite::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use taoloop_config::ActionFormat;
use taoloop_core::tool::{ActionRequest, SCALAR_INPUT_KEY};
use tracing::debug;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```\s*(?:json)?\s*([\s\S]*?)\s*```").expect("fenced block pattern is valid")
});

static CALL_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([A-Za-z_][A-Za-z0-9_]*)\s*\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*["']([^"']+)["']\s*\)"#)
        .expect("call syntax pattern is valid")
});

/// Extracts at most one action request from a model response.
pub trait ActionParser: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// The first action request in `text`, if any.
    fn parse(&self, text: &str) -> Option<ActionRequest>;
}

/// Parses `{"action", "action_input"}` from the first fenced block.
#[derive(Debug, Clone, Copy, Default)]
pub struct FencedJsonParser;

impl ActionParser for FencedJsonParser {
    fn name(&self) -> &str {
        "json"
    }

    fn parse(&self, text: &str) -> Option<ActionRequest> {
        let body = FENCED_BLOCK.captures(text)?.get(1)?.as_str();

        let value: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "Fenced block is not valid JSON");
                return None;
            }
        };

        let Value::Object(mut object) = value else {
            debug!("Fenced block is not a JSON object");
            return None;
        };

        let tool_name = match object.remove("action") {
            Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
            _ => {
                debug!("Fenced block has no 'action' name");
                return None;
            }
        };

        let arguments = match object.remove("action_input") {
            Some(Value::Object(map)) => map,
            None | Some(Value::Null) => Map::new(),
            Some(scalar) => {
                let mut map = Map::new();
                map.insert(SCALAR_INPUT_KEY.into(), scalar);
                map
            }
        };

        Some(ActionRequest::new(tool_name, arguments))
    }
}

/// Parses `tool_name(arg="value")`, ignoring case; only the first match counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallSyntaxParser;

impl ActionParser for CallSyntaxParser {
    fn name(&self) -> &str {
        "call"
    }

    fn parse(&self, text: &str) -> Option<ActionRequest> {
        let caps = CALL_SYNTAX.captures(text)?;
        let tool_name = caps.get(1)?.as_str().to_lowercase();
        let arg_name = caps.get(2)?.as_str().to_lowercase();
        let arg_value = caps.get(3)?.as_str();

        let mut arguments = Map::new();
        arguments.insert(arg_name, Value::String(arg_value.to_string()));
        Some(ActionRequest::new(tool_name, arguments))
    }
}

/// Tries fenced JSON first, then call syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoParser;

impl ActionParser for AutoParser {
    fn name(&self) -> &str {
        "auto"
    }

    fn parse(&self, text: &str) -> Option<ActionRequest> {
        FencedJsonParser
            .parse(text)
            .or_else(|| CallSyntaxParser.parse(text))
    }
}

/// The parser for a configured action format.
pub fn parser_for(format: ActionFormat) -> Box<dyn ActionParser> {
    match format {
        ActionFormat::Json => Box::new(FencedJsonParser),
        ActionFormat::Call => Box::new(CallSyntaxParser),
        ActionFormat::Auto => Box::new(AutoParser),
    }
}
