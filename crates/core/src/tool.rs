//! Tool trait: the abstraction over local functions the agent may call.
//!
//! Tools are small synchronous-in-spirit capabilities (a calculator, a
//! catalogue lookup, a weather stub). The model requests them by name in
//! its free-text output; the loop parses that into an [`ActionRequest`]
//! and dispatches through the [`ToolRegistry`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use crate::error::ToolError;

/// Key a bare scalar `action_input` is carried under until it reaches a tool.
pub const SCALAR_INPUT_KEY: &str = "input";

/// A tool invocation extracted from model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Name of the tool to execute
    pub tool_name: String,

    /// Named arguments
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl ActionRequest {
    pub fn new(
        tool_name: impl Into<String>,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Arguments as a JSON object value.
    pub fn arguments_value(&self) -> serde_json::Value {
        serde_json::Value::Object(self.arguments.clone())
    }
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Human-readable text that becomes the observation
    pub output: String,

    /// Optional structured data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolOutput {
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            data: None,
        }
    }
}

/// The core Tool trait.
///
/// Each tool (calculator, book_lookup, get_weather) implements this trait
/// and is registered in the ToolRegistry.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name the model uses to call this tool.
    fn name(&self) -> &str;

    /// A description of what this tool does (rendered into system prompts).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolOutput, ToolError>;
}

/// A registry mapping tool names to handlers.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        debug!(tool = %name, "Registering tool");
        self.tools.insert(name, tool);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.register(Box::new(tool));
        self
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Execute an action request against the matching tool.
    pub async fn execute(&self, action: &ActionRequest) -> std::result::Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(&action.tool_name)
            .ok_or_else(|| ToolError::NotFound(action.tool_name.clone()))?;
        tool.execute(bind_arguments(tool.as_ref(), action)).await
    }

    /// All registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// One `- name: description` line per tool, sorted by name.
    pub fn describe(&self) -> String {
        self.names()
            .into_iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| format!("- {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Arguments for `tool`. A lone [`SCALAR_INPUT_KEY`] entry is moved onto the
/// tool's single required parameter; anything else passes through unchanged.
fn bind_arguments(tool: &dyn Tool, action: &ActionRequest) -> serde_json::Value {
    let arguments = &action.arguments;
    let scalar = match arguments.get(SCALAR_INPUT_KEY) {
        Some(value) if arguments.len() == 1 => value,
        _ => return action.arguments_value(),
    };

    let schema = tool.parameters_schema();
    let required: Vec<&str> = schema["required"]
        .as_array()
        .map(|names| names.iter().filter_map(|n| n.as_str()).collect())
        .unwrap_or_default();

    match required.as_slice() {
        [only] if *only != SCALAR_INPUT_KEY => {
            debug!(tool = %tool.name(), parameter = %only, "Binding scalar input");
            let mut bound = serde_json::Map::new();
            bound.insert((*only).to_string(), scalar.clone());
            serde_json::Value::Object(bound)
        }
        _ => action.arguments_value(),
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolOutput, ToolError> {
            let text = arguments["text"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidArguments("Missing 'text' argument".into()))?;
            Ok(ToolOutput::text(text))
        }
    }

    fn echo_action(text: &str) -> ActionRequest {
        let mut args = serde_json::Map::new();
        args.insert("text".into(), serde_json::json!(text));
        ActionRequest::new("echo", args)
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = ToolRegistry::new().with(EchoTool);
        assert!(registry.get("echo").is_some());
        assert!(registry.contains("echo"));
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registry_describe_lists_tools() {
        let registry = ToolRegistry::new().with(EchoTool);
        assert_eq!(registry.describe(), "- echo: Echoes back the input");
    }

    #[tokio::test]
    async fn registry_execute_tool() {
        let registry = ToolRegistry::new().with(EchoTool);
        let result = registry.execute(&echo_action("hello world")).await.unwrap();
        assert_eq!(result.output, "hello world");
    }

    #[tokio::test]
    async fn registry_execute_missing_tool() {
        let registry = ToolRegistry::new();
        let err = registry.execute(&echo_action("hi")).await.unwrap_err();
        assert_eq!(err, ToolError::NotFound("echo".into()));
    }

    #[tokio::test]
    async fn scalar_input_binds_to_single_required_parameter() {
        let registry = ToolRegistry::new().with(EchoTool);
        let mut args = serde_json::Map::new();
        args.insert(SCALAR_INPUT_KEY.into(), serde_json::json!("bare value"));
        let result = registry
            .execute(&ActionRequest::new("echo", args))
            .await
            .unwrap();
        assert_eq!(result.output, "bare value");
    }

    #[tokio::test]
    async fn scalar_input_beside_other_arguments_is_left_alone() {
        let registry = ToolRegistry::new().with(EchoTool);
        let mut args = serde_json::Map::new();
        args.insert(SCALAR_INPUT_KEY.into(), serde_json::json!("ignored"));
        args.insert("text".into(), serde_json::json!("kept"));
        let result = registry
            .execute(&ActionRequest::new("echo", args))
            .await
            .unwrap();
        assert_eq!(result.output, "kept");
    }

    #[tokio::test]
    async fn registry_propagates_tool_error() {
        let registry = ToolRegistry::new().with(EchoTool);
        let action = ActionRequest::new("echo", serde_json::Map::new());
        let err = registry.execute(&action).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
