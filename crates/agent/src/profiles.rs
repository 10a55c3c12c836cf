//! Ready-made agent profiles.
//!
//! A profile bundles what a loop needs beyond the model: the system prompt,
//! the tools it may call and the action grammar the prompt teaches.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taoloop_config::{ActionFormat, AppConfig};
use taoloop_core::provider::Provider;
use taoloop_core::tool::ToolRegistry;
use crate::tool_loop::ToolUseLoop;
use taoloop_tools::{BookCatalog, BookLookupTool, CalculatorTool, WeatherLookupTool};

/// One of the built-in agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentProfile {
    /// Literature assistant over the book catalog, call syntax.
    #[default]
    Books,
    /// Weather assistant, fenced JSON actions.
    Weather,
    /// Arithmetic assistant, fenced JSON actions.
    Calculator,
}

impl AgentProfile {
    pub const ALL: [AgentProfile; 3] = [Self::Books, Self::Weather, Self::Calculator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Weather => "weather",
            Self::Calculator => "calculator",
        }
    }

    /// The tools this profile may call.
    pub fn registry(&self) -> ToolRegistry {
        match self {
            Self::Books => ToolRegistry::new().with(BookLookupTool::default()),
            Self::Weather => ToolRegistry::new().with(WeatherLookupTool),
            Self::Calculator => ToolRegistry::new().with(CalculatorTool),
        }
    }

    /// The action grammar the system prompt teaches.
    pub fn action_format(&self) -> ActionFormat {
        match self {
            Self::Books => ActionFormat::Call,
            Self::Weather | Self::Calculator => ActionFormat::Json,
        }
    }

    /// A loop for this profile: configured options and limits, the profile's
    /// tools and action grammar.
    pub fn tool_loop(&self, provider: Arc<dyn Provider>, config: &AppConfig) -> ToolUseLoop {
        ToolUseLoop::from_config(provider, Arc::new(self.registry()), config)
            .with_format(self.action_format())
    }

    pub fn system_prompt(&self) -> String {
        match self {
            Self::Books => books_prompt(&BookCatalog::builtin()),
            Self::Weather => json_action_prompt(
                &self.registry(),
                "get_weather",
                r#"{"location": "New York"}"#,
            ),
            Self::Calculator => json_action_prompt(
                &self.registry(),
                "calculator",
                r#"{"operation": "multiply", "a": 15, "b": 7}"#,
            ),
        }
    }
}

impl std::fmt::Display for AgentProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "books" => Ok(Self::Books),
            "weather" => Ok(Self::Weather),
            "calculator" => Ok(Self::Calculator),
            other => Err(format!(
                "unknown profile '{other}' (expected books, weather or calculator)"
            )),
        }
    }
}

fn books_prompt(catalog: &BookCatalog) -> String {
    format!(
        "You are an assistant specialised in books and literature.

AVAILABLE TOOL:
- book_lookup: Look up detailed information about a book by its title

BOOKS IN THE CATALOG:
{titles}

Follow the Thought-Action-Observation cycle:

1. THOUGHT: Analyse the user's question.
   - If it is about a specific book, use the tool.
   - If it is a general question, answer directly.

2. ACTION: To look up a book, reply with EXACTLY this and nothing else:
   book_lookup(title=\"Exact Book Title\")

3. OBSERVATION: Once you receive the book data, write a complete answer.

Examples:
- \"Tell me about Dom Casmurro\" -> book_lookup(title=\"Dom Casmurro\")
- \"Who wrote 1984?\" -> book_lookup(title=\"1984\")
- \"What do you know about Jane Austen?\" -> book_lookup(title=\"Pride and Prejudice\")

If the user asks about a book that is not in the catalog, tell them which books are available.",
        titles = catalog.titles().join(", ")
    )
}

fn json_action_prompt(tools: &ToolRegistry, example_action: &str, example_input: &str) -> String {
    let signatures = tools
        .names()
        .into_iter()
        .filter_map(|name| tools.get(name))
        .map(|tool| {
            format!(
                "{}: {}, args: {}",
                tool.name(),
                tool.description(),
                tool.parameters_schema()["properties"]
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Answer the following questions as best you can. You have access to the following tools:

{descriptions}

The way you use the tools is by specifying a json blob.
Specifically, this json should have an `action` key (with the name of the tool to use) and an `action_input` key (with the input to the tool going here).

The only values that should be in the \"action\" field are:
{signatures}

ALWAYS use the following format:

Question: the input question you must answer
Thought: you should always think about one action to take. Only one action at a time in this format:
Action:
```
{{
  \"action\": \"{example_action}\",
  \"action_input\": {example_input}
}}
```
Observation: the result of the action. This Observation is unique, complete, and the source of truth.
... (this Thought/Action/Observation can repeat N times, you should take several steps when needed. The json blob must be formatted as markdown and only use a SINGLE action at a time.)

You must always end your output with the following format:

Thought: I now know the final answer
Final Answer: the final answer to the original input question

Now begin! Reminder to ALWAYS use the exact characters `Final Answer:` when you provide a definitive answer.",
        descriptions = tools.describe(),
    )
}
