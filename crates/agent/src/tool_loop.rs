//! The Thought → Action → Observation loop.
//!
//! Each round sends the transcript to the model with a stop sequence on the
//! observation marker, so the model halts right after declaring an action
//! instead of inventing its result. If the reply carries an action request,
//! the named tool runs locally and its output goes back into the transcript
//! as an observation; otherwise the reply is the final answer.
//!
//! The loop never returns `Err`. Every outcome, including a failed model
//! call, is a [`LoopOutcome`] whose `Display` is the text handed back to
//! the caller.

use serde::Serialize;
use std::sync::Arc;
use taoloop_config::{ActionFormat, AppConfig};
use taoloop_core::message::{Message, Transcript};
use taoloop_core::provider::{CompletionRequest, GenerationOptions, Provider};
use taoloop_core::tool::{ActionRequest, ToolRegistry};
use tracing::{debug, info, warn};

use crate::parser::{ActionParser, parser_for};

/// Default round limit.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Default stop sequence.
pub const OBSERVATION_MARKER: &str = "Observation:";

/// Where the loop is within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    AwaitingModel,
    ActionDetected,
    FinalAnswer,
    IterationsExhausted,
    Failed,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::FinalAnswer | Self::IterationsExhausted | Self::Failed
        )
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoopOutcome {
    /// The model replied without an action request.
    FinalAnswer { answer: String },
    /// Every round produced an action; no final answer was given.
    IterationsExhausted { max_iterations: u32 },
    /// The model call failed during `iteration`.
    Failed { iteration: u32, error: String },
}

impl LoopOutcome {
    /// The terminal state this outcome corresponds to.
    pub fn state(&self) -> LoopState {
        match self {
            Self::FinalAnswer { .. } => LoopState::FinalAnswer,
            Self::IterationsExhausted { .. } => LoopState::IterationsExhausted,
            Self::Failed { .. } => LoopState::Failed,
        }
    }

    /// True for diagnostics, false for a genuine answer from the model.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::FinalAnswer { .. })
    }
}

impl std::fmt::Display for LoopOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FinalAnswer { answer } => f.write_str(answer),
            Self::IterationsExhausted { max_iterations } => write!(
                f,
                "Iteration limit reached: no final answer after {max_iterations} rounds."
            ),
            Self::Failed { iteration, error } => {
                write!(f, "Processing failed at iteration {iteration}: {error}")
            }
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct LoopReport {
    pub outcome: LoopOutcome,
    /// The full transcript, system prompt first.
    pub transcript: Transcript,
    /// Model rounds started.
    pub iterations: u32,
    /// Action requests dispatched (including unknown tools).
    pub tool_calls: u32,
}

/// A single-agent tool-use loop.
///
/// Holds no per-run state: each call to [`run`](Self::run) owns its own
/// transcript, so one loop can serve many questions in sequence.
pub struct ToolUseLoop {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    parser: Box<dyn ActionParser>,
    options: GenerationOptions,
    max_iterations: u32,
    stop_sequence: String,
}

impl ToolUseLoop {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            tools,
            parser: parser_for(ActionFormat::default()),
            options: GenerationOptions::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            stop_sequence: OBSERVATION_MARKER.into(),
        }
    }

    /// A loop using the configured generation options and agent settings.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        config: &AppConfig,
    ) -> Self {
        Self::new(provider, tools)
            .with_options(config.generation.clone())
            .with_max_iterations(config.agent.max_iterations)
            .with_format(config.agent.action_format)
            .with_stop_sequence(config.agent.stop_sequence.clone())
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Sampling options. Their `stop` list is replaced by the stop sequence on every call.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_format(mut self, format: ActionFormat) -> Self {
        self.parser = parser_for(format);
        self
    }

    pub fn with_parser(mut self, parser: Box<dyn ActionParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replace the stop sequence. A blank sequence is ignored.
    pub fn with_stop_sequence(mut self, stop: impl Into<String>) -> Self {
        let stop = stop.into();
        if stop.trim().is_empty() {
            warn!("Ignoring blank stop sequence");
        } else {
            self.stop_sequence = stop;
        }
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer `question`, returning the final answer or a diagnostic string.
    pub async fn run(&self, question: &str, system_prompt: &str) -> String {
        self.run_detailed(question, system_prompt)
            .await
            .outcome
            .to_string()
    }

    /// Like [`run`](Self::run), but returns the transcript and counters too.
    pub async fn run_detailed(&self, question: &str, system_prompt: &str) -> LoopReport {
        let mut transcript = Transcript::seeded(system_prompt, question);
        let mut tool_calls = 0u32;
        let options = self.options.clone().with_stop([self.stop_sequence.as_str()]);

        info!(
            provider = %self.provider.name(),
            model = %self.provider.model(),
            parser = %self.parser.name(),
            max_iterations = self.max_iterations,
            "Tool-use loop starting"
        );

        for iteration in 1..=self.max_iterations {
            debug!(iteration, state = ?LoopState::AwaitingModel, "Calling model");

            let request = CompletionRequest {
                messages: transcript.messages().to_vec(),
                options: options.clone(),
            };

            let response = match self.provider.complete(request).await {
                Ok(completion) => completion.content,
                Err(e) => {
                    warn!(iteration, error = %e, state = ?LoopState::Failed, "Model call failed");
                    return LoopReport {
                        outcome: LoopOutcome::Failed {
                            iteration,
                            error: e.to_string(),
                        },
                        transcript,
                        iterations: iteration,
                        tool_calls,
                    };
                }
            };

            let Some(action) = self.parser.parse(&response) else {
                info!(iteration, tool_calls, state = ?LoopState::FinalAnswer, "Tool-use loop finished");
                transcript.push(Message::assistant(&response));
                return LoopReport {
                    outcome: LoopOutcome::FinalAnswer { answer: response },
                    transcript,
                    iterations: iteration,
                    tool_calls,
                };
            };

            debug!(
                iteration,
                tool = %action.tool_name,
                state = ?LoopState::ActionDetected,
                "Action requested"
            );

            tool_calls += 1;
            let observation = self.observe(&action).await;

            transcript.push(Message::assistant(&response));
            transcript.push(Message::tool(&action.tool_name, observation));
        }

        warn!(
            max_iterations = self.max_iterations,
            state = ?LoopState::IterationsExhausted,
            "No final answer within the iteration limit"
        );

        LoopReport {
            outcome: LoopOutcome::IterationsExhausted {
                max_iterations: self.max_iterations,
            },
            transcript,
            iterations: self.max_iterations,
            tool_calls,
        }
    }

    /// Run the requested tool and render the result as observation text.
    async fn observe(&self, action: &ActionRequest) -> String {
        if !self.tools.contains(&action.tool_name) {
            warn!(tool = %action.tool_name, "Unknown tool requested");
            return unknown_tool_observation(&action.tool_name, &self.tools);
        }

        match self.tools.execute(action).await {
            Ok(output) => output.output,
            Err(e) => {
                warn!(tool = %action.tool_name, error = %e, "Tool execution failed");
                format!("Error: {e}")
            }
        }
    }
}

/// Observation for a request naming a tool that is not registered.
pub fn unknown_tool_observation(tool_name: &str, tools: &ToolRegistry) -> String {
    format!(
        "Tool \"{}\" not found. Available tools: {}",
        tool_name,
        tools.names().join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingProvider, SequentialMockProvider};
    use taoloop_core::error::ToolError;
    use taoloop_core::message::Role;
    use taoloop_tools::{BookLookupTool, CalculatorTool, WeatherLookupTool};

    const BOOK_CALL: &str = "book_lookup(title=\"dom casmurro\")";
    const SYSTEM: &str = "You are a helpful assistant.";

    fn registry() -> Arc<ToolRegistry> {
        Arc::new(
            ToolRegistry::new()
                .with(BookLookupTool::default())
                .with(CalculatorTool)
                .with(WeatherLookupTool),
        )
    }

    fn looped(provider: Arc<SequentialMockProvider>) -> ToolUseLoop {
        ToolUseLoop::new(provider, registry())
    }

    #[tokio::test]
    async fn plain_reply_returns_on_first_iteration() {
        let provider = Arc::new(SequentialMockProvider::from_texts(&[
            "Paris is the capital of France.",
        ]));
        let report = looped(provider.clone())
            .run_detailed("What is the capital of France?", SYSTEM)
            .await;

        assert_eq!(
            report.outcome,
            LoopOutcome::FinalAnswer {
                answer: "Paris is the capital of France.".into()
            }
        );
        assert!(!report.outcome.is_degraded());
        assert_eq!(report.iterations, 1);
        assert_eq!(report.tool_calls, 0);
        assert_eq!(provider.call_count(), 1);

        let roles: Vec<Role> = report.transcript.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn action_then_answer() {
        let provider = Arc::new(SequentialMockProvider::from_texts(&[
            BOOK_CALL,
            "Dom Casmurro was written by Machado de Assis in 1899.",
        ]));
        let report = looped(provider.clone())
            .run_detailed("Tell me about Dom Casmurro", SYSTEM)
            .await;

        assert_eq!(
            report.outcome.to_string(),
            "Dom Casmurro was written by Machado de Assis in 1899."
        );
        assert_eq!(report.iterations, 2);
        assert_eq!(report.tool_calls, 1);

        let messages = report.transcript.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, BOOK_CALL);
        assert_eq!(messages[3].role, Role::Tool);
        assert_eq!(messages[3].tool_name.as_deref(), Some("book_lookup"));
        assert!(messages[3].content.contains("Machado de Assis"));
    }

    #[tokio::test]
    async fn every_request_carries_the_stop_sequence() {
        let provider = Arc::new(SequentialMockProvider::from_texts(&[BOOK_CALL, "Done."]));
        looped(provider.clone()).run("q", SYSTEM).await;

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.options.stop, vec!["Observation:".to_string()]);
        }
        // The second round sees the observation from the first.
        assert_eq!(requests[0].messages.len(), 2);
        assert_eq!(requests[1].messages.len(), 4);
    }

    #[tokio::test]
    async fn blank_stop_sequence_keeps_observation_marker() {
        let provider = Arc::new(SequentialMockProvider::from_texts(&["Done."]));
        looped(provider.clone())
            .with_stop_sequence("   ")
            .run("q", SYSTEM)
            .await;

        let requests = provider.requests();
        assert_eq!(requests[0].options.stop, vec![OBSERVATION_MARKER.to_string()]);
    }

    #[tokio::test]
    async fn scalar_action_input_reaches_weather_tool() {
        let provider = Arc::new(SequentialMockProvider::from_texts(&[
            "Thought: check London.\nAction:\n```json\n{\"action\": \"get_weather\", \"action_input\": \"London\"}\n```",
            "It is sunny in London.",
        ]));
        let report = ToolUseLoop::new(provider, registry())
            .with_format(ActionFormat::Json)
            .run_detailed("Weather in London?", SYSTEM)
            .await;

        assert_eq!(report.outcome.to_string(), "It is sunny in London.");
        assert_eq!(report.tool_calls, 1);
        assert_eq!(
            report.transcript.messages()[3].content,
            "The weather in London is sunny with low temperatures."
        );
    }

    #[tokio::test]
    async fn exhaustion_when_every_round_acts() {
        let provider = Arc::new(SequentialMockProvider::from_texts(&[
            BOOK_CALL, BOOK_CALL, BOOK_CALL,
        ]));
        let report = looped(provider.clone()).run_detailed("q", SYSTEM).await;

        assert_eq!(
            report.outcome,
            LoopOutcome::IterationsExhausted { max_iterations: 3 }
        );
        assert_eq!(
            report.outcome.to_string(),
            "Iteration limit reached: no final answer after 3 rounds."
        );
        assert!(report.outcome.is_degraded());
        assert_eq!(report.tool_calls, 3);
        assert_eq!(provider.call_count(), 3);
        // system + user + 3 × (assistant, tool)
        assert_eq!(report.transcript.len(), 8);
    }

    #[tokio::test]
    async fn answer_on_last_round_is_not_exhaustion() {
        let provider = Arc::new(SequentialMockProvider::from_texts(&[
            BOOK_CALL,
            BOOK_CALL,
            "Here is the answer.",
        ]));
        let answer = looped(provider).run("q", SYSTEM).await;
        assert_eq!(answer, "Here is the answer.");
    }

    #[tokio::test]
    async fn unknown_tool_is_observed_and_loop_continues() {
        let provider = Arc::new(SequentialMockProvider::from_texts(&[
            "movie_lookup(title=\"Alien\")",
            "I can only look up books.",
        ]));
        let report = looped(provider).run_detailed("q", SYSTEM).await;

        assert_eq!(report.outcome.to_string(), "I can only look up books.");
        let observation = &report.transcript.messages()[3];
        assert_eq!(observation.role, Role::Tool);
        assert_eq!(observation.tool_name.as_deref(), Some("movie_lookup"));
        assert_eq!(
            observation.content,
            "Tool \"movie_lookup\" not found. Available tools: book_lookup, calculator, get_weather"
        );
    }

    #[tokio::test]
    async fn tool_error_becomes_observation() {
        let provider = Arc::new(SequentialMockProvider::from_texts(&[
            "```json\n{\"action\": \"calculator\", \"action_input\": {\"operation\": \"divide\", \"a\": 1, \"b\": 0}}\n```",
            "You cannot divide by zero.",
        ]));
        let report = ToolUseLoop::new(provider, registry())
            .with_format(ActionFormat::Json)
            .run_detailed("What is 1 / 0?", SYSTEM)
            .await;

        assert_eq!(report.outcome.to_string(), "You cannot divide by zero.");
        assert_eq!(
            report.transcript.messages()[3].content,
            format!("Error: {}", ToolError::DivisionByZero)
        );
    }

    #[tokio::test]
    async fn provider_failure_stops_the_loop() {
        let provider = Arc::new(FailingProvider::after(
            vec![BOOK_CALL.to_string()],
            "connection reset",
        ));
        let report = ToolUseLoop::new(provider.clone(), registry())
            .run_detailed("q", SYSTEM)
            .await;

        assert_eq!(report.outcome.state(), LoopState::Failed);
        assert_eq!(
            report.outcome.to_string(),
            "Processing failed at iteration 2: Network error: connection reset"
        );
        assert_eq!(report.iterations, 2);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn json_format_ignores_call_syntax() {
        let provider = Arc::new(SequentialMockProvider::from_texts(&[BOOK_CALL]));
        let answer = ToolUseLoop::new(provider, registry())
            .with_format(ActionFormat::Json)
            .run("q", SYSTEM)
            .await;
        assert_eq!(answer, BOOK_CALL);
    }

    #[tokio::test]
    async fn malformed_json_action_is_final_answer() {
        let text = "```json\n{\"action\": \"get_weather\", \"action_input\": {\"location\": \n```";
        let provider = Arc::new(SequentialMockProvider::from_texts(&[text]));
        let report = ToolUseLoop::new(provider, registry())
            .with_format(ActionFormat::Json)
            .run_detailed("q", SYSTEM)
            .await;
        assert_eq!(report.outcome.state(), LoopState::FinalAnswer);
        assert_eq!(report.tool_calls, 0);
    }

    #[tokio::test]
    async fn zero_iterations_exhausts_immediately() {
        let provider = Arc::new(SequentialMockProvider::from_texts(&[]));
        let answer = looped(provider.clone())
            .with_max_iterations(0)
            .run("q", SYSTEM)
            .await;
        assert_eq!(
            answer,
            "Iteration limit reached: no final answer after 0 rounds."
        );
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn from_config_applies_agent_settings() {
        let mut config = AppConfig::default();
        config.agent.max_iterations = 1;
        config.agent.stop_sequence = "Result:".into();
        config.generation.temperature = 0.0;

        let provider = Arc::new(SequentialMockProvider::from_texts(&[BOOK_CALL]));
        let agent = ToolUseLoop::from_config(provider.clone(), registry(), &config);
        assert_eq!(agent.max_iterations(), 1);

        let answer = agent.run("q", SYSTEM).await;
        assert_eq!(
            answer,
            "Iteration limit reached: no final answer after 1 rounds."
        );
        let requests = provider.requests();
        let request = &requests[0];
        assert_eq!(request.options.stop, vec!["Result:".to_string()]);
        assert_eq!(request.options.temperature, 0.0);
    }

    #[test]
    fn terminal_states() {
        assert!(!LoopState::AwaitingModel.is_terminal());
        assert!(!LoopState::ActionDetected.is_terminal());
        assert!(LoopState::FinalAnswer.is_terminal());
        assert!(LoopState::IterationsExhausted.is_terminal());
        assert!(LoopState::Failed.is_terminal());
    }

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let outcome = LoopOutcome::Failed {
            iteration: 1,
            error: "boom".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "failed");
        assert_eq!(json["iteration"], 1);
    }
}
