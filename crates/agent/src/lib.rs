//! The tool-use loop for taoloop.
//!
//! The agent follows a **Thought → Action → Observation** cycle:
//!
//! 1. **Seed** the transcript with the system prompt and the question
//! 2. **Ask the model**, stopping before it can write an observation itself
//! 3. **If the reply requests a tool**: run it, append the observation, loop back to 2
//! 4. **Otherwise**: the reply is the final answer
//!
//! The loop stops at the final answer, after `max_iterations` rounds, or on
//! the first failed model call.

pub mod parser;
pub mod profiles;
pub mod tool_loop;

pub use parser::{ActionParser, AutoParser, CallSyntaxParser, FencedJsonParser, parser_for};
pub use profiles::AgentProfile;
pub use tool_loop::{LoopOutcome, LoopReport, LoopState, ToolUseLoop};

#[cfg(test)]
pub(crate) mod test_helpers;
