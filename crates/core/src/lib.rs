//! # taoloop Core
//!
//! Domain types, traits, and error definitions for the taoloop
//! Thought → Action → Observation agent. This crate has no knowledge of
//! HTTP, configuration files, or terminals; it defines the model that
//! every other crate implements against.
//!
//! ## Layout
//!
//! - [`message`]: role-tagged messages and the append-only [`Transcript`]
//! - [`provider`]: the Completion Client abstraction ([`Provider`])
//! - [`tool`]: local tools, the [`ToolRegistry`] and parsed [`ActionRequest`]s
//! - [`error`]: the error taxonomy shared by all crates

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, ToolError};
pub use message::{Message, Role, Transcript};
pub use provider::{Completion, CompletionRequest, GenerationOptions, Provider, Usage};
pub use tool::{ActionRequest, SCALAR_INPUT_KEY, Tool, ToolOutput, ToolRegistry};
