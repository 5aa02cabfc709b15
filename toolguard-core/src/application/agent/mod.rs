//! # Agent Module
//!
//! The bounded tool-calling loop. Each step flows one way:
//!
//! 1. Request a completion from the [`ModelProvider`](crate::model::ModelProvider)
//! 2. Normalize it into a [`CanonicalCall`] ([`Normalizer`])
//! 3. Filter its arguments against the tool schema ([`sanitize`])
//! 4. Ask the [`GuardPolicy`] whether it may run
//! 5. Invoke the tool and feed the result back to the model
//!
//! The loop ends with exactly one [`FinalAnswer`]: the model's own, or a
//! fallback when a guard bound is hit.

mod call;
mod context;
mod errors;
mod guard;
mod models;
mod normalizer;
mod runner;
mod sanitizer;


pub use call::{CanonicalCall, RawCall};
pub use context::{ToolContext, compose_system_instructions};
pub use errors::AgentError;
pub use guard::{FinalAnswer, GuardDecision, GuardPolicy, GuardState, TerminationReason};
pub use models::{AgentOptions, AgentOutcome, AgentStep};
pub use normalizer::Normalizer;
pub use runner::Agent;
pub use sanitizer::{SanitizedCall, sanitize};
