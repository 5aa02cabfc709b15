//! # toolguard-core
//!
//! A bounded tool-calling control loop for language models. Free-form model
//! output is normalized into canonical tool calls, filtered against each
//! tool's declared parameters, checked by a guard policy, and dispatched
//! until exactly one final answer is produced.
//!
//! ## Structure
//! - [`tooling`] - tool registry, tool contract and built-in tools
//! - [`agent`] - normalizer, sanitizer, guard policy and the loop driver
//! - [`model`] - model backend contract and the Ollama client
//! - [`config`] - TOML configuration with environment overrides

pub mod application;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, tooling};
pub use config::{AppConfig, ConfigError, GuardConfig};
pub use domain::types;
pub use infrastructure::model;
