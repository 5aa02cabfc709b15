//! Application constants
//!
//! Single source of truth for paths and reserved names.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/agent.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// Reserved tool name that ends a conversation
pub const FINAL_ANSWER: &str = "final_answer";

/// Argument slot used by shorthand calls and final answers
pub const RESPONSE_KEY: &str = "response";

/// Alternate final-answer slot some models emit
pub const ANSWER_KEY: &str = "answer";
