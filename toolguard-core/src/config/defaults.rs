pub const DEFAULT_MODEL: &str = "qwen3:0.6b";
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://127.0.0.1:11434";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_MAX_STEPS: usize = 6;
pub const DEFAULT_MAX_TOOL_CALLS: usize = 2;
pub const DEFAULT_ERROR_THRESHOLD: usize = 2;
pub const DEFAULT_FALLBACK_ANSWER: &str = "I don't know the answer.";

pub const DEFAULT_ERROR_MARKERS: &[&str] = &["error", "failed", "does not exist", "malformed"];
pub const DEFAULT_VETO_MARKERS: &[&str] = &["error", "duplicate", "abort"];

pub const ENV_MODEL: &str = "TOOLGUARD_MODEL";
pub const ENV_ENDPOINT: &str = "TOOLGUARD_ENDPOINT";
