use crate::tooling::RegistryError;
use thiserror::Error;

/// The only failure a conversation can raise. Every other failure path
/// (malformed calls, tool errors, budgets, backend outages) resolves to a
/// final answer instead.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("tool registry invariant violated for '{tool}': {source}")]
    Invariant {
        tool: String,
        #[source]
        source: RegistryError,
    },
}
