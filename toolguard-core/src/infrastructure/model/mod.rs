//! Model infrastructure module
//!
//! # Structure
//! - `types` - Request, Response, Error types
//! - `traits` - the `ModelProvider` contract the loop driver talks to
//! - `adapter` - message format adapters
//! - `clients` - concrete backends (Ollama)

pub mod adapter;
pub mod clients;
pub mod traits;
pub mod types;

pub use clients::OllamaClient;
pub use traits::ModelProvider;
pub use types::{ModelError, ModelRequest, ModelResponse};
