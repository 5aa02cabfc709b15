//! Model traits

use std::sync::Arc;

use super::types::{ModelError, ModelRequest, ModelResponse};
use async_trait::async_trait;

/// Backend that turns a message history into one completion.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}

#[async_trait]
impl<P: ModelProvider + ?Sized> ModelProvider for Arc<P> {
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        (**self).chat(request).await
    }
}
