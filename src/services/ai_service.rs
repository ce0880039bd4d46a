use crate::errors::BridgeResult;
use crate::models::GenerationRequest;

/// Trait for text generation backends (Gemini, test doubles, etc.)
///
/// One invocation is one outbound call: implementations must not retry.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> BridgeResult<String>;
}
