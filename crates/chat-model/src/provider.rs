use async_trait::async_trait;

use crate::error::ChatResult;
use crate::message::ChatMessage;

/// A provider-agnostic chat-completion backend (§4.1, C1).
///
/// Exactly one operation is exposed: turn a transcript into assistant text.
/// Provider selection, credentials, and transport details are all resolved
/// before a value behind this trait ever exists.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn invoke(&self, messages: &[ChatMessage]) -> ChatResult<String>;

    /// Human-readable backend name, used only for logging/diagnostics.
    fn backend_name(&self) -> &'static str;
}
