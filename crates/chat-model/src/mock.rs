use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ChatResult;
use crate::message::ChatMessage;
use crate::provider::ChatModel;

/// A `ChatModel` test double that returns a canned reply, or a reply chosen
/// by index from a fixed sequence (useful for simulating a manager that
/// writes prose on one call and a decision-token extractor call next).
pub struct MockChatModel {
    replies: Vec<String>,
    calls: AtomicUsize,
    transcripts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockChatModel {
    pub fn new<S: Into<String>>(reply: S) -> Self {
        Self {
            replies: vec![reply.into()],
            calls: AtomicUsize::new(0),
            transcripts: Mutex::new(Vec::new()),
        }
    }

    pub fn sequence<S: Into<String>>(replies: Vec<S>) -> Self {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            calls: AtomicUsize::new(0),
            transcripts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn transcripts(&self) -> Vec<Vec<ChatMessage>> {
        self.transcripts.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn invoke(&self, messages: &[ChatMessage]) -> ChatResult<String> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.transcripts
            .lock()
            .expect("mock lock poisoned")
            .push(messages.to_vec());

        let reply = self
            .replies
            .get(index)
            .or_else(|| self.replies.last())
            .cloned()
            .unwrap_or_default();
        Ok(reply)
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}
