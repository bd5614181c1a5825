//! Scripted backend for service tests

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::client::{AiBackend, SamplingOptions};
use crate::error::{AiError, Result};

/// Queue-driven [`AiBackend`]: chat calls pop scripted responses in order
/// and every call is recorded for assertions.
#[derive(Default)]
pub struct MockBackend {
    chat_queue: Mutex<VecDeque<Result<String>>>,
    chat_calls: Mutex<Vec<(String, String)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chat_ok(&self, response: &str) {
        self.chat_queue.lock().push_back(Ok(response.to_string()));
    }

    pub fn push_chat_err(&self, status: u16, message: &str) {
        self.chat_queue
            .lock()
            .push_back(Err(AiError::api(status, message)));
    }

    /// Recorded (system prompt, user message) pairs, in call order
    pub fn chat_calls(&self) -> Vec<(String, String)> {
        self.chat_calls.lock().clone()
    }
}

#[async_trait]
impl AiBackend for MockBackend {
    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_message: &str,
        _options: &SamplingOptions,
    ) -> Result<String> {
        self.chat_calls
            .lock()
            .push((system_prompt.to_string(), user_message.to_string()));
        self.chat_queue
            .lock()
            .pop_front()
            .unwrap_or(Err(AiError::EmptyResponse))
    }

    async fn synthesize_speech(&self, _text: &str, _voice: &str, _speed: f32) -> Result<Bytes> {
        Ok(Bytes::from_static(b"mp3-bytes"))
    }

    async fn transcribe(&self, _audio: Vec<u8>, _filename: &str) -> Result<String> {
        Ok("transcribed text".to_string())
    }
}
