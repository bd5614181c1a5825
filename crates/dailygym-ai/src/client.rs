//! Thin typed wrapper over the OpenAI HTTP API
//!
//! Chat completions, speech synthesis, and transcription. The client is
//! constructed once from [`OpenAiConfig`] and passed to whoever needs it.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use dailygym_core::constants::{TRANSCRIBE_MODEL, TTS_MODEL};
use dailygym_core::OpenAiConfig;

use crate::error::{AiError, Result};

/// Per-call overrides for chat completions
#[derive(Debug, Clone, Default)]
pub struct SamplingOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl SamplingOptions {
    pub fn temperature(value: f32) -> Self {
        Self {
            temperature: Some(value),
            ..Self::default()
        }
    }
}

/// The OpenAI calls the services need. Split out as a trait so tests can
/// swap in a scripted backend.
#[async_trait]
pub trait AiBackend: Send + Sync {
    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_message: &str,
        options: &SamplingOptions,
    ) -> Result<String>;

    async fn synthesize_speech(&self, text: &str, voice: &str, speed: f32) -> Result<Bytes>;

    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String>;
}

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    chat_model: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    speed: f32,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Construct with a caller-supplied HTTP client, so timeouts and proxies
    /// stay under the caller's control.
    pub fn with_http_client(config: &OpenAiConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-success response into an [`AiError::Api`], pulling the
    /// message out of the standard `{"error": {"message": ...}}` body when
    /// present.
    async fn error_from_response(response: reqwest::Response) -> AiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|parsed| parsed.error.message)
            .unwrap_or(body);
        AiError::api(status, message)
    }
}

#[async_trait]
impl AiBackend for OpenAiClient {
    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_message: &str,
        options: &SamplingOptions,
    ) -> Result<String> {
        let request = ChatRequest {
            model: options.model.as_deref().unwrap_or(&self.chat_model),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: options.temperature.unwrap_or(0.7),
            max_tokens: options.max_tokens,
        };

        let response = self
            .http
            .post(self.endpoint("/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(AiError::EmptyResponse)
    }

    async fn synthesize_speech(&self, text: &str, voice: &str, speed: f32) -> Result<Bytes> {
        let request = SpeechRequest {
            model: TTS_MODEL,
            voice,
            input: text,
            speed,
        };

        let response = self
            .http
            .post(self.endpoint("/audio/speech"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(response.bytes().await?)
    }

    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String> {
        let file_part = reqwest::multipart::Part::bytes(audio)
            .file_name(filename.to_string())
            .mime_str("audio/webm")?;
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", TRANSCRIBE_MODEL)
            .text("language", "en");

        let response = self
            .http
            .post(self.endpoint("/audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AiError::Malformed(e.to_string()))?;
        Ok(parsed.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new(&OpenAiConfig {
            api_key: "sk-test".to_string(),
            base_url: base_url.to_string(),
            chat_model: "gpt-4o-mini".to_string(),
        })
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let client = client("https://api.openai.com/v1/");
        assert_eq!(
            client.endpoint("/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_request_serializes_openai_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "coach",
                },
                ChatMessage {
                    role: "user",
                    content: "article",
                },
            ],
            temperature: 0.8,
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "article");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_error_body_message_extraction() {
        let body = r#"{"error": {"message": "Rate limit reached", "type": "requests"}}"#;
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "Rate limit reached");
    }
}
