//! Generation services built on the chat, TTS, and transcription calls
//!
//! Each service validates its input, wraps the API call in the retry policy,
//! and normalizes the model's output into the typed result the routes serve.

use bytes::Bytes;

use dailygym_core::constants::{DEFAULT_TTS_VOICE, MAX_ARTICLE_LEN, MAX_AUDIO_BYTES, MAX_TTS_TEXT_LEN};
use dailygym_core::{Feedback, GeneratedLevels};
use serde::Deserialize;

use crate::client::{AiBackend, SamplingOptions};
use crate::error::{AiError, Result};
use crate::prompts;
use crate::retry::{with_retry, RetryConfig};

fn require_article(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AiError::invalid_input("content", "Article content is required"));
    }
    if content.len() > MAX_ARTICLE_LEN {
        return Err(AiError::invalid_input(
            "content",
            format!("Article content exceeds maximum length of {MAX_ARTICLE_LEN} characters"),
        ));
    }
    Ok(())
}

/// Rewrite an article at two difficulty levels. The two chat calls run
/// concurrently; either failure fails the whole operation.
pub async fn generate_levels(
    api: &dyn AiBackend,
    retry: &RetryConfig,
    article_content: &str,
) -> Result<GeneratedLevels> {
    require_article(article_content)?;

    let level1_user = prompts::level1_user_prompt(article_content);
    let level2_user = prompts::level2_user_prompt(article_content);
    let options = SamplingOptions::temperature(0.7);

    let (level1, level2) = tokio::try_join!(
        with_retry(retry, || api.chat_completion(
            prompts::LEVEL1_SYSTEM_PROMPT,
            &level1_user,
            &options,
        )),
        with_retry(retry, || api.chat_completion(
            prompts::LEVEL2_SYSTEM_PROMPT,
            &level2_user,
            &options,
        )),
    )?;

    Ok(GeneratedLevels { level1, level2 })
}

/// Generate one open-ended speaking question about the article
pub async fn generate_speaking_question(
    api: &dyn AiBackend,
    retry: &RetryConfig,
    article_content: &str,
) -> Result<String> {
    if article_content.trim().is_empty() {
        return Err(AiError::invalid_input("content", "Article content is required"));
    }

    let user = prompts::question_user_prompt(article_content);
    // Higher temperature for question variety
    let options = SamplingOptions::temperature(0.8);
    let question = with_retry(retry, || {
        api.chat_completion(prompts::QUESTION_SYSTEM_PROMPT, &user, &options)
    })
    .await?;

    let trimmed = question.trim();
    if trimmed.ends_with('?') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}?"))
    }
}

#[derive(Deserialize)]
struct FeedbackPayload {
    corrected: String,
    upgraded: String,
    comment: String,
}

/// Strip a markdown code fence the model sometimes wraps JSON in
fn strip_json_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Correct and upgrade a spoken response, with a short comment in Japanese
pub async fn generate_feedback(
    api: &dyn AiBackend,
    retry: &RetryConfig,
    article_content: &str,
    spoken_text: &str,
) -> Result<Feedback> {
    if article_content.trim().is_empty() {
        return Err(AiError::invalid_input(
            "articleContent",
            "Article content is required",
        ));
    }
    if spoken_text.trim().is_empty() {
        return Err(AiError::invalid_input("spokenText", "Spoken text is required"));
    }

    let user = prompts::feedback_user_prompt(article_content, spoken_text);
    let options = SamplingOptions::temperature(0.7);
    let response = with_retry(retry, || {
        api.chat_completion(prompts::FEEDBACK_SYSTEM_PROMPT, &user, &options)
    })
    .await?;

    let payload: FeedbackPayload = serde_json::from_str(strip_json_fence(&response))
        .map_err(|_| AiError::Malformed("Failed to parse feedback response as JSON".to_string()))?;

    if payload.corrected.is_empty() || payload.upgraded.is_empty() || payload.comment.is_empty() {
        return Err(AiError::Malformed("Incomplete feedback response".to_string()));
    }

    Ok(Feedback {
        spoken: spoken_text.to_string(),
        corrected: payload.corrected,
        upgraded: payload.upgraded,
        comment: payload.comment,
    })
}

/// Synthesize speech for a practice text, returning MP3 bytes
pub async fn generate_tts_audio(
    api: &dyn AiBackend,
    retry: &RetryConfig,
    text: &str,
) -> Result<Bytes> {
    if text.trim().is_empty() {
        return Err(AiError::invalid_input("text", "Text is required"));
    }
    if text.len() > MAX_TTS_TEXT_LEN {
        return Err(AiError::invalid_input(
            "text",
            format!("Text exceeds maximum length of {MAX_TTS_TEXT_LEN} characters"),
        ));
    }

    // Playback speed is adjusted client side, so synthesis stays at 1.0
    with_retry(retry, || api.synthesize_speech(text, DEFAULT_TTS_VOICE, 1.0)).await
}

/// Transcribe a spoken recording to text
pub async fn transcribe_speech(
    api: &dyn AiBackend,
    retry: &RetryConfig,
    audio: &[u8],
    filename: &str,
) -> Result<String> {
    if audio.is_empty() {
        return Err(AiError::invalid_input("audio", "Audio data is required"));
    }
    if audio.len() > MAX_AUDIO_BYTES {
        return Err(AiError::invalid_input(
            "audio",
            format!(
                "Audio file exceeds maximum size of {}MB",
                MAX_AUDIO_BYTES / 1024 / 1024
            ),
        ));
    }

    with_retry(retry, || api.transcribe(audio.to_vec(), filename)).await
}
