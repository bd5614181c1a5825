//! Daily English Gym AI - OpenAI-backed language services
//!
//! One explicitly constructed [`OpenAiClient`] is injected wherever speech
//! or text generation is needed; there is no global client. Network-bound
//! calls go through [`retry::with_retry`], which retries once with a short
//! delay for transient failures and a longer one when rate limited.

mod client;
mod error;
#[cfg(test)]
pub mod mock;
pub mod news;
pub mod prompts;
mod retry;
pub mod services;
mod weekly;

pub use client::{AiBackend, OpenAiClient, SamplingOptions};
pub use error::{AiError, Result};
pub use retry::{with_retry, RetryConfig};
pub use weekly::OpenAiWeeklyAnalyzer;
