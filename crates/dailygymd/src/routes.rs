//! API router and handlers
//!
//! Routes stay thin: decode the request, call into the service crates, map
//! errors onto HTTP statuses. Validation problems come back as 400, a
//! missing log as 404, a path escape as 403, storage failures as 500, and
//! an AI call that exhausted its retries as 503.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use dailygym_ai::{news, services, AiError};
use dailygym_core::constants::{DEFAULT_CORS_ORIGIN, MAX_AUDIO_BYTES};
use dailygym_core::Error as CoreError;
use dailygym_storage::AudioKind;
use dailygym_summary as summary;

use crate::state::AppState;

const AI_UNAVAILABLE_MSG: &str =
    "AIサービスに接続できません。しばらく待ってから再試行してください。";

/// Errors a handler can surface, mapped onto a status and a
/// `{"error": ...}` body
pub enum ApiError {
    Core(CoreError),
    Ai(AiError),
    BadRequest(String),
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::Core(e)
    }
}

impl From<AiError> for ApiError {
    fn from(e: AiError) -> Self {
        ApiError::Ai(e)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Core(e) => match e {
                CoreError::Validation { .. } => (StatusCode::BAD_REQUEST, e.to_string()),
                CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "Log not found".to_string()),
                CoreError::PathSecurity(_) => {
                    error!("Path security violation: {e}");
                    (StatusCode::FORBIDDEN, "Access denied".to_string())
                }
                CoreError::StorageIo { .. } => {
                    error!("Storage error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "ログの保存に失敗しました".to_string(),
                    )
                }
                CoreError::Config(_) => {
                    error!("Config error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            ApiError::Ai(e) => match e {
                AiError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, e.to_string()),
                _ => {
                    error!("AI service error: {e}");
                    (StatusCode::SERVICE_UNAVAILABLE, AI_UNAVAILABLE_MSG.to_string())
                }
            },
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Create the API router
pub fn create_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CORS_ORIGIN)),
        )
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/news/parse", post(parse_news))
        .route("/api/text/generate-levels", post(generate_levels))
        .route("/api/speaking/question", post(generate_question))
        .route("/api/tts/generate", post(generate_tts))
        .route("/api/speech/transcribe", post(transcribe))
        .route("/api/feedback/generate", post(generate_feedback))
        .route("/api/log/save", post(save_log))
        .route("/api/log/audio", post(save_log_audio))
        .route("/api/log/list", get(list_logs))
        .route("/api/log/:date", get(log_detail))
        .route("/api/summary/streak", get(streak))
        .route("/api/summary/weekly", get(weekly))
        // Recordings can run to 25 MB, well past the default body limit
        .layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES + 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Handlers ===

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Deserialize)]
struct ParseNewsRequest {
    #[serde(rename = "type", default = "default_news_type")]
    kind: String,
    content: Option<String>,
    url: Option<String>,
}

fn default_news_type() -> String {
    "text".to_string()
}

async fn parse_news(
    State(state): State<AppState>,
    Json(req): Json<ParseNewsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let parsed = match req.kind.as_str() {
        "url" => {
            let url = req
                .url
                .ok_or_else(|| ApiError::BadRequest("URL is required".to_string()))?;
            news::fetch_article_from_url(&state.http, &url).await?
        }
        "text" => {
            let content = req
                .content
                .ok_or_else(|| ApiError::BadRequest("Article content is required".to_string()))?;
            news::parse_news_content(&content)?
        }
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unknown input type: {other}"
            )))
        }
    };
    Ok(Json(parsed))
}

#[derive(Deserialize)]
struct ArticleRequest {
    content: String,
}

async fn generate_levels(
    State(state): State<AppState>,
    Json(req): Json<ArticleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let levels = services::generate_levels(state.ai.as_ref(), &state.retry, &req.content).await?;
    Ok(Json(levels))
}

async fn generate_question(
    State(state): State<AppState>,
    Json(req): Json<ArticleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let question =
        services::generate_speaking_question(state.ai.as_ref(), &state.retry, &req.content)
            .await?;
    Ok(Json(serde_json::json!({ "question": question })))
}

#[derive(Deserialize)]
struct TtsRequest {
    text: String,
}

async fn generate_tts(
    State(state): State<AppState>,
    Json(req): Json<TtsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let audio = services::generate_tts_audio(state.ai.as_ref(), &state.retry, &req.text).await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "audio/mpeg")],
        audio,
    ))
}

async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut audio: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("audio") {
            let filename = field
                .file_name()
                .unwrap_or("recording.webm")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            audio = Some((bytes.to_vec(), filename));
        }
    }

    let (bytes, filename) =
        audio.ok_or_else(|| ApiError::BadRequest("Audio file is required".to_string()))?;
    let text =
        services::transcribe_speech(state.ai.as_ref(), &state.retry, &bytes, &filename).await?;
    Ok(Json(serde_json::json!({ "text": text })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackRequest {
    article_content: String,
    spoken_text: String,
}

async fn generate_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let feedback = services::generate_feedback(
        state.ai.as_ref(),
        &state.retry,
        &req.article_content,
        &req.spoken_text,
    )
    .await?;
    Ok(Json(feedback))
}

async fn save_log(
    State(state): State<AppState>,
    Json(record): Json<dailygym_core::SessionRecord>,
) -> Result<impl IntoResponse, ApiError> {
    let path = state.store.save(&record).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "filePath": path.display().to_string(),
    })))
}

async fn save_log_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut date: Option<String> = None;
    let mut session_number: Option<usize> = None;
    let mut kind = AudioKind::Recording;
    let mut audio: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("date") => {
                date = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                );
            }
            Some("sessionNumber") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                session_number = Some(raw.parse().map_err(|_| {
                    ApiError::BadRequest("Session number must be a positive integer".to_string())
                })?);
            }
            Some("kind") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                kind = match raw.as_str() {
                    "recording" => AudioKind::Recording,
                    "tts" => AudioKind::Tts,
                    other => {
                        return Err(ApiError::BadRequest(format!(
                            "Unknown audio kind: {other}"
                        )))
                    }
                };
            }
            Some("audio") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                audio = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let date = date.ok_or_else(|| ApiError::BadRequest("Date is required".to_string()))?;
    let session_number = session_number
        .ok_or_else(|| ApiError::BadRequest("Session number is required".to_string()))?;
    let audio = audio.ok_or_else(|| ApiError::BadRequest("Audio file is required".to_string()))?;

    let path = state
        .store
        .save_audio(&date, session_number, &audio, kind)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "filePath": path.display().to_string(),
    })))
}

#[derive(Deserialize)]
struct ListQuery {
    year: i32,
    month: u32,
}

async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = state.store.list(query.year, query.month).await?;
    Ok(Json(logs))
}

async fn log_detail(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state.store.detail(&date).await?;
    Ok(Json(detail))
}

async fn streak(State(state): State<AppState>) -> impl IntoResponse {
    Json(summary::streak_today(&state.store).await)
}

async fn weekly(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let summary = summary::weekly_summary_today(&state.store, state.analyzer.as_ref()).await?;
    Ok(Json(summary))
}
