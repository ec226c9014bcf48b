//! HTTP API server for the summarizer.
//!
//! Provides REST endpoints for summarization, audio status and download, and
//! speech-to-text uploads. Error conditions are data: every summarization
//! response is a 200 with either a complete result or a populated `error`.

use crate::agent::Agent;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::speech::{AudioStatus, AudioStore, SpeechRecognizer, WhisperRecognizer};
use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Shared application state.
struct AppState {
    agent: Agent,
    store: Arc<AudioStore>,
    recognizer: Arc<dyn SpeechRecognizer>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'resyme doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let store = Arc::new(AudioStore::new(&settings.audio_dir())?);
    let agent = Agent::from_settings(&settings, store.clone())?;
    let recognizer: Arc<dyn SpeechRecognizer> =
        Arc::new(WhisperRecognizer::new(&settings.speech.stt_model));

    let state = Arc::new(AppState {
        agent,
        store: store.clone(),
        recognizer,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/summarize", get(summarize))
        .route("/audio-status/{file}", get(audio_status))
        .route("/download-audio/{file}", get(download_audio))
        .route("/speech-to-text", post(speech_to_text))
        .nest_service("/audio", ServeDir::new(store.dir()))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Resyme API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Summarize", "GET  /summarize?query=...&tts=false");
    Output::kv("Audio Status", "GET  /audio-status/:file");
    Output::kv("Download Audio", "GET  /download-audio/:file");
    Output::kv("Speech to Text", "POST /speech-to-text");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SummarizeParams {
    /// Video title or search prompt; a missing value is a client error.
    query: String,
    #[serde(default)]
    tts: bool,
}

#[derive(Serialize)]
struct AudioStatusResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_url: Option<String>,
}

#[derive(Serialize)]
struct DownloadAudioResponse {
    audio_url: String,
}

#[derive(Serialize)]
struct SpeechToTextResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn summarize(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummarizeParams>,
) -> impl IntoResponse {
    Json(state.agent.run(&params.query, params.tts).await)
}

async fn audio_status(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> impl IntoResponse {
    match state.store.status(&file) {
        Some(AudioStatus::Ready) => Json(AudioStatusResponse {
            status: "ready",
            audio_url: Some(format!("/audio/{}", file)),
        })
        .into_response(),
        Some(AudioStatus::Processing) => Json(AudioStatusResponse {
            status: "processing",
            audio_url: None,
        })
        .into_response(),
        Some(AudioStatus::Failed(reason)) => Json(ErrorResponse {
            error: format!("Audio generation failed: {}", reason),
        })
        .into_response(),
        None => Json(ErrorResponse {
            error: format!("Unknown audio file: {}", file),
        })
        .into_response(),
    }
}

async fn download_audio(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> impl IntoResponse {
    match state.store.status(&file) {
        Some(AudioStatus::Ready) => Json(DownloadAudioResponse {
            audio_url: format!("/audio/{}", file),
        })
        .into_response(),
        Some(AudioStatus::Processing) => Json(ErrorResponse {
            error: format!("Audio file is still processing: {}", file),
        })
        .into_response(),
        Some(AudioStatus::Failed(reason)) => Json(ErrorResponse {
            error: format!("Audio generation failed: {}", reason),
        })
        .into_response(),
        None => Json(ErrorResponse {
            error: format!("Unknown audio file: {}", file),
        })
        .into_response(),
    }
}

async fn speech_to_text(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let filename = field.file_name().unwrap_or("upload.wav").to_string();
        match field.bytes().await {
            Ok(bytes) => {
                upload = Some((filename, bytes.to_vec()));
                break;
            }
            Err(e) => {
                return Json(SpeechToTextResponse {
                    text: None,
                    error: Some(format!("Invalid upload: {}", e)),
                });
            }
        }
    }

    let Some((filename, bytes)) = upload else {
        return Json(SpeechToTextResponse {
            text: None,
            error: Some("No audio file in request".to_string()),
        });
    };

    match state.recognizer.recognize(&filename, bytes).await {
        Ok(text) => Json(SpeechToTextResponse {
            text: Some(text),
            error: None,
        }),
        Err(e) => Json(SpeechToTextResponse {
            text: None,
            error: Some(e.to_string()),
        }),
    }
}
