//! HTTP API server for the tutoring frontend.
//!
//! `POST /ask` answers a question and stores the pair in the knowledge base,
//! `POST /feedback` refines a previous answer.

use super::{open_knowledge_base, tool_context};
use crate::agent::{FeedbackRefiner, MathTutor, Refiner, Tutor};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::knowledge::KnowledgeBase;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    pub tutor: Arc<dyn Tutor>,
    pub refiner: Arc<dyn Refiner>,
    pub knowledge_base: Arc<KnowledgeBase>,
}

/// Build the API router with permissive CORS.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/ask", post(ask))
        .route("/feedback", post(feedback))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server until Ctrl+C, then close the knowledge base.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Answer, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let kb = open_knowledge_base(&settings)?;
    let tutor = MathTutor::from_settings(&settings, &prompts, tool_context(&settings, kb.clone())?)?;
    let refiner = FeedbackRefiner::from_settings(&settings, &prompts)?;

    let state = Arc::new(AppState {
        tutor: Arc::new(tutor),
        refiner: Arc::new(refiner),
        knowledge_base: kb.clone(),
    });

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("MathMentor API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Model", &format!("{} ({})", settings.model.name, settings.model.provider));
    Output::kv("Knowledge base", &format!("{} units", kb.len().await));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ask", "POST /ask");
    Output::kv("Feedback", "POST /feedback");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing knowledge base");
    kb.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Deserialize)]
struct FeedbackRequest {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
    #[serde(default)]
    feedback: String,
}

#[derive(Serialize)]
struct FeedbackResponse {
    improved_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

fn bad_request(detail: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            detail: detail.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> impl IntoResponse {
    let question = req.question.trim();
    if question.is_empty() {
        return bad_request("Empty question");
    }

    match state.tutor.solve(question).await {
        Ok(answer) => {
            if !state.knowledge_base.add_pair(question, &answer).await {
                warn!("Answered question was not stored in the knowledge base");
            }
            Json(AskResponse {
                answer,
                error: None,
            })
            .into_response()
        }
        Err(e) => {
            warn!("Tutor failed: {}", e);
            Json(AskResponse {
                answer: String::new(),
                error: Some(e.to_string()),
            })
            .into_response()
        }
    }
}

async fn feedback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeedbackRequest>,
) -> impl IntoResponse {
    let fields = [&req.question, &req.answer, &req.feedback];
    if fields.iter().any(|f| f.trim().is_empty()) {
        return bad_request("question, answer and feedback required");
    }

    match state
        .refiner
        .refine(&req.question, &req.answer, &req.feedback)
        .await
    {
        Ok(improved_answer) => Json(FeedbackResponse {
            improved_answer,
            error: None,
        })
        .into_response(),
        Err(e) => {
            warn!("Refiner failed: {}", e);
            Json(FeedbackResponse {
                improved_answer: String::new(),
                error: Some(e.to_string()),
            })
            .into_response()
        }
    }
}
