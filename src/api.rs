//! HTTP API endpoints for the round owner and the admin panel.

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{self, AuthConfig};
use crate::engine::{Engine, EngineError};
use crate::history::StoreState;
use crate::questions::QuestionSourceError;
use crate::types::{Question, QuestionId, SubmissionResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadQuestionRequest {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JudgeRequest {
    pub text: String,
}

/// Question as shown to players: the answers stay hidden
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub category: Option<String>,
    pub prompt: String,
    pub answer_count: usize,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            category: question.category.clone(),
            prompt: question.prompt.clone(),
            answer_count: question.answers.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundEnded {
    pub question_id: QuestionId,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryStatus {
    pub state: StoreState,
    pub used_count: usize,
}

fn error_response(error: EngineError) -> Response {
    let status = match &error {
        EngineError::NoActiveQuestion => StatusCode::NOT_FOUND,
        EngineError::QuestionSource(QuestionSourceError::EmptyCategory { .. }) => {
            StatusCode::NOT_FOUND
        }
        EngineError::QuestionSource(QuestionSourceError::Exhausted { .. }) => StatusCode::CONFLICT,
        EngineError::QuestionSource(QuestionSourceError::Malformed { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::QuestionSource(QuestionSourceError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        EngineError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, error.to_string()).into_response()
}

/// Load a new question for the next round.
///
/// POST /api/questions
pub async fn load_question(
    State(engine): State<Arc<Engine>>,
    Json(request): Json<LoadQuestionRequest>,
) -> Response {
    match engine.load_question(request.category.as_deref()).await {
        Ok(question) => Json(QuestionView::from(question.as_ref())).into_response(),
        Err(e) => {
            tracing::warn!("Loading question failed: {}", e);
            error_response(e)
        }
    }
}

/// Public view of the current question.
///
/// GET /api/question
pub async fn current_question(State(engine): State<Arc<Engine>>) -> Response {
    match engine.current_question().await {
        Some(question) => Json(QuestionView::from(question.as_ref())).into_response(),
        None => error_response(EngineError::NoActiveQuestion),
    }
}

/// GET /api/categories
pub async fn list_categories(State(engine): State<Arc<Engine>>) -> Json<Vec<String>> {
    Json(engine.categories().await)
}

/// Judge a submission against the current question.
///
/// POST /api/judge
pub async fn judge(
    State(engine): State<Arc<Engine>>,
    Json(request): Json<JudgeRequest>,
) -> Json<SubmissionResult> {
    Json(engine.judge(&request.text).await)
}

/// End the round and record its question as used.
///
/// POST /api/round/end
pub async fn end_round(State(engine): State<Arc<Engine>>) -> Response {
    match engine.mark_current_question_used().await {
        Ok(question_id) => Json(RoundEnded { question_id }).into_response(),
        Err(e) => error_response(e),
    }
}

/// Current question including its answers, for the reveal board.
///
/// GET /admin/question
pub async fn admin_question(State(engine): State<Arc<Engine>>) -> Response {
    match engine.current_question().await {
        Some(question) => Json(question.as_ref().clone()).into_response(),
        None => error_response(EngineError::NoActiveQuestion),
    }
}

/// GET /admin/history
pub async fn history_status(State(engine): State<Arc<Engine>>) -> Json<HistoryStatus> {
    let history = engine.history();
    Json(HistoryStatus {
        state: history.state().await,
        used_count: history.load_all().await.len(),
    })
}

/// Reset the question history.
///
/// POST /admin/history/clear
pub async fn clear_history(State(engine): State<Arc<Engine>>) -> Json<HistoryStatus> {
    engine.clear_history().await;
    history_status(State(engine)).await
}

/// Assemble the API router
pub fn router(engine: Arc<Engine>, auth_config: Arc<AuthConfig>) -> Router {
    let admin_routes = Router::new()
        .route("/admin/question", get(admin_question))
        .route("/admin/history", get(history_status))
        .route("/admin/history/clear", post(clear_history))
        .layer(middleware::from_fn_with_state(
            auth_config,
            auth::admin_auth_middleware,
        ));

    Router::new()
        .route("/api/questions", post(load_question))
        .route("/api/question", get(current_question))
        .route("/api/categories", get(list_categories))
        .route("/api/judge", post(judge))
        .route("/api/round/end", post(end_round))
        .merge(admin_routes)
        .with_state(engine)
}
