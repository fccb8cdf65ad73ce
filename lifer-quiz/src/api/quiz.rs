//! Quiz endpoints: next question and answer selection

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::quiz::{generate, Modality, Outcome};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NextParams {
    /// Question modality; defaults to photo
    #[serde(default)]
    pub modality: Option<Modality>,
}

/// Question as posed to the user. The correct answer stays server-side
/// until the question is answered.
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub modality: Modality,
    /// Photo URL or resolved recording URL; absent when neither is available
    pub media_url: Option<String>,
    /// Shuffled display names, exactly one of them correct
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub choice: String,
}

/// Session snapshot: streak plus the state of the posed question
#[derive(Debug, Serialize)]
pub struct QuizStateResponse {
    pub streak: u32,
    pub question_posed: bool,
    pub selection: Option<String>,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub outcome: Outcome,
    /// The target's display name, revealed with the verdict
    pub correct_name: String,
    pub streak: u32,
}

/// GET /api/quiz
pub async fn quiz_state(State(state): State<AppState>) -> Json<QuizStateResponse> {
    let quiz = state.quiz.read().await;
    Json(QuizStateResponse {
        streak: quiz.streak(),
        question_posed: quiz.question().is_some(),
        selection: quiz.selection().map(str::to_string),
        outcome: quiz.outcome(),
    })
}

/// GET /api/quiz/next?modality=photo|audio
///
/// Generates the next question from the current list. A list with fewer
/// than 2 members is rejected with a user-visible message directing the
/// user back to list management.
pub async fn next_question(
    State(state): State<AppState>,
    Query(params): Query<NextParams>,
) -> ApiResult<Json<QuestionResponse>> {
    let modality = params.modality.unwrap_or(Modality::Photo);

    let question = {
        let store = state.store.read().await;
        let mut rng = rand::thread_rng();
        generate(store.current(), modality, &mut rng)?
    };

    let media_url = match modality {
        Modality::Photo => question.target.photo_url.clone(),
        Modality::Audio => {
            state
                .sounds
                .resolve_audio(&question.target.scientific_name)
                .await
        }
    };

    let options = question.options.clone();
    state.quiz.write().await.begin(question);

    Ok(Json(QuestionResponse {
        modality,
        media_url,
        options,
    }))
}

/// POST /api/quiz/answer
///
/// The first answer to a question is binding; repeating the call returns
/// the recorded verdict without touching the streak.
pub async fn select_answer(
    State(state): State<AppState>,
    Json(body): Json<AnswerRequest>,
) -> ApiResult<Json<AnswerResponse>> {
    let result = state
        .quiz
        .write()
        .await
        .select_answer(&body.choice)
        .ok_or_else(|| ApiError::Conflict("No active question to answer".to_string()))?;

    // A fresh correct answer may set a new high score on the active list
    if result.first_answer && result.outcome == Outcome::Correct {
        let mut store = state.store.write().await;
        if store.record_streak(result.streak).is_some() {
            store.persist(&state.db).await?;
        }
    }

    Ok(Json(AnswerResponse {
        outcome: result.outcome,
        correct_name: result.correct_name,
        streak: result.streak,
    }))
}

/// Build quiz routes
pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/api/quiz", get(quiz_state))
        .route("/api/quiz/next", get(next_question))
        .route("/api/quiz/answer", post(select_answer))
}
