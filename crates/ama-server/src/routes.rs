//! Request handlers and their JSON payloads.
//!
//! Handlers only translate between JSON and service calls; every rule lives
//! in [`ama::Ama`].

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use ama::store::Store;
use ama::{
    Ama, Answer, AnswerDraft, AmaError, CreatedSession, Question, QuestionId, QuestionView,
    Session, SessionId, SessionUpdate, SessionView, Token, VoteReceipt,
};

use crate::client_ip::Voter;
use crate::error::{ApiError, NOT_FOUND_MESSAGE};

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

/// Body of `PUT /api/ama/:token`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum SessionAction {
    Publish,
    Update {
        title: Option<String>,
        description: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionId,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub created_at: i64,
}

impl From<Session> for SessionSummary {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            title: session.title,
            description: session.description,
            is_published: session.published,
            created_at: session.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[serde(default)]
    pub text: String,
    pub ask_token: Token,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityRequest {
    pub host_token: Token,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub question_id: String,
    pub ask_token: Token,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatusQuery {
    pub ask_token: Token,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatus {
    pub question_id: QuestionId,
    pub has_voted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub question_id: String,
    pub answer_token: Token,
    #[serde(default)]
    pub core: String,
    #[serde(default)]
    pub steps: String,
    #[serde(default)]
    pub limits: String,
}

/// An id that does not parse cannot name a stored question.
fn question_id(raw: &str) -> Result<QuestionId, ApiError> {
    raw.parse().map_err(|_| ApiError::from(AmaError::NotFound))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": NOT_FOUND_MESSAGE })))
}

pub async fn create_session<S: Store + 'static>(
    State(ama): State<Ama<S>>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> ApiResult<CreatedSession> {
    let Json(request) = payload?;
    let created = ama
        .create_session(&request.title, request.description.as_deref())
        .await?;
    Ok(Json(created))
}

pub async fn view_session<S: Store + 'static>(
    State(ama): State<Ama<S>>,
    Path(token): Path<String>,
) -> ApiResult<SessionView> {
    Ok(Json(ama.view_session(&Token::from(token)).await?))
}

pub async fn modify_session<S: Store + 'static>(
    State(ama): State<Ama<S>>,
    Path(token): Path<String>,
    payload: Result<Json<SessionAction>, JsonRejection>,
) -> ApiResult<SessionSummary> {
    let Json(action) = payload?;
    let token = Token::from(token);

    let session = match action {
        SessionAction::Publish => ama.publish(&token).await?,
        SessionAction::Update { title, description } => {
            ama.update_session(&token, SessionUpdate { title, description })
                .await?
        }
    };
    Ok(Json(session.into()))
}

pub async fn list_questions<S: Store + 'static>(
    State(ama): State<Ama<S>>,
    Path(token): Path<String>,
) -> ApiResult<Vec<QuestionView>> {
    Ok(Json(ama.list_questions(&Token::from(token)).await?))
}

pub async fn create_question<S: Store + 'static>(
    State(ama): State<Ama<S>>,
    payload: Result<Json<CreateQuestionRequest>, JsonRejection>,
) -> ApiResult<Question> {
    let Json(request) = payload?;
    Ok(Json(
        ama.create_question(&request.ask_token, &request.text)
            .await?,
    ))
}

pub async fn set_visibility<S: Store + 'static>(
    State(ama): State<Ama<S>>,
    Path(id): Path<String>,
    payload: Result<Json<VisibilityRequest>, JsonRejection>,
) -> ApiResult<Question> {
    let Json(request) = payload?;
    let id = question_id(&id)?;
    Ok(Json(
        ama.set_question_visibility(&id, &request.host_token, request.is_hidden)
            .await?,
    ))
}

pub async fn cast_vote<S: Store + 'static>(
    State(ama): State<Ama<S>>,
    Voter(voter): Voter,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<VoteReceipt> {
    let Json(request) = payload?;
    let id = question_id(&request.question_id)?;
    Ok(Json(ama.cast_vote(&id, &request.ask_token, &voter).await?))
}

pub async fn vote_status<S: Store + 'static>(
    State(ama): State<Ama<S>>,
    Path(id): Path<String>,
    Voter(voter): Voter,
    query: Result<Query<VoteStatusQuery>, QueryRejection>,
) -> ApiResult<VoteStatus> {
    let Query(query) = query.map_err(|e| ApiError::MalformedPayload(e.body_text()))?;
    let id = question_id(&id)?;
    let has_voted = ama.has_voted(&id, &query.ask_token, &voter).await?;
    Ok(Json(VoteStatus {
        question_id: id,
        has_voted,
    }))
}

pub async fn submit_answer<S: Store + 'static>(
    State(ama): State<Ama<S>>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> ApiResult<Answer> {
    let Json(request) = payload?;
    let id = question_id(&request.question_id)?;
    let draft = AnswerDraft::new(request.core, request.steps, request.limits);
    Ok(Json(
        ama.submit_answer(&id, &request.answer_token, draft).await?,
    ))
}
