use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::curriculum::structure;
use crate::models::api::{ModulesQuery, ModulesResponse, QuestionFilter, SuccessResponse, YearsResponse};
use crate::models::question::{NewQuestion, QuestionUpdate};
use crate::security::auth::AuthUser;
use crate::security::permissions;
use crate::utils::time::current_timestamp;
use crate::validation::import;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::info;

/// List questions filtered by curriculum dimensions (paid access)
///
/// GET /questions?year=<y>&study_year=<n>&module=<m>&...
pub async fn list_questions_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Query(filter): Query<QuestionFilter>,
) -> Result<Response, ApiError> {
    permissions::ensure_paid(&actor)?;

    let questions = state.questions.list(&filter);

    Ok((StatusCode::OK, Json(questions)).into_response())
}

/// Fetch one question (paid access)
///
/// GET /questions/{question_id}
pub async fn get_question_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(question_id): Path<u32>,
) -> Result<Response, ApiError> {
    permissions::ensure_paid(&actor)?;

    let question = state
        .questions
        .get(question_id)
        .ok_or_else(|| ApiError::not_found("Question"))?;

    Ok((StatusCode::OK, Json(question)).into_response())
}

/// Exam years present in the bank (paid access)
///
/// GET /questions/meta/years
pub async fn list_years_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<Response, ApiError> {
    permissions::ensure_paid(&actor)?;

    Ok((
        StatusCode::OK,
        Json(YearsResponse {
            years: state.questions.distinct_years(),
        }),
    )
        .into_response())
}

/// Curriculum modules for a study year (paid access)
///
/// GET /questions/meta/modules?study_year=<n>
pub async fn list_modules_handler(
    State(_state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Query(query): Query<ModulesQuery>,
) -> Result<Response, ApiError> {
    permissions::ensure_paid(&actor)?;

    if !(1..=3).contains(&query.study_year) {
        return Err(ApiError::Validation("study_year must be 1-3".to_string()));
    }

    let modules = structure::modules_for_year(query.study_year)
        .into_iter()
        .map(String::from)
        .collect();

    Ok((
        StatusCode::OK,
        Json(ModulesResponse {
            study_year: query.study_year,
            modules,
        }),
    )
        .into_response())
}

/// Create a question (manager or admin)
///
/// POST /questions
pub async fn create_question_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<NewQuestion>,
) -> Result<Response, ApiError> {
    permissions::ensure_manager(&actor)?;

    import::validate_question(&payload).map_err(ApiError::Validation)?;

    let question = state
        .questions
        .insert(payload, current_timestamp())
        .map_err(|e| ApiError::Conflict(e.to_string()))?;

    info!(
        question_id = question.id,
        module = %question.module,
        created_by = actor.id,
        "Question created"
    );

    Ok((StatusCode::OK, Json(question)).into_response())
}

/// Update a question (manager or admin)
///
/// PUT /questions/{question_id}
///
/// The merged result of record + patch must still satisfy the curriculum
/// and answer invariants before anything is written.
pub async fn update_question_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(question_id): Path<u32>,
    Json(update): Json<QuestionUpdate>,
) -> Result<Response, ApiError> {
    permissions::ensure_manager(&actor)?;

    let current = state
        .questions
        .get(question_id)
        .ok_or_else(|| ApiError::not_found("Question"))?;

    let merged = NewQuestion {
        year: update.year.unwrap_or(current.year),
        study_year: update.study_year.unwrap_or(current.study_year),
        module: update.module.clone().unwrap_or_else(|| current.module.clone()),
        unite: update.unite.clone().or_else(|| current.unite.clone()),
        speciality: update
            .speciality
            .clone()
            .unwrap_or_else(|| current.speciality.clone()),
        cours: update.cours.clone().unwrap_or_else(|| current.cours.clone()),
        exam_type: update.exam_type.unwrap_or(current.exam_type),
        number: update.number.unwrap_or(current.number),
        question_text: update
            .question_text
            .clone()
            .unwrap_or_else(|| current.question_text.clone()),
        image: update.image.clone().or_else(|| current.image.clone()),
        answers: update.answers.clone().unwrap_or_else(|| current.answers.clone()),
    };
    import::validate_question(&merged).map_err(ApiError::Validation)?;

    let question = state
        .questions
        .update(question_id, update, current_timestamp())
        .map_err(|e| ApiError::Conflict(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Question"))?;

    info!(question_id = question.id, updated_by = actor.id, "Question updated");

    Ok((StatusCode::OK, Json(question)).into_response())
}

/// Delete a question (manager or admin)
///
/// DELETE /questions/{question_id}
pub async fn delete_question_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(question_id): Path<u32>,
) -> Result<Response, ApiError> {
    permissions::ensure_manager(&actor)?;

    if !state.questions.delete(question_id) {
        return Err(ApiError::not_found("Question"));
    }

    info!(question_id = question_id, deleted_by = actor.id, "Question deleted");

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "Question deleted successfully".to_string(),
        }),
    )
        .into_response())
}

/// Bulk import a JSON array of questions (manager or admin)
///
/// POST /questions/import
///
/// Individual item failures are collected in the report; the batch never
/// aborts part-way.
pub async fn import_questions_handler(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(items): Json<Vec<serde_json::Value>>,
) -> Result<Response, ApiError> {
    permissions::ensure_manager(&actor)?;

    let report = import::import_questions(&state.questions, items, current_timestamp());

    info!(
        imported = report.imported,
        skipped = report.skipped,
        errors = report.errors.len(),
        imported_by = actor.id,
        "Question import handled"
    );

    Ok((StatusCode::OK, Json(report)).into_response())
}
