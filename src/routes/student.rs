use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Redirect, Response},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::student_dto::{SubmitAnswerPayload, SubmitAnswerResponse},
    error::Result,
    middleware::auth::Claims,
    services::attempt_service::TakeStep,
    AppState,
};

const TAKEN_TESTS_PATH: &str = "/api/students/taken";

fn step_response(step: TakeStep) -> Response {
    match step {
        TakeStep::AlreadyTaken => Redirect::to(TAKEN_TESTS_PATH).into_response(),
        TakeStep::Question(view) => Json(SubmitAnswerResponse::Next(view)).into_response(),
        TakeStep::Completed(done) => Json(SubmitAnswerResponse::Completed(done)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/students/tests",
    responses(
        (status = 200, description = "Tests the student has not taken yet"),
        (status = 403, description = "Not a student")
    )
)]
#[axum::debug_handler]
pub async fn list_available(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let tests = state
        .attempt_service
        .list_available_tests(claims.user_id()?)
        .await?;
    Ok(Json(tests))
}

#[axum::debug_handler]
pub async fn list_taken(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let taken = state
        .attempt_service
        .list_taken_tests(claims.user_id()?)
        .await?;
    Ok(Json(taken))
}

#[utoipa::path(
    get,
    path = "/api/students/tests/{id}",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    responses(
        (status = 200, description = "Next unanswered question, or the final result"),
        (status = 303, description = "Test already taken"),
        (status = 404, description = "Test not found")
    )
)]
#[axum::debug_handler]
pub async fn take_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let step = state
        .attempt_service
        .current_step(claims.user_id()?, id)
        .await?;
    Ok(step_response(step))
}

#[utoipa::path(
    post,
    path = "/api/students/tests/{id}",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    request_body = SubmitAnswerPayload,
    responses(
        (status = 200, description = "Answer recorded"),
        (status = 303, description = "Test already taken"),
        (status = 400, description = "Answer is not a choice of the current question")
    )
)]
#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitAnswerPayload>,
) -> Result<Response> {
    let step = state
        .attempt_service
        .submit_answer(claims.user_id()?, id, payload.answer_id)
        .await?;
    Ok(step_response(step))
}
