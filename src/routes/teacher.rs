use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::teacher_dto::{
        CreateTestPayload, MessageResponse, QuestionChangePayload, QuestionPayload,
        QuestionResponse, QuestionSavedResponse, TestResponse, UpdateTestPayload,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/teachers/tests",
    responses(
        (status = 200, description = "Tests owned by the teacher"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not a teacher")
    )
)]
#[axum::debug_handler]
pub async fn list_tests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let tests = state.test_service.list_owned_tests(claims.user_id()?).await?;
    Ok(Json(tests))
}

#[utoipa::path(
    post,
    path = "/api/teachers/tests",
    request_body = CreateTestPayload,
    responses(
        (status = 201, description = "Test created successfully", body = Json<TestResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTestPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let test = state
        .test_service
        .create_test(payload, claims.user_id()?)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(TestResponse {
            test,
            message: "The test was created with success! Go ahead and add some questions now."
                .to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/teachers/tests/{id}",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    responses(
        (status = 200, description = "Test with its questions"),
        (status = 403, description = "Test belongs to another teacher"),
        (status = 404, description = "Test not found")
    )
)]
#[axum::debug_handler]
pub async fn get_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let detail = state
        .test_service
        .get_test_detail(id, claims.user_id()?)
        .await?;
    Ok(Json(detail))
}

#[axum::debug_handler]
pub async fn update_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTestPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let test = state
        .test_service
        .update_test(id, claims.user_id()?, payload)
        .await?;
    Ok(Json(TestResponse {
        test,
        message: "Test updated with success!".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/teachers/tests/{id}",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    responses(
        (status = 200, description = "Test deleted with its questions and results"),
        (status = 404, description = "Test not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let test = state.test_service.delete_test(id, claims.user_id()?).await?;
    Ok(Json(MessageResponse {
        message: format!("The test {} was deleted with success!", test.name),
    }))
}

#[axum::debug_handler]
pub async fn test_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let results = state.test_service.test_results(id, claims.user_id()?).await?;
    Ok(Json(results))
}

#[utoipa::path(
    post,
    path = "/api/teachers/tests/{id}/questions",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    request_body = QuestionPayload,
    responses(
        (status = 201, description = "Question added", body = Json<QuestionResponse>),
        (status = 404, description = "Test not found")
    )
)]
#[axum::debug_handler]
pub async fn add_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state
        .question_service
        .add_question(id, claims.user_id()?, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(QuestionResponse {
            question,
            message: "You may now add answers/options to the question.".to_string(),
        }),
    ))
}

#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, question_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let detail = state
        .question_service
        .get_question(id, question_id, claims.user_id()?)
        .await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/teachers/tests/{id}/questions/{question_id}",
    params(
        ("id" = Uuid, Path, description = "Test ID"),
        ("question_id" = Uuid, Path, description = "Question ID")
    ),
    request_body = QuestionChangePayload,
    responses(
        (status = 200, description = "Question and answers saved"),
        (status = 400, description = "Invalid answer set"),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn change_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, question_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<QuestionChangePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let detail = state
        .question_service
        .change_question(id, question_id, claims.user_id()?, payload)
        .await?;
    Ok(Json(QuestionSavedResponse {
        detail,
        message: "Question and answers saved with success!".to_string(),
    }))
}

#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, question_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    let question = state
        .question_service
        .delete_question(id, question_id, claims.user_id()?)
        .await?;
    Ok(Json(MessageResponse {
        message: format!("The question {} was deleted with success!", question.text),
    }))
}
