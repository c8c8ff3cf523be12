use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::dto::auth_dto::{
    LoginPayload, MeResponse, StudentSignUpPayload, TeacherSignUpPayload, TokenResponse,
};
use crate::error::Result;
use crate::middleware::auth::Claims;
use crate::models::user::User;
use crate::utils::token::issue_token;
use crate::AppState;

fn token_response(state: &AppState, user: &User) -> Result<TokenResponse> {
    let config = state.config();
    let access_token = issue_token(user.id, user.role, &config.jwt_secret, config.jwt_ttl_hours)?;
    Ok(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        user_id: user.id,
        role: user.role,
        redirect_to: user.role.landing_path().to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/api/accounts/signup/teacher",
    request_body = TeacherSignUpPayload,
    responses(
        (status = 201, description = "Teacher registered and logged in", body = Json<TokenResponse>),
        (status = 400, description = "Invalid sign-up form")
    )
)]
#[axum::debug_handler]
pub async fn teacher_sign_up(
    State(state): State<AppState>,
    Json(payload): Json<TeacherSignUpPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.auth_service.sign_up_teacher(payload).await?;
    Ok((StatusCode::CREATED, Json(token_response(&state, &user)?)))
}

#[utoipa::path(
    post,
    path = "/api/accounts/signup/student",
    request_body = StudentSignUpPayload,
    responses(
        (status = 201, description = "Student registered and logged in", body = Json<TokenResponse>),
        (status = 400, description = "Invalid sign-up form")
    )
)]
#[axum::debug_handler]
pub async fn student_sign_up(
    State(state): State<AppState>,
    Json(payload): Json<StudentSignUpPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (user, _student) = state.auth_service.sign_up_student(payload).await?;
    Ok((StatusCode::CREATED, Json(token_response(&state, &user)?)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;
    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(token_response(&state, &user)?))
}

/// Current user and the page their role starts on.
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.auth_service.get_user(claims.user_id()?).await?;
    Ok(Json(MeResponse {
        id: user.id,
        username: user.username,
        role: user.role,
        redirect_to: user.role.landing_path().to_string(),
    }))
}
