pub mod auth;
pub mod health;
pub mod student;
pub mod teacher;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};

use crate::middleware::{
    auth::{require_bearer_auth, require_student, require_teacher},
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

/// Every API route with its guards; outer layers (CORS, tracing) are left to the caller.
pub fn router(state: AppState) -> Router {
    let auth_rps = state.config().auth_rps;

    let base_routes = Router::new().route("/health", get(health::health));

    let accounts_api = Router::new()
        .route("/api/accounts/signup/teacher", post(auth::teacher_sign_up))
        .route("/api/accounts/signup/student", post(auth::student_sign_up))
        .route("/api/accounts/login", post(auth::login))
        .layer(from_fn_with_state(RateLimiter::new(auth_rps), rps_middleware));

    let me_api = Router::new()
        .route("/api/accounts/me", get(auth::me))
        .route_layer(from_fn(require_bearer_auth));

    let teacher_api = Router::new()
        .route(
            "/api/teachers/tests",
            get(teacher::list_tests).post(teacher::create_test),
        )
        .route(
            "/api/teachers/tests/:id",
            get(teacher::get_test)
                .patch(teacher::update_test)
                .delete(teacher::delete_test),
        )
        .route("/api/teachers/tests/:id/results", get(teacher::test_results))
        .route("/api/teachers/tests/:id/questions", post(teacher::add_question))
        .route(
            "/api/teachers/tests/:id/questions/:question_id",
            get(teacher::get_question)
                .put(teacher::change_question)
                .delete(teacher::delete_question),
        )
        .route_layer(from_fn(require_teacher));

    let student_api = Router::new()
        .route("/api/students/tests", get(student::list_available))
        .route("/api/students/taken", get(student::list_taken))
        .route(
            "/api/students/tests/:id",
            get(student::take_test).post(student::submit_answer),
        )
        .route_layer(from_fn(require_student));

    base_routes
        .merge(accounts_api)
        .merge(me_api)
        .merge(teacher_api)
        .merge(student_api)
        .with_state(state)
}
