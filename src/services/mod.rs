pub mod attempt_service;
pub mod auth_service;
pub mod grading_service;
pub mod notification_service;
pub mod question_service;
pub mod test_service;
