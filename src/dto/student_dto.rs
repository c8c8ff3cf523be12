use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::test::PassPercentage;
use crate::services::grading_service::TestResult;

/// A test the student can still take.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AvailableTest {
    pub id: Uuid,
    pub name: String,
    #[sqlx(try_from = "i32")]
    pub pass_percentage: PassPercentage,
    pub questions_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TakenTestEntry {
    pub id: Uuid,
    pub test_id: Uuid,
    pub test_name: String,
    pub score: Decimal,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestHeader {
    pub id: Uuid,
    pub name: String,
    pub pass_percentage: PassPercentage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub text: String,
}

/// Answer choice shown to a student; correctness is withheld.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnswerChoice {
    pub id: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeTestView {
    pub test: TestHeader,
    pub question: QuestionView,
    pub answers: Vec<AnswerChoice>,
    pub progress: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerPayload {
    pub answer_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedTest {
    pub test_id: Uuid,
    pub test_name: String,
    pub score: Decimal,
    pub result: TestResult,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitAnswerResponse {
    Next(TakeTestView),
    Completed(CompletedTest),
}
