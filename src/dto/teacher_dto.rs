use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::answer::Answer;
use crate::models::question::{Question, QuestionWithCount};
use crate::models::test::{PassPercentage, Test};
use crate::utils::validation::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTestPayload {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(default)]
    pub pass_percentage: PassPercentage,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateTestPayload {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: String,
}

/// Row of the teacher's test list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestSummary {
    pub id: Uuid,
    pub name: String,
    #[sqlx(try_from = "i32")]
    pub pass_percentage: PassPercentage,
    pub questions_count: i64,
    pub taken_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDetail {
    pub test: Test,
    pub questions: Vec<QuestionWithCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResponse {
    pub test: Test,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TakenTestRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub username: String,
    pub score: Decimal,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResults {
    pub test: Test,
    pub taken_tests: Vec<TakenTestRow>,
    pub total_taken_tests: i64,
    pub average_score: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionPayload {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnswerForm {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionChangePayload {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub text: String,
    #[validate(nested)]
    pub answers: Vec<AnswerForm>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDetail {
    pub test: Test,
    pub question: Question,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSavedResponse {
    #[serde(flatten)]
    pub detail: QuestionDetail,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub question: Question,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_test_defaults_threshold() {
        let payload: CreateTestPayload = serde_json::from_str(r#"{"name":"Algebra 101"}"#).unwrap();
        assert_eq!(payload.pass_percentage, PassPercentage::P30);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn create_test_rejects_unknown_threshold() {
        let parsed = serde_json::from_str::<CreateTestPayload>(
            r#"{"name":"Algebra 101","pass_percentage":55}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn answer_forms_are_validated_individually() {
        let payload: QuestionChangePayload = serde_json::from_str(
            r#"{"text":"2+2?","answers":[{"text":"4","is_correct":true},{"text":""}]}"#,
        )
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn blank_test_names_are_rejected() {
        let create: CreateTestPayload = serde_json::from_str(r#"{"name":"   "}"#).unwrap();
        assert!(create.validate().unwrap_err().field_errors().contains_key("name"));
        let rename = UpdateTestPayload { name: "\t".into() };
        assert!(rename.validate().is_err());
        let rename = UpdateTestPayload { name: " History ".into() };
        assert!(rename.validate().is_ok());
    }

    #[test]
    fn blank_question_text_is_rejected() {
        let payload = QuestionPayload { text: "   ".into() };
        assert!(payload.validate().unwrap_err().field_errors().contains_key("text"));
    }

    #[test]
    fn blank_question_or_answer_text_fails_the_save() {
        let payload: QuestionChangePayload = serde_json::from_str(
            r#"{"text":"   ","answers":[{"text":"   ","is_correct":true},{"text":"\t"}]}"#,
        )
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("text"));
        assert!(errors.errors().contains_key("answers"));

        let payload: QuestionChangePayload = serde_json::from_str(
            r#"{"text":"2+2?","answers":[{"text":"4","is_correct":true},{"text":" "}]}"#,
        )
        .unwrap();
        assert!(payload.validate().is_err());
    }
}
