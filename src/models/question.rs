use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub test_id: Uuid,
    pub text: String,
}

/// Question row annotated with how many answers it carries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionWithCount {
    pub id: Uuid,
    pub test_id: Uuid,
    pub text: String,
    pub answers_count: i64,
}
