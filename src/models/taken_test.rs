use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TakenTest {
    pub id: Uuid,
    pub student_id: Uuid,
    pub test_id: Uuid,
    pub score: Decimal,
    pub date: DateTime<Utc>,
}
