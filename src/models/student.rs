use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub user_id: Uuid,
    pub first_name: String,
    pub surname: Option<String>,
    pub email: String,
}
