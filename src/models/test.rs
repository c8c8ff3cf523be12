use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Pass threshold of a test. Only the listed steps are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum PassPercentage {
    P30,
    P40,
    P50,
    P60,
    P70,
    P80,
}

#[derive(Debug, thiserror::Error)]
#[error("pass percentage must be one of 30, 40, 50, 60, 70, 80 (got {0})")]
pub struct InvalidPassPercentage(pub i32);

impl PassPercentage {
    pub const ALL: [PassPercentage; 6] = [
        PassPercentage::P30,
        PassPercentage::P40,
        PassPercentage::P50,
        PassPercentage::P60,
        PassPercentage::P70,
        PassPercentage::P80,
    ];

    pub fn value(self) -> i32 {
        match self {
            PassPercentage::P30 => 30,
            PassPercentage::P40 => 40,
            PassPercentage::P50 => 50,
            PassPercentage::P60 => 60,
            PassPercentage::P70 => 70,
            PassPercentage::P80 => 80,
        }
    }
}

impl Default for PassPercentage {
    fn default() -> Self {
        PassPercentage::P30
    }
}

impl TryFrom<i32> for PassPercentage {
    type Error = InvalidPassPercentage;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        PassPercentage::ALL
            .into_iter()
            .find(|p| p.value() == value)
            .ok_or(InvalidPassPercentage(value))
    }
}

impl From<PassPercentage> for i32 {
    fn from(p: PassPercentage) -> Self {
        p.value()
    }
}

impl fmt::Display for PassPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Test {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    #[sqlx(try_from = "i32")]
    pub pass_percentage: PassPercentage,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_listed_thresholds() {
        for v in [30, 40, 50, 60, 70, 80] {
            assert_eq!(PassPercentage::try_from(v).unwrap().value(), v);
        }
        for v in [0, 35, 90, 100, -30] {
            assert!(PassPercentage::try_from(v).is_err());
        }
    }

    #[test]
    fn defaults_to_thirty() {
        assert_eq!(PassPercentage::default().value(), 30);
    }

    #[test]
    fn deserializes_from_plain_number() {
        let p: PassPercentage = serde_json::from_str("70").unwrap();
        assert_eq!(p, PassPercentage::P70);
        assert!(serde_json::from_str::<PassPercentage>("75").is_err());
        assert_eq!(serde_json::to_string(&PassPercentage::P50).unwrap(), "50");
    }
}
