use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::dto::teacher_dto::{
    CreateTestPayload, TakenTestRow, TestDetail, TestResults, TestSummary, UpdateTestPayload,
};
use crate::error::{Error, Result};
use crate::models::question::QuestionWithCount;
use crate::models::test::Test;

#[derive(Clone)]
pub struct TestService {
    pool: PgPool,
}

impl TestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_test(&self, payload: CreateTestPayload, owner_id: Uuid) -> Result<Test> {
        let test = sqlx::query_as::<_, Test>(
            r#"
            INSERT INTO tests (owner_id, name, pass_percentage)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(payload.name.trim())
        .bind(payload.pass_percentage.value())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(test_id = %test.id, owner_id = %owner_id, "test created");
        Ok(test)
    }

    pub async fn get_owned_test(&self, test_id: Uuid, owner_id: Uuid) -> Result<Test> {
        load_owned_test(&self.pool, test_id, owner_id).await
    }

    pub async fn list_owned_tests(&self, owner_id: Uuid) -> Result<Vec<TestSummary>> {
        let tests = sqlx::query_as::<_, TestSummary>(
            r#"
            SELECT
                t.id,
                t.name,
                t.pass_percentage,
                COUNT(DISTINCT q.id) AS questions_count,
                COUNT(DISTINCT tt.id) AS taken_count
            FROM tests t
            LEFT JOIN questions q ON q.test_id = t.id
            LEFT JOIN taken_tests tt ON tt.test_id = t.id
            WHERE t.owner_id = $1
            GROUP BY t.id
            ORDER BY t.name, t.id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    pub async fn get_test_detail(&self, test_id: Uuid, owner_id: Uuid) -> Result<TestDetail> {
        let test = self.get_owned_test(test_id, owner_id).await?;
        let questions = sqlx::query_as::<_, QuestionWithCount>(
            r#"
            SELECT q.id, q.test_id, q.text, COUNT(a.id) AS answers_count
            FROM questions q
            LEFT JOIN answers a ON a.question_id = q.id
            WHERE q.test_id = $1
            GROUP BY q.id
            ORDER BY q.text, q.id
            "#,
        )
        .bind(test.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(TestDetail { test, questions })
    }

    pub async fn update_test(
        &self,
        test_id: Uuid,
        owner_id: Uuid,
        payload: UpdateTestPayload,
    ) -> Result<Test> {
        let mut tx = self.pool.begin().await?;
        load_owned_test(&mut *tx, test_id, owner_id).await?;
        let test = sqlx::query_as::<_, Test>(
            r#"UPDATE tests SET name = $1 WHERE id = $2 RETURNING *"#,
        )
        .bind(payload.name.trim())
        .bind(test_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(test)
    }

    /// Deletes the test and everything hanging off it.
    pub async fn delete_test(&self, test_id: Uuid, owner_id: Uuid) -> Result<Test> {
        let mut tx = self.pool.begin().await?;
        load_owned_test(&mut *tx, test_id, owner_id).await?;
        let test = sqlx::query_as::<_, Test>(r#"DELETE FROM tests WHERE id = $1 RETURNING *"#)
            .bind(test_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(test_id = %test.id, owner_id = %owner_id, "test deleted");
        Ok(test)
    }

    pub async fn test_results(&self, test_id: Uuid, owner_id: Uuid) -> Result<TestResults> {
        let test = self.get_owned_test(test_id, owner_id).await?;
        let taken_tests = sqlx::query_as::<_, TakenTestRow>(
            r#"
            SELECT tt.id, tt.student_id, u.username, tt.score, tt.date
            FROM taken_tests tt
            JOIN users u ON u.id = tt.student_id
            WHERE tt.test_id = $1
            ORDER BY tt.date DESC
            "#,
        )
        .bind(test.id)
        .fetch_all(&self.pool)
        .await?;

        let (total_taken_tests, average_score): (i64, Option<Decimal>) = sqlx::query_as(
            r#"SELECT COUNT(*), AVG(score) FROM taken_tests WHERE test_id = $1"#,
        )
        .bind(test.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(TestResults {
            test,
            taken_tests,
            total_taken_tests,
            average_score: average_score.map(|avg| avg.round_dp(2)),
        })
    }
}

/// Missing tests are 404; tests owned by another teacher are 403.
pub async fn load_owned_test<'e, E>(executor: E, test_id: Uuid, owner_id: Uuid) -> Result<Test>
where
    E: PgExecutor<'e>,
{
    let test = sqlx::query_as::<_, Test>(r#"SELECT * FROM tests WHERE id = $1"#)
        .bind(test_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| Error::NotFound("Test not found".into()))?;
    ensure_owner(&test, owner_id)?;
    Ok(test)
}

pub fn ensure_owner(test: &Test, owner_id: Uuid) -> Result<()> {
    if test.owner_id != owner_id {
        tracing::debug!(test_id = %test.id, %owner_id, "test belongs to another teacher");
        return Err(Error::Forbidden(
            "You do not have permission to manage this test.".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test::PassPercentage;

    fn test_owned_by(owner_id: Uuid) -> Test {
        Test {
            id: Uuid::new_v4(),
            owner_id,
            name: "Algebra 101".into(),
            pass_percentage: PassPercentage::P50,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn owner_passes_and_others_are_forbidden() {
        let owner = Uuid::new_v4();
        let test = test_owned_by(owner);
        assert!(ensure_owner(&test, owner).is_ok());
        assert!(matches!(
            ensure_owner(&test, Uuid::new_v4()),
            Err(Error::Forbidden(_))
        ));
    }
}
