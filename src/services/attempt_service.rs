use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::student_dto::{
    AnswerChoice, AvailableTest, CompletedTest, QuestionView, TakeTestView, TakenTestEntry,
    TestHeader,
};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::student::Student;
use crate::models::student_answer::StudentAnswer;
use crate::models::taken_test::TakenTest;
use crate::models::test::Test;
use crate::services::grading_service::GradingService;
use crate::services::notification_service::NotificationService;

const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Where a student stands on a test.
#[derive(Debug, Clone)]
pub enum TakeStep {
    /// A TakenTest already exists; no retake.
    AlreadyTaken,
    Question(TakeTestView),
    Completed(CompletedTest),
}

#[derive(Clone)]
pub struct AttemptService {
    pool: PgPool,
    notifier: NotificationService,
}

impl AttemptService {
    pub fn new(pool: PgPool, notifier: NotificationService) -> Self {
        Self { pool, notifier }
    }

    /// Tests the student has not taken yet that have at least one question.
    pub async fn list_available_tests(&self, student_id: Uuid) -> Result<Vec<AvailableTest>> {
        let tests = sqlx::query_as::<_, AvailableTest>(
            r#"
            SELECT t.id, t.name, t.pass_percentage, COUNT(q.id) AS questions_count
            FROM tests t
            JOIN questions q ON q.test_id = t.id
            WHERE NOT EXISTS (
                SELECT 1 FROM taken_tests tt
                WHERE tt.test_id = t.id AND tt.student_id = $1
            )
            GROUP BY t.id
            ORDER BY t.name, t.id
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    pub async fn list_taken_tests(&self, student_id: Uuid) -> Result<Vec<TakenTestEntry>> {
        let taken = sqlx::query_as::<_, TakenTestEntry>(
            r#"
            SELECT tt.id, tt.test_id, t.name AS test_name, tt.score, tt.date
            FROM taken_tests tt
            JOIN tests t ON t.id = tt.test_id
            WHERE tt.student_id = $1
            ORDER BY t.name, tt.date
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(taken)
    }

    /// The question to present next, or the outcome if nothing is left.
    pub async fn current_step(&self, student_id: Uuid, test_id: Uuid) -> Result<TakeStep> {
        let mut tx = self.pool.begin().await?;
        let test = load_test(&mut tx, test_id).await?;
        let student = load_student(&mut tx, student_id).await?;
        if has_taken(&mut tx, student.user_id, test.id).await? {
            return Ok(TakeStep::AlreadyTaken);
        }

        let total = count_questions(&mut tx, test.id).await?;
        if total == 0 {
            return Err(Error::BadRequest("This test has no questions yet.".into()));
        }
        let unanswered = unanswered_questions(&mut tx, student.user_id, test.id).await?;

        match unanswered.first() {
            Some(question) => {
                let view = build_view(&mut tx, &test, question, unanswered.len() as i64, total).await?;
                tx.commit().await?;
                Ok(TakeStep::Question(view))
            }
            None => {
                let Some(taken) = finalize(&mut tx, &student, &test, total).await? else {
                    return Ok(TakeStep::AlreadyTaken);
                };
                tx.commit().await?;
                Ok(TakeStep::Completed(self.complete(&student, &test, taken).await))
            }
        }
    }

    /// Records one answer to the currently presented question and, when it
    /// was the last one, grades the attempt.
    pub async fn submit_answer(
        &self,
        student_id: Uuid,
        test_id: Uuid,
        answer_id: Uuid,
    ) -> Result<TakeStep> {
        let mut tx = self.pool.begin().await?;
        let test = load_test(&mut tx, test_id).await?;
        let student = load_student(&mut tx, student_id).await?;
        if has_taken(&mut tx, student.user_id, test.id).await? {
            return Ok(TakeStep::AlreadyTaken);
        }

        let total = count_questions(&mut tx, test.id).await?;
        if total == 0 {
            return Err(Error::BadRequest("This test has no questions yet.".into()));
        }
        let unanswered = unanswered_questions(&mut tx, student.user_id, test.id).await?;

        let Some(question) = unanswered.first() else {
            let Some(taken) = finalize(&mut tx, &student, &test, total).await? else {
                return Ok(TakeStep::AlreadyTaken);
            };
            tx.commit().await?;
            return Ok(TakeStep::Completed(self.complete(&student, &test, taken).await));
        };

        let belongs: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM answers WHERE id = $1 AND question_id = $2)"#,
        )
        .bind(answer_id)
        .bind(question.id)
        .fetch_one(&mut *tx)
        .await?;
        if !belongs {
            return Err(Error::BadRequest(INVALID_CHOICE.into()));
        }

        let recorded = sqlx::query_as::<_, StudentAnswer>(
            r#"
            INSERT INTO student_answers (student_id, answer_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(student.user_id)
        .bind(answer_id)
        .fetch_one(&mut *tx)
        .await?;
        tracing::debug!(
            student_answer_id = %recorded.id,
            student_id = %student.user_id,
            test_id = %test.id,
            question_id = %question.id,
            "answer recorded"
        );

        if let Some(next) = unanswered.get(1) {
            let remaining = (unanswered.len() - 1) as i64;
            let view = build_view(&mut tx, &test, next, remaining, total).await?;
            tx.commit().await?;
            return Ok(TakeStep::Question(view));
        }

        let Some(taken) = finalize(&mut tx, &student, &test, total).await? else {
            // A concurrent submission graded first; this one is discarded.
            return Ok(TakeStep::AlreadyTaken);
        };
        tx.commit().await?;
        Ok(TakeStep::Completed(self.complete(&student, &test, taken).await))
    }

    /// Runs after the TakenTest is committed; the email cannot undo it.
    async fn complete(&self, student: &Student, test: &Test, taken: TakenTest) -> CompletedTest {
        let result = GradingService::classify(taken.score, test.pass_percentage);
        let message = GradingService::result_message(&test.name, taken.score, result);
        tracing::info!(
            student_id = %student.user_id,
            test_id = %test.id,
            score = %taken.score,
            result = %result,
            "test completed"
        );

        self.notifier
            .notify_result(
                &student.email,
                &student.first_name,
                &test.name,
                result,
                taken.score,
                taken.date,
            )
            .await;

        CompletedTest {
            test_id: test.id,
            test_name: test.name.clone(),
            score: taken.score,
            result,
            message,
        }
    }
}

async fn load_test(conn: &mut PgConnection, test_id: Uuid) -> Result<Test> {
    sqlx::query_as::<_, Test>(r#"SELECT * FROM tests WHERE id = $1"#)
        .bind(test_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| Error::NotFound("Test not found".into()))
}

async fn load_student(conn: &mut PgConnection, user_id: Uuid) -> Result<Student> {
    sqlx::query_as::<_, Student>(r#"SELECT * FROM students WHERE user_id = $1"#)
        .bind(user_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| Error::NotFound("Student profile not found".into()))
}

async fn has_taken(conn: &mut PgConnection, student_id: Uuid, test_id: Uuid) -> Result<bool> {
    let taken: bool = sqlx::query_scalar(
        r#"SELECT EXISTS(SELECT 1 FROM taken_tests WHERE student_id = $1 AND test_id = $2)"#,
    )
    .bind(student_id)
    .bind(test_id)
    .fetch_one(conn)
    .await?;
    Ok(taken)
}

async fn count_questions(conn: &mut PgConnection, test_id: Uuid) -> Result<i64> {
    let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM questions WHERE test_id = $1"#)
        .bind(test_id)
        .fetch_one(conn)
        .await?;
    Ok(total)
}

/// The test's questions the student has no recorded answer for, by text.
async fn unanswered_questions(
    conn: &mut PgConnection,
    student_id: Uuid,
    test_id: Uuid,
) -> Result<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT q.* FROM questions q
        WHERE q.test_id = $1
          AND q.id NOT IN (
            SELECT a.question_id
            FROM student_answers sa
            JOIN answers a ON a.id = sa.answer_id
            WHERE sa.student_id = $2
          )
        ORDER BY q.text, q.id
        "#,
    )
    .bind(test_id)
    .bind(student_id)
    .fetch_all(conn)
    .await?;
    Ok(questions)
}

async fn build_view(
    conn: &mut PgConnection,
    test: &Test,
    question: &Question,
    remaining: i64,
    total: i64,
) -> Result<TakeTestView> {
    let answers = sqlx::query_as::<_, AnswerChoice>(
        r#"SELECT id, text FROM answers WHERE question_id = $1 ORDER BY text, id"#,
    )
    .bind(question.id)
    .fetch_all(conn)
    .await?;

    Ok(TakeTestView {
        test: TestHeader {
            id: test.id,
            name: test.name.clone(),
            pass_percentage: test.pass_percentage,
        },
        question: QuestionView {
            id: question.id,
            text: question.text.clone(),
        },
        answers,
        progress: GradingService::progress(remaining, total),
    })
}

/// Scores the attempt and writes the TakenTest row. `None` when a row for
/// this student and test already exists.
async fn finalize(
    conn: &mut PgConnection,
    student: &Student,
    test: &Test,
    total: i64,
) -> Result<Option<TakenTest>> {
    let correct: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT a.question_id)
        FROM student_answers sa
        JOIN answers a ON a.id = sa.answer_id
        JOIN questions q ON q.id = a.question_id
        WHERE sa.student_id = $1 AND q.test_id = $2 AND a.is_correct
        "#,
    )
    .bind(student.user_id)
    .bind(test.id)
    .fetch_one(&mut *conn)
    .await?;

    let score = GradingService::score(correct, total);
    let taken = sqlx::query_as::<_, TakenTest>(
        r#"
        INSERT INTO taken_tests (student_id, test_id, score)
        VALUES ($1, $2, $3)
        ON CONFLICT (student_id, test_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(student.user_id)
    .bind(test.id)
    .bind(score)
    .fetch_optional(&mut *conn)
    .await?;
    if taken.is_none() {
        tracing::info!(
            student_id = %student.user_id,
            test_id = %test.id,
            "test already graded by a concurrent submission"
        );
    }
    Ok(taken)
}
