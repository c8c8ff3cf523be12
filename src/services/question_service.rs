use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::teacher_dto::{AnswerForm, QuestionChangePayload, QuestionDetail, QuestionPayload};
use crate::error::{Error, Result};
use crate::models::answer::Answer;
use crate::models::question::Question;
use crate::services::test_service::load_owned_test;
use crate::utils::validation::{validate_answer_set, AnswerDraft};

const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

/// Writes needed to bring a question's answers in line with a submitted formset.
#[derive(Debug, Default, PartialEq)]
pub struct AnswerPlan {
    pub delete: Vec<Uuid>,
    pub update: Vec<(Uuid, AnswerDraft)>,
    pub create: Vec<AnswerDraft>,
    /// The answer set the question ends up with.
    pub resulting: Vec<AnswerDraft>,
}

/// Forms with an `id` edit or delete that existing answer; forms without one
/// add an answer (unless flagged for deletion). Existing answers the formset
/// does not mention are kept.
pub fn plan_answer_changes(existing: &[Answer], forms: &[AnswerForm]) -> Result<AnswerPlan> {
    let mut plan = AnswerPlan::default();
    let mut seen = HashSet::new();

    for form in forms {
        let draft = AnswerDraft {
            text: form.text.trim().to_string(),
            is_correct: form.is_correct,
        };
        match form.id {
            Some(id) => {
                if !existing.iter().any(|a| a.id == id) || !seen.insert(id) {
                    return Err(Error::BadRequest(INVALID_CHOICE.into()));
                }
                if form.delete {
                    plan.delete.push(id);
                } else {
                    plan.resulting.push(draft.clone());
                    plan.update.push((id, draft));
                }
            }
            None if form.delete => {}
            None => {
                plan.resulting.push(draft.clone());
                plan.create.push(draft);
            }
        }
    }

    for answer in existing.iter().filter(|a| !seen.contains(&a.id)) {
        plan.resulting.push(AnswerDraft {
            text: answer.text.clone(),
            is_correct: answer.is_correct,
        });
    }

    validate_answer_set(&plan.resulting).map_err(|e| Error::BadRequest(e.to_string()))?;
    Ok(plan)
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn add_question(
        &self,
        test_id: Uuid,
        owner_id: Uuid,
        payload: QuestionPayload,
    ) -> Result<Question> {
        let test = load_owned_test(&self.pool, test_id, owner_id).await?;
        let question = sqlx::query_as::<_, Question>(
            r#"INSERT INTO questions (test_id, text) VALUES ($1, $2) RETURNING *"#,
        )
        .bind(test.id)
        .bind(payload.text.trim())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(question_id = %question.id, test_id = %test_id, "question added");
        Ok(question)
    }

    pub async fn get_question(
        &self,
        test_id: Uuid,
        question_id: Uuid,
        owner_id: Uuid,
    ) -> Result<QuestionDetail> {
        let test = load_owned_test(&self.pool, test_id, owner_id).await?;
        let question = sqlx::query_as::<_, Question>(
            r#"SELECT * FROM questions WHERE id = $1 AND test_id = $2"#,
        )
        .bind(question_id)
        .bind(test.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".into()))?;
        let answers = sqlx::query_as::<_, Answer>(
            r#"SELECT * FROM answers WHERE question_id = $1 ORDER BY text, id"#,
        )
        .bind(question.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(QuestionDetail {
            test,
            question,
            answers,
        })
    }

    /// Saves the question text and its answer formset atomically.
    pub async fn change_question(
        &self,
        test_id: Uuid,
        question_id: Uuid,
        owner_id: Uuid,
        payload: QuestionChangePayload,
    ) -> Result<QuestionDetail> {
        let mut tx = self.pool.begin().await?;

        let test = load_owned_test(&mut *tx, test_id, owner_id).await?;
        let question = sqlx::query_as::<_, Question>(
            r#"SELECT * FROM questions WHERE id = $1 AND test_id = $2 FOR UPDATE"#,
        )
        .bind(question_id)
        .bind(test.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".into()))?;

        let existing = sqlx::query_as::<_, Answer>(r#"SELECT * FROM answers WHERE question_id = $1"#)
            .bind(question.id)
            .fetch_all(&mut *tx)
            .await?;

        let plan = plan_answer_changes(&existing, &payload.answers)?;

        sqlx::query(r#"UPDATE questions SET text = $1 WHERE id = $2"#)
            .bind(payload.text.trim())
            .bind(question.id)
            .execute(&mut *tx)
            .await?;

        for id in &plan.delete {
            sqlx::query(r#"DELETE FROM answers WHERE id = $1 AND question_id = $2"#)
                .bind(id)
                .bind(question.id)
                .execute(&mut *tx)
                .await?;
        }
        for (id, draft) in &plan.update {
            sqlx::query(
                r#"UPDATE answers SET text = $1, is_correct = $2 WHERE id = $3 AND question_id = $4"#,
            )
            .bind(&draft.text)
            .bind(draft.is_correct)
            .bind(id)
            .bind(question.id)
            .execute(&mut *tx)
            .await?;
        }
        for draft in &plan.create {
            sqlx::query(r#"INSERT INTO answers (question_id, text, is_correct) VALUES ($1, $2, $3)"#)
                .bind(question.id)
                .bind(&draft.text)
                .bind(draft.is_correct)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(
            question_id = %question.id,
            deleted = plan.delete.len(),
            updated = plan.update.len(),
            created = plan.create.len(),
            "question and answers saved"
        );

        self.get_question(test_id, question_id, owner_id).await
    }

    pub async fn delete_question(
        &self,
        test_id: Uuid,
        question_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Question> {
        let test = load_owned_test(&self.pool, test_id, owner_id).await?;
        let question = sqlx::query_as::<_, Question>(
            r#"DELETE FROM questions WHERE id = $1 AND test_id = $2 RETURNING *"#,
        )
        .bind(question_id)
        .bind(test.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Question not found".into()))?;

        tracing::info!(question_id = %question.id, test_id = %test_id, "question deleted");
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(text: &str, is_correct: bool) -> Answer {
        Answer {
            id: Uuid::new_v4(),
            question_id: Uuid::nil(),
            text: text.into(),
            is_correct,
        }
    }

    fn form(id: Option<Uuid>, text: &str, is_correct: bool, delete: bool) -> AnswerForm {
        AnswerForm {
            id,
            text: text.into(),
            is_correct,
            delete,
        }
    }

    #[test]
    fn new_question_gets_created_answers() {
        let plan = plan_answer_changes(
            &[],
            &[form(None, "4", true, false), form(None, "5", false, false)],
        )
        .unwrap();
        assert_eq!(plan.create.len(), 2);
        assert!(plan.update.is_empty());
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn no_correct_answer_rejects_whole_formset() {
        let err = plan_answer_changes(
            &[],
            &[form(None, "3", false, false), form(None, "5", false, false)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "Mark at least one answer as correct."));
    }

    #[test]
    fn unmentioned_answers_count_toward_result() {
        let existing = vec![answer("4", true), answer("5", false), answer("6", false)];
        let err = plan_answer_changes(
            &existing,
            &[form(None, "7", false, false), form(None, "8", false, false)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "Please submit at most 4 answers."));
    }

    #[test]
    fn deleting_the_only_correct_answer_is_rejected() {
        let existing = vec![answer("4", true), answer("5", false), answer("6", false)];
        let err = plan_answer_changes(&existing, &[form(Some(existing[0].id), "4", true, true)])
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn update_and_delete_existing_answers() {
        let existing = vec![answer("4", false), answer("5", true), answer("6", false)];
        let plan = plan_answer_changes(
            &existing,
            &[
                form(Some(existing[0].id), "four", true, false),
                form(Some(existing[1].id), "5", true, true),
            ],
        )
        .unwrap();
        assert_eq!(plan.delete, vec![existing[1].id]);
        assert_eq!(plan.update.len(), 1);
        assert_eq!(plan.update[0].1.text, "four");
        assert_eq!(plan.resulting.len(), 2);
    }

    #[test]
    fn foreign_or_repeated_ids_are_invalid_choices() {
        let existing = vec![answer("4", true), answer("5", false)];
        let foreign = plan_answer_changes(&existing, &[form(Some(Uuid::new_v4()), "x", true, false)]);
        assert!(matches!(foreign, Err(Error::BadRequest(msg)) if msg == INVALID_CHOICE));

        let id = existing[0].id;
        let repeated = plan_answer_changes(
            &existing,
            &[form(Some(id), "4", true, false), form(Some(id), "4", true, false)],
        );
        assert!(repeated.is_err());
    }

    #[test]
    fn deleted_extra_forms_are_ignored() {
        let plan = plan_answer_changes(
            &[],
            &[
                form(None, "4", true, false),
                form(None, "5", false, false),
                form(None, "junk", false, true),
            ],
        )
        .unwrap();
        assert_eq!(plan.create.len(), 2);
    }
}
