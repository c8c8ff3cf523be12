use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::auth_dto::{StudentSignUpPayload, TeacherSignUpPayload};
use crate::error::{Error, Result};
use crate::models::student::Student;
use crate::models::user::{Role, User};
use crate::utils::crypto::{hash_password, verify_password};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn sign_up_teacher(&self, payload: TeacherSignUpPayload) -> Result<User> {
        let mut tx = self.pool.begin().await?;
        let user = insert_user(&mut tx, &payload.username, &payload.password1, Role::Teacher).await?;
        tx.commit().await?;
        tracing::info!(user_id = %user.id, username = %user.username, "teacher signed up");
        Ok(user)
    }

    /// Creates the user and its student profile in one transaction.
    pub async fn sign_up_student(&self, payload: StudentSignUpPayload) -> Result<(User, Student)> {
        let mut tx = self.pool.begin().await?;
        let user = insert_user(&mut tx, &payload.username, &payload.password1, Role::Student).await?;
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (user_id, first_name, surname, email)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(payload.first_name.trim())
        .bind(payload.surname.trim())
        .bind(payload.email.trim())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::info!(user_id = %user.id, username = %user.username, "student signed up");
        Ok((user, student))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE username = $1"#)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        let Some(user) = user else {
            tracing::debug!(%username, "login for unknown user");
            return Err(Error::Unauthorized("invalid_credentials".into()));
        };
        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(%username, "login with wrong password");
            return Err(Error::Unauthorized("invalid_credentials".into()));
        }
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        user.ok_or_else(|| Error::Unauthorized("unknown_user".into()))
    }
}

async fn insert_user(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
    password: &str,
    role: Role,
) -> Result<User> {
    let exists: bool =
        sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)"#)
            .bind(username)
            .fetch_one(&mut **tx)
            .await?;
    if exists {
        return Err(Error::BadRequest(USERNAME_TAKEN.into()));
    }

    let password_hash = hash_password(password)?;
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password_hash, role)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::BadRequest(USERNAME_TAKEN.into())
        }
        other => other.into(),
    })?;
    Ok(user)
}
