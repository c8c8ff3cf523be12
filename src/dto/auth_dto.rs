use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::user::Role;
use crate::utils::validation::{validate_not_blank, validate_password_pair, validate_username};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "teacher_passwords_match"))]
pub struct TeacherSignUpPayload {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    pub password1: String,
    pub password2: String,
}

fn teacher_passwords_match(payload: &TeacherSignUpPayload) -> Result<(), ValidationError> {
    validate_password_pair(&payload.password1, &payload.password2)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "student_passwords_match"))]
pub struct StudentSignUpPayload {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    pub password1: String,
    pub password2: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub surname: String,
    #[validate(email)]
    pub email: String,
}

fn student_passwords_match(payload: &StudentSignUpPayload) -> Result<(), ValidationError> {
    validate_password_pair(&payload.password1, &payload.password2)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: Uuid,
    pub role: Role,
    pub redirect_to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub redirect_to: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(first_name: &str, surname: &str) -> StudentSignUpPayload {
        StudentSignUpPayload {
            username: "testUser1".into(),
            password1: "India@123".into(),
            password2: "India@123".into(),
            first_name: first_name.into(),
            surname: surname.into(),
            email: "new1@gmail.com".into(),
        }
    }

    #[test]
    fn complete_student_form_is_valid() {
        assert!(student("testuser", "User1").validate().is_ok());
    }

    #[test]
    fn student_form_missing_names_is_invalid() {
        let errors = student("", "").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("surname"));
    }

    #[test]
    fn student_form_whitespace_names_are_invalid() {
        let errors = student("   ", "\t").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("surname"));
    }

    #[test]
    fn student_form_rejects_bad_email() {
        let mut payload = student("testuser", "User1");
        payload.email = "not-an-email".into();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn teacher_form_valid_and_missing_password() {
        let ok = TeacherSignUpPayload {
            username: "testUser1".into(),
            password1: "India@123".into(),
            password2: "India@123".into(),
        };
        assert!(ok.validate().is_ok());

        let missing = TeacherSignUpPayload {
            password1: String::new(),
            ..ok
        };
        assert!(missing.validate().is_err());
    }
}
