use validator::ValidationError;

pub const MIN_ANSWERS: usize = 2;
pub const MAX_ANSWERS: usize = 4;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Usernames: 150 characters or fewer, letters, digits and `@.+-_` only.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let ok = !username.is_empty()
        && username.chars().count() <= 150
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username"))
    }
}

/// Rejects values that are empty once surrounding whitespace is stripped.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("This field is required.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_password_pair(password1: &str, password2: &str) -> Result<(), ValidationError> {
    if password1 != password2 {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some("The two password fields didn't match.".into());
        return Err(err);
    }
    if password1.chars().count() < MIN_PASSWORD_LEN {
        let mut err = ValidationError::new("password_too_short");
        err.message = Some(
            format!(
                "This password is too short. It must contain at least {} characters.",
                MIN_PASSWORD_LEN
            )
            .into(),
        );
        return Err(err);
    }
    if password1.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("password_entirely_numeric");
        err.message = Some("This password is entirely numeric.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerDraft {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormsetError {
    #[error("Please submit at least 2 answers.")]
    TooFew,
    #[error("Please submit at most 4 answers.")]
    TooMany,
    #[error("Mark at least one answer as correct.")]
    NoCorrectAnswer,
}

/// Checks the answer set a question would end up with after a save.
pub fn validate_answer_set(answers: &[AnswerDraft]) -> Result<(), FormsetError> {
    if answers.len() < MIN_ANSWERS {
        return Err(FormsetError::TooFew);
    }
    if answers.len() > MAX_ANSWERS {
        return Err(FormsetError::TooMany);
    }
    if !answers.iter().any(|a| a.is_correct) {
        return Err(FormsetError::NoCorrectAnswer);
    }
    Ok(())
}
