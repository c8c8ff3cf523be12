use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Role,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| Error::Unauthorized("invalid_subject".into()))
    }
}

fn unauthorized(code: &str) -> Response {
    Error::Unauthorized(code.to_string()).into_response()
}

fn bearer_claims(req: &Request) -> std::result::Result<Claims, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(unauthorized("missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(unauthorized("bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(unauthorized("unsupported_scheme"));
    };

    let config = crate::config::get_config();
    crate::utils::token::decode_token(token, &config.jwt_secret)
        .map_err(|_| unauthorized("invalid_token"))
}

/// Admits any authenticated user; an empty `allowed` list means no role check.
pub async fn require_roles(mut req: Request, next: Next, allowed: &[Role]) -> Response {
    let claims = match bearer_claims(&req) {
        Ok(claims) => claims,
        Err(resp) => return resp,
    };
    if !allowed.is_empty() && !allowed.contains(&claims.role) {
        tracing::debug!(sub = %claims.sub, role = ?claims.role, "role not allowed");
        return Error::Forbidden("forbidden".into()).into_response();
    }
    req.extensions_mut().insert(claims);
    next.run(req).await
}

pub async fn require_bearer_auth(req: Request, next: Next) -> Response {
    require_roles(req, next, &[]).await
}

pub async fn require_teacher(req: Request, next: Next) -> Response {
    require_roles(req, next, &[Role::Teacher]).await
}

pub async fn require_student(req: Request, next: Next) -> Response {
    require_roles(req, next, &[Role::Student]).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_must_be_a_user_id() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id.to_string(),
            exp: 0,
            role: Role::Student,
        };
        assert_eq!(claims.user_id().unwrap(), id);

        let claims = Claims {
            sub: "42".into(),
            exp: 0,
            role: Role::Teacher,
        };
        assert!(matches!(claims.user_id(), Err(Error::Unauthorized(_))));
    }
}
