pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    attempt_service::AttemptService, auth_service::AuthService,
    notification_service::NotificationService, question_service::QuestionService,
    test_service::TestService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub test_service: TestService,
    pub question_service: QuestionService,
    pub attempt_service: AttemptService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        let notification_service = NotificationService::from_config(http_client, config);
        Ok(Self::with_notifier(pool, notification_service))
    }

    /// Builds the state around a given notifier, e.g. one with a stub mailer.
    pub fn with_notifier(pool: PgPool, notification_service: NotificationService) -> Self {
        Self {
            auth_service: AuthService::new(pool.clone()),
            test_service: TestService::new(pool.clone()),
            question_service: QuestionService::new(pool.clone()),
            attempt_service: AttemptService::new(pool.clone(), notification_service),
            pool,
        }
    }

    pub fn config(&self) -> &'static Config {
        crate::config::get_config()
    }
}
