use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::services::grading_service::TestResult;
use crate::utils::time::long_date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Outbound mail transport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &ResultEmail) -> Result<()>;
}

/// Posts messages as JSON to an HTTP mail relay.
pub struct RelayMailer {
    client: Client,
    url: String,
    token: Option<String>,
}

impl RelayMailer {
    pub fn new(client: Client, url: String, token: Option<String>) -> Self {
        Self { client, url, token }
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, email: &ResultEmail) -> Result<()> {
        let mut req = self.client.post(&self.url).json(email);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Internal(format!(
                "mail relay responded {}: {}",
                status, body
            )));
        }
        Ok(())
    }
}

/// Writes messages to the log instead of delivering them.
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, email: &ResultEmail) -> Result<()> {
        tracing::info!(
            from = %email.from,
            to = ?email.to,
            subject = %email.subject,
            body = %email.text,
            "mail relay not configured, logging message"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl NotificationService {
    pub fn new(mailer: Arc<dyn Mailer>, from: String) -> Self {
        Self { mailer, from }
    }

    pub fn from_config(client: Client, config: &crate::config::Config) -> Self {
        let mailer: Arc<dyn Mailer> = match &config.mail_relay_url {
            Some(url) => Arc::new(RelayMailer::new(
                client,
                url.clone(),
                config.mail_relay_token.clone(),
            )),
            None => Arc::new(ConsoleMailer),
        };
        Self::new(mailer, config.email_host_user.clone())
    }

    /// Sends the result email. Delivery failures are logged, never returned.
    pub async fn notify_result(
        &self,
        to: &str,
        first_name: &str,
        test_name: &str,
        result: TestResult,
        score: Decimal,
        date: DateTime<Utc>,
    ) {
        let email = render_result_email(&self.from, to, first_name, test_name, result, score, date);
        match self.mailer.send(&email).await {
            Ok(()) => tracing::info!(to = %to, test = %test_name, "result email sent"),
            Err(e) => tracing::warn!(error = ?e, to = %to, test = %test_name, "result email failed"),
        }
    }
}

pub fn render_result_email(
    from: &str,
    to: &str,
    first_name: &str,
    test_name: &str,
    result: TestResult,
    score: Decimal,
    date: DateTime<Utc>,
) -> ResultEmail {
    let subject = format!("Your Test Score for {} - Examination Board", test_name);
    let html = format!(
        "<html>\n<body>\n\
         <p>Dear {first_name},</p>\n\
         <p>You have completed the test <strong>{test_name}</strong> on {date}.</p>\n\
         <p>Result: <strong>{result}</strong></p>\n\
         <p>Score: <strong>{score}</strong></p>\n\
         <p>Regards,<br>\n\
         Examination Board</p>\n\
         </body>\n</html>",
        first_name = escape_html(first_name),
        test_name = escape_html(test_name),
        date = long_date(date),
        result = result,
        score = score,
    );
    let text = strip_tags(&html);
    ResultEmail {
        from: from.to_string(),
        to: vec![to.to_string()],
        subject,
        text,
        html,
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Drops markup and decodes the entities `escape_html` produces.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    let decoded = out
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&amp;", "&");
    decoded
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 9, 6, 18, 24, 0).unwrap()
    }

    #[test]
    fn email_carries_result_details() {
        let score: Decimal = "50.00".parse().unwrap();
        let email = render_result_email(
            "board@example.com",
            "alice@example.com",
            "Alice",
            "Algebra 101",
            TestResult::Passed,
            score,
            date(),
        );
        assert_eq!(email.subject, "Your Test Score for Algebra 101 - Examination Board");
        assert_eq!(email.to, vec!["alice@example.com".to_string()]);
        assert!(email.html.contains("<strong>Passed</strong>"));
        assert!(email.text.contains("Dear Alice,"));
        assert!(email.text.contains("Score: 50.00"));
        assert!(email.text.contains("06 September 2019"));
        assert!(!email.text.contains('<'));
    }

    #[test]
    fn markup_in_names_is_escaped_in_html_only() {
        let email = render_result_email(
            "board@example.com",
            "bob@example.com",
            "<Bob>",
            "A & B",
            TestResult::Failed,
            Decimal::ZERO,
            date(),
        );
        assert!(email.html.contains("&lt;Bob&gt;"));
        assert!(email.text.contains("Dear <Bob>,"));
        assert!(email.text.contains("A & B"));
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_| Err(Error::Internal("relay down".into())));
        let service = NotificationService::new(Arc::new(mailer), "board@example.com".into());
        service
            .notify_result(
                "alice@example.com",
                "Alice",
                "Algebra 101",
                TestResult::Failed,
                Decimal::ZERO,
                date(),
            )
            .await;
    }

    #[tokio::test]
    async fn sends_one_message_to_the_student() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|email| {
                email.to == vec!["alice@example.com".to_string()]
                    && email.from == "board@example.com"
                    && email.subject.contains("Algebra 101")
            })
            .times(1)
            .returning(|_| Ok(()));
        let service = NotificationService::new(Arc::new(mailer), "board@example.com".into());
        service
            .notify_result(
                "alice@example.com",
                "Alice",
                "Algebra 101",
                TestResult::Passed,
                "100.00".parse().unwrap(),
                date(),
            )
            .await;
    }
}
