use crate::config::toml_config::EmailConfig;
use crate::domain::ports::NotificationSink;
use crate::utils::error::{Result, SanctuaryError};
use crate::utils::validation::validate_required_field;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

struct Failure {
    error: SanctuaryError,
    retryable: bool,
}

/// Delivers email through the Resend HTTP API.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl ResendMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let api_key = validate_required_field("email.api_key", &config.api_key)?;
        let from = validate_required_field("email.from", &config.from)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: api_key.clone(),
            from: from.clone(),
            retry_attempts: config.retry_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    async fn try_send(&self, request: &SendEmailRequest<'_>) -> std::result::Result<String, Failure> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Failure {
                error: SanctuaryError::Http(e),
                retryable: true,
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Failure {
                error: SanctuaryError::Notification {
                    message: format!("provider returned {}: {}", status, detail),
                },
                retryable: status.is_server_error() || status.as_u16() == 429,
            });
        }

        let id = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("id").and_then(|v| v.as_str()).map(String::from))
            .unwrap_or_default();
        Ok(id)
    }
}

#[async_trait]
impl NotificationSink for ResendMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let request = SendEmailRequest {
            from: &self.from,
            to: [to],
            subject,
            html: body,
        };

        let mut attempt = 1;
        loop {
            match self.try_send(&request).await {
                Ok(id) => {
                    tracing::debug!("Email sent successfully. ID: {}", id);
                    return Ok(());
                }
                Err(Failure {
                    error,
                    retryable: true,
                }) if attempt < self.retry_attempts => {
                    tracing::warn!(
                        "Email attempt {}/{} to {} failed: {}",
                        attempt,
                        self.retry_attempts,
                        to,
                        error
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }
}

/// Stand-in used when email delivery is switched off: records what would
/// have been sent.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl NotificationSink for LogMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
        tracing::info!("Email delivery disabled; would send '{}' to {}", subject, to);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Mailer {
    Resend(ResendMailer),
    Log(LogMailer),
}

impl Mailer {
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        if config.enabled {
            tracing::info!("Email notifications enabled via {}", config.endpoint);
            Ok(Mailer::Resend(ResendMailer::new(config)?))
        } else {
            tracing::info!("Email notifications disabled, logging only");
            Ok(Mailer::Log(LogMailer))
        }
    }
}

#[async_trait]
impl NotificationSink for Mailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        match self {
            Mailer::Resend(mailer) => mailer.send(to, subject, body).await,
            Mailer::Log(mailer) => mailer.send(to, subject, body).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn config(endpoint: String, retry_attempts: u32) -> EmailConfig {
        EmailConfig {
            enabled: true,
            endpoint,
            api_key: Some("re_test_key".to_string()),
            from: Some("zoo@sanctuary.example".to_string()),
            timeout_seconds: 5,
            retry_attempts,
            retry_delay_ms: 1,
        }
    }

    #[tokio::test]
    async fn test_send_posts_resend_payload() {
        let server = MockServer::start_async().await;
        let email_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/emails")
                    .header("Authorization", "Bearer re_test_key")
                    .json_body(serde_json::json!({
                        "from": "zoo@sanctuary.example",
                        "to": ["ana@zoo.example"],
                        "subject": "Animal Removido: Simba",
                        "html": "<b>Simba</b>"
                    }));
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({"id": "email-1"}));
            })
            .await;

        let mailer = ResendMailer::new(&config(server.url("/emails"), 1)).unwrap();
        mailer
            .send("ana@zoo.example", "Animal Removido: Simba", "<b>Simba</b>")
            .await
            .unwrap();

        email_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_reported() {
        let server = MockServer::start_async().await;
        let email_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/emails");
                then.status(503).body("unavailable");
            })
            .await;

        let mailer = ResendMailer::new(&config(server.url("/emails"), 3)).unwrap();
        let err = mailer.send("ana@zoo.example", "s", "b").await.unwrap_err();

        assert!(matches!(err, SanctuaryError::Notification { .. }));
        email_mock.assert_hits_async(3).await;
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start_async().await;
        let email_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/emails");
                then.status(422).body("invalid recipient");
            })
            .await;

        let mailer = ResendMailer::new(&config(server.url("/emails"), 3)).unwrap();
        assert!(mailer.send("not-an-address", "s", "b").await.is_err());
        email_mock.assert_hits_async(1).await;
    }

    #[test]
    fn test_missing_api_key_is_a_config_error() {
        let mut cfg = config("https://api.resend.com/emails".to_string(), 1);
        cfg.api_key = None;
        assert!(matches!(
            ResendMailer::new(&cfg),
            Err(SanctuaryError::MissingConfig { .. })
        ));
    }

    #[test]
    fn test_log_mailer_always_succeeds() {
        let result = tokio_test::block_on(LogMailer.send("ana@zoo.example", "s", "b"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_disabled_email_selects_log_mailer() {
        let mut cfg = config("https://api.resend.com/emails".to_string(), 1);
        cfg.enabled = false;
        assert!(matches!(Mailer::from_config(&cfg).unwrap(), Mailer::Log(_)));
    }
}
