//! Transactional email collaborator.

use std::sync::Arc;

use axum::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> anyhow::Result<()>;
}

/// Writes each message to the log instead of delivering it.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        info!(from = %email.from, to = %email.to, subject = %email.subject, "email sent");
        Ok(())
    }
}

/// Keeps every sent message in memory, newest last.
#[derive(Clone, Default)]
pub struct MemoryMailer {
    outbox: Arc<Mutex<Vec<Email>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn last(&self) -> Option<Email> {
        self.outbox.lock().await.last().cloned()
    }

    pub async fn clear(&self) {
        self.outbox.lock().await.clear();
    }

    pub async fn count(&self) -> usize {
        self.outbox.lock().await.len()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        anyhow::ensure!(!email.to.trim().is_empty(), "email has no recipient");
        self.outbox.lock().await.push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(subject: &str, text: &str) -> Email {
        Email {
            from: "Test <testlocalemail@test.com>".into(),
            to: "contact@emailtest.com".into(),
            subject: subject.into(),
            text: text.into(),
        }
    }

    #[tokio::test]
    async fn memory_mailer_keeps_last_email() {
        let mailer = MemoryMailer::new();
        mailer.send(email("Test email", "Body text.")).await.unwrap();
        mailer
            .send(email("Last email sended", "Last body text."))
            .await
            .unwrap();

        let last = mailer.last().await.expect("an email was sent");
        assert_eq!(last.to, "contact@emailtest.com");
        assert_eq!(last.subject, "Last email sended");
        assert_eq!(last.text, "Last body text.");
        assert_eq!(mailer.count().await, 2);

        mailer.clear().await;
        assert!(mailer.last().await.is_none());
    }

    #[tokio::test]
    async fn memory_mailer_rejects_missing_recipient() {
        let mailer = MemoryMailer::new();
        let mut message = email("s", "t");
        message.to = " ".into();
        assert!(mailer.send(message).await.is_err());
        assert_eq!(mailer.count().await, 0);
    }

    #[tokio::test]
    async fn log_mailer_accepts_messages() {
        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);
        mailer.send(email("hello", "world")).await.unwrap();
    }
}
