//! Notify - AuthLinkNotifier の実装

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::ports::{AuthLinkNotifier, NotifyError};

/// LogNotifier は認可リンクをメールの代わりにログへ書く
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl AuthLinkNotifier for LogNotifier {
    async fn deliver(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!(subject = subject, body = body, "auth link delivered");
        Ok(())
    }
}

/// Delivery は届けたメッセージ 1 通
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub subject: String,
    pub body: String,
}

/// RecordingNotifier は届いたメッセージをメモリに残す（拒否させることもできる）
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<Delivery>>,
    failure: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// すべての配送を `reason` で失敗させる（何も記録しない）
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            failure: Some(reason.into()),
        }
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().await.clone()
    }
}

#[async_trait]
impl AuthLinkNotifier for RecordingNotifier {
    async fn deliver(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        if let Some(reason) = &self.failure {
            return Err(NotifyError(reason.clone()));
        }
        self.deliveries.lock().await.push(Delivery {
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_notifier_keeps_deliveries() {
        let notifier = RecordingNotifier::new();
        notifier.deliver("Authentication", "link").await.unwrap();

        assert_eq!(
            notifier.deliveries().await,
            vec![Delivery {
                subject: "Authentication".to_string(),
                body: "link".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn failing_notifier_records_nothing() {
        let notifier = RecordingNotifier::failing("smtp down");
        let err = notifier.deliver("Authentication", "link").await.unwrap_err();

        assert_eq!(err.0, "smtp down");
        assert!(notifier.deliveries().await.is_empty());
    }
}
