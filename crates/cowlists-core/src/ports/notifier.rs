//! AuthLinkNotifier port - 認可リンクを音声以外の経路で届ける
//!
//! 音声アシスタントは URL をうまく読み上げられないため、
//! Authenticate はメールなどの別経路でリンクを送ります。

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to deliver notification: {0}")]
pub struct NotifyError(pub String);

/// AuthLinkNotifier は件名と本文を 1 通届ける
#[async_trait]
pub trait AuthLinkNotifier: Send + Sync {
    async fn deliver(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}
