//! OrchestratorBuilder - オーケストレーターの構築とワイヤリング
//!
//! - 設定・リモートサービス・通知先を一箇所で組み立てる
//! - 起動時検証（Fail-fast 設計）

use std::sync::Arc;

use crate::config::SkillConfig;
use crate::impls::notify::LogNotifier;
use crate::ports::{AuthLinkNotifier, RemoteTaskService};

use super::orchestrator::InteractionOrchestrator;

/// OrchestratorBuilder は InteractionOrchestrator を構築
///
/// # 使用例
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new(config)
///     .service(Arc::new(client))
///     .require_credentials()
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - service() が無ければ build() は BuildError::MissingService
/// - require_credentials() を指定した場合のみ、認証情報の欠落も build() で検出
///   （指定しなければ各操作が ConfigNotFound を返す）
pub struct OrchestratorBuilder {
    config: SkillConfig,
    service: Option<Arc<dyn RemoteTaskService>>,
    notifier: Option<Arc<dyn AuthLinkNotifier>>,
    require_credentials: bool,
}

/// BuildError は構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No remote task service configured. Call .service(...) before build().")]
    MissingService,

    #[error("API key or shared secret missing from configuration.")]
    MissingCredentials,
}

impl OrchestratorBuilder {
    pub fn new(config: SkillConfig) -> Self {
        Self {
            config,
            service: None,
            notifier: None,
            require_credentials: false,
        }
    }

    pub fn service(mut self, service: Arc<dyn RemoteTaskService>) -> Self {
        self.service = Some(service);
        self
    }

    /// 認証リンクの送り先（未指定なら LogNotifier）
    pub fn notifier(mut self, notifier: Arc<dyn AuthLinkNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn require_credentials(mut self) -> Self {
        self.require_credentials = true;
        self
    }

    pub fn build(self) -> Result<InteractionOrchestrator, BuildError> {
        let service = self.service.ok_or(BuildError::MissingService)?;
        if self.require_credentials && self.config.credentials().is_none() {
            return Err(BuildError::MissingCredentials);
        }
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(LogNotifier) as Arc<dyn AuthLinkNotifier>);
        Ok(InteractionOrchestrator::new(self.config, service, notifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DialogKey;
    use crate::impls::memory::InMemoryTaskService;

    #[test]
    fn test_build_success() {
        let orchestrator = OrchestratorBuilder::new(SkillConfig::with_credentials("key", "secret"))
            .service(Arc::new(InMemoryTaskService::new()))
            .require_credentials()
            .build();
        assert!(orchestrator.is_ok());
    }

    #[test]
    fn test_build_missing_service() {
        let orchestrator = OrchestratorBuilder::new(SkillConfig::default()).build();
        assert!(matches!(orchestrator, Err(BuildError::MissingService)));
    }

    #[test]
    fn test_build_missing_credentials() {
        let orchestrator = OrchestratorBuilder::new(SkillConfig::default())
            .service(Arc::new(InMemoryTaskService::new()))
            .require_credentials()
            .build();
        assert!(matches!(orchestrator, Err(BuildError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_build_without_credentials_reports_at_runtime() {
        let mut orchestrator = OrchestratorBuilder::new(SkillConfig::default())
            .service(Arc::new(InMemoryTaskService::new()))
            .build()
            .unwrap();

        let reply = orchestrator.authenticate().await;
        assert_eq!(reply.first_key(), Some(DialogKey::ConfigNotFound));
    }
}
