//! Config - スキルの設定
//!
//! 起動時に一度だけ読み込み、オーケストレータへ渡します。
//! 以降は共有状態から遅延して読むことはありません。
//!
//! # 読み込み元（後勝ち）
//! - JSON ファイル（`SkillConfig::from_file`）
//! - 環境変数（`SkillConfig::apply_env`）:
//!   - `COWLISTS_API_KEY`, `COWLISTS_SECRET` - API 認証情報
//!   - `COWLISTS_TOKEN_PATH` - 認証トークンの保存先
//!   - `COWLISTS_ENDPOINT` - REST エンドポイントの上書き
//!   - `COWLISTS_TIMEOUT_SECS` - HTTP タイムアウト
//!
//! # 秘匿情報
//! `Debug` 出力では API キーと共有シークレットを伏せます。

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://api.rememberthemilk.com/services/rest/";
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://www.rememberthemilk.com/services/auth/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const REDACTED: &str = "<redacted>";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Credentials は API キーと共有シークレットの組
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &REDACTED)
            .field("secret", &REDACTED)
            .finish()
    }
}

/// SkillConfig は読み込み済みの設定全体
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillConfig {
    pub api_key: Option<String>,
    pub secret: Option<String>,
    pub token_path: Option<PathBuf>,
    pub endpoint: String,
    pub auth_endpoint: String,
    pub timeout_secs: u64,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            secret: None,
            token_path: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auth_endpoint: DEFAULT_AUTH_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for SkillConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("secret", &self.secret.as_ref().map(|_| REDACTED))
            .field("token_path", &self.token_path)
            .field("endpoint", &self.endpoint)
            .field("auth_endpoint", &self.auth_endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SkillConfig {
    pub fn with_credentials(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            secret: Some(secret.into()),
            ..Self::default()
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// プロセスの環境変数で `self` を上書き
    pub fn from_env(self) -> Result<Self, ConfigError> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// `lookup(name)` の値でフィールドを上書きする。空の値は無視
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("COWLISTS_API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(v) = get("COWLISTS_SECRET") {
            self.secret = Some(v);
        }
        if let Some(v) = get("COWLISTS_TOKEN_PATH") {
            self.token_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("COWLISTS_ENDPOINT") {
            self.endpoint = v;
        }
        if let Some(v) = get("COWLISTS_TIMEOUT_SECS") {
            self.timeout_secs = v.trim().parse().map_err(|e| {
                ConfigError::InvalidValue("COWLISTS_TIMEOUT_SECS".to_string(), format!("{e}"))
            })?;
        }
        Ok(self)
    }

    /// 両方そろった認証情報。どちらかが欠けるか空白なら `None`
    pub fn credentials(&self) -> Option<Credentials> {
        let api_key = self.api_key.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        let secret = self.secret.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        Some(Credentials {
            api_key: api_key.to_string(),
            secret: secret.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn default_config_has_no_credentials() {
        let config = SkillConfig::default();
        assert!(config.credentials().is_none());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn credentials_require_key_and_secret() {
        let only_key = SkillConfig {
            api_key: Some("key".to_string()),
            ..SkillConfig::default()
        };
        assert!(only_key.credentials().is_none());

        let blank_secret = SkillConfig::with_credentials("key", "   ");
        assert!(blank_secret.credentials().is_none());

        let both = SkillConfig::with_credentials("key", "secret");
        assert_eq!(both.credentials().unwrap().api_key, "key");
    }

    #[test]
    fn env_overrides_file_values() {
        let config = SkillConfig::with_credentials("file-key", "file-secret")
            .apply_env(env(&[
                ("COWLISTS_API_KEY", "env-key"),
                ("COWLISTS_SECRET", ""),
                ("COWLISTS_TIMEOUT_SECS", "3"),
            ]))
            .unwrap();

        let creds = config.credentials().unwrap();
        assert_eq!(creds.api_key, "env-key");
        assert_eq!(creds.secret, "file-secret");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let err = SkillConfig::default()
            .apply_env(env(&[("COWLISTS_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "COWLISTS_TIMEOUT_SECS"));
    }

    #[test]
    fn file_config_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_key": "k", "secret": "s"}}"#).unwrap();

        let config = SkillConfig::from_file(file.path()).unwrap();

        assert!(config.credentials().is_some());
        assert_eq!(config.auth_endpoint, DEFAULT_AUTH_ENDPOINT);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let config = SkillConfig::with_credentials("api-key-0042", "hunter2");
        let printed = format!("{config:?}");
        let creds = format!("{:?}", config.credentials().unwrap());

        for output in [&printed, &creds] {
            assert!(!output.contains("hunter2"));
            assert!(!output.contains("api-key-0042"));
        }
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains(DEFAULT_ENDPOINT));
    }
}
