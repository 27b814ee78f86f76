//! RtmClient - Remember The Milk の REST クライアント
//!
//! 署名付き JSON REST API の上で [`RemoteTaskService`] を実装します。
//!
//! # セッション
//! - 認証トークン: トークンファイルが設定されていれば読み込み、保存する
//! - frob（保留中のハンドシェイク）とタイムライン: メモリ上だけに持つ
//!
//! # エラー
//! 通信の失敗はコード `"http"`、解釈できない本文はコード `"parse"` の
//! `RemoteError` として返します。

pub mod response;
pub mod signing;
pub mod token_store;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use self::response::{
    AuthResponse, FrobResponse, ListsResponse, TaskChangeResponse, TasksResponse,
    TimelineResponse,
};
use self::token_store::FileTokenStore;
use crate::config::{Credentials, SkillConfig};
use crate::domain::{CreatedTask, ListRecord, RemoteError, TaskSummary, TokenState};
use crate::ports::RemoteTaskService;

pub use self::token_store::TokenStoreError;

/// ハンドシェイクで要求する権限。取り消しに delete が必要
const PERMS: &str = "delete";

/// 読み上げるのは未完了のタスクだけ
const INCOMPLETE_FILTER: &str = "status:incomplete";

#[derive(Debug, Default)]
struct RtmSession {
    token: Option<String>,
    frob: Option<String>,
    timeline: Option<String>,
}

pub struct RtmClient {
    http: Client,
    endpoint: String,
    auth_endpoint: String,
    credentials: Option<Credentials>,
    token_store: Option<FileTokenStore>,
    session: Mutex<RtmSession>,
}

impl RtmClient {
    /// HTTP クライアントを作り、保存済みのトークンがあれば復元する
    pub fn new(config: &SkillConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let token_store = config.token_path.clone().map(FileTokenStore::new);
        let token = match &token_store {
            Some(store) => store.load().unwrap_or_else(|err| {
                warn!(error = %err, "ignoring unreadable token file");
                None
            }),
            None => None,
        };

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            auth_endpoint: config.auth_endpoint.clone(),
            credentials: config.credentials(),
            token_store,
            session: Mutex::new(RtmSession {
                token,
                ..RtmSession::default()
            }),
        })
    }

    fn credentials(&self) -> Result<&Credentials, RemoteError> {
        self.credentials
            .as_ref()
            .ok_or_else(|| RemoteError::new("100", "Invalid API Key"))
    }

    async fn token(&self) -> Result<String, RemoteError> {
        self.session
            .lock()
            .await
            .token
            .clone()
            .ok_or_else(|| RemoteError::new("98", "Login failed / Invalid auth token"))
    }

    async fn timeline(&self) -> Result<String, RemoteError> {
        self.session
            .lock()
            .await
            .timeline
            .clone()
            .ok_or_else(|| RemoteError::new("300", "Timeline invalid or not provided."))
    }

    /// `params` を付けた `method` の署名付き GET
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        let credentials = self.credentials()?;

        let mut query: BTreeMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        query.insert("method".to_string(), method.to_string());
        query.insert("api_key".to_string(), credentials.api_key.clone());
        query.insert("format".to_string(), "json".to_string());
        let query = signing::signed(&credentials.secret, query);

        debug!(method = method, "remote call");
        let response = self
            .http
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| RemoteError::new("http", e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::new("http", e.to_string()))?;
        if !status.is_success() {
            return Err(RemoteError::new(status.as_u16().to_string(), body));
        }

        response::parse(&body)
    }

    async fn authed_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        let token = self.token().await?;
        let mut with_token = params.to_vec();
        with_token.push(("auth_token", token.as_str()));
        self.call(method, &with_token).await
    }

    /// `frob` のアクセスを許可するためにユーザーが開くリンク
    pub fn authorization_url(&self, frob: &str) -> Result<String, RemoteError> {
        let credentials = self.credentials()?;
        let mut params = BTreeMap::new();
        params.insert("api_key".to_string(), credentials.api_key.clone());
        params.insert("perms".to_string(), PERMS.to_string());
        params.insert("frob".to_string(), frob.to_string());
        let params = signing::signed(&credentials.secret, params);

        let mut url = Url::parse(&self.auth_endpoint)
            .map_err(|e| RemoteError::new("config", format!("invalid auth endpoint: {e}")))?;
        url.query_pairs_mut().extend_pairs(params.iter());
        Ok(url.to_string())
    }
}

#[async_trait]
impl RemoteTaskService for RtmClient {
    async fn fetch_lists(&self) -> Result<Vec<ListRecord>, RemoteError> {
        let lists: ListsResponse = self.authed_call("rtm.lists.getList", &[]).await?;
        Ok(lists.into_records())
    }

    async fn create_task(
        &self,
        task_name: &str,
        list_id: &str,
    ) -> Result<CreatedTask, RemoteError> {
        let timeline = self.timeline().await?;
        let added: TaskChangeResponse = self
            .authed_call(
                "rtm.tasks.add",
                &[
                    ("timeline", timeline.as_str()),
                    ("list_id", list_id),
                    ("name", task_name),
                ],
            )
            .await?;
        added.created()
    }

    async fn delete_task(
        &self,
        task_id: &str,
        task_series_id: &str,
        list_id: &str,
    ) -> Result<String, RemoteError> {
        let timeline = self.timeline().await?;
        let deleted: TaskChangeResponse = self
            .authed_call(
                "rtm.tasks.delete",
                &[
                    ("timeline", timeline.as_str()),
                    ("list_id", list_id),
                    ("taskseries_id", task_series_id),
                    ("task_id", task_id),
                ],
            )
            .await?;
        Ok(deleted.transaction.id)
    }

    async fn list_incomplete_tasks(
        &self,
        list_id: &str,
    ) -> Result<Vec<TaskSummary>, RemoteError> {
        let tasks: TasksResponse = self
            .authed_call(
                "rtm.tasks.getList",
                &[("list_id", list_id), ("filter", INCOMPLETE_FILTER)],
            )
            .await?;
        Ok(tasks.into_summaries())
    }

    async fn sync_timeline(&self) -> Result<(), RemoteError> {
        let created: TimelineResponse = self.authed_call("rtm.timelines.create", &[]).await?;
        self.session.lock().await.timeline = Some(created.timeline);
        Ok(())
    }

    async fn auth_token(&self) -> TokenState {
        let session = self.session.lock().await;
        TokenState {
            has_token: session.token.is_some(),
            handshake_pending: session.frob.is_some(),
        }
    }

    async fn verify_token_validity(&self) -> Result<(), RemoteError> {
        let _: AuthResponse = self.authed_call("rtm.auth.checkToken", &[]).await?;
        Ok(())
    }

    async fn request_authorization_handshake(&self) -> Result<String, RemoteError> {
        let issued: FrobResponse = self.call("rtm.auth.getFrob", &[]).await?;
        let url = self.authorization_url(&issued.frob)?;
        self.session.lock().await.frob = Some(issued.frob);
        Ok(url)
    }

    async fn exchange_handshake_for_token(&self) -> Result<(), RemoteError> {
        let frob = self
            .session
            .lock()
            .await
            .frob
            .clone()
            .ok_or_else(|| RemoteError::new("101", "Invalid frob - did you authenticate?"))?;

        let granted: AuthResponse = self
            .call("rtm.auth.getToken", &[("frob", frob.as_str())])
            .await?;
        debug!(perms = ?granted.auth.perms, "token granted");

        if let Some(store) = &self.token_store {
            if let Err(err) = store.save(&granted.auth.token) {
                warn!(error = %err, path = %store.path().display(), "could not persist token");
            }
        }

        let mut session = self.session.lock().await;
        session.token = Some(granted.auth.token);
        session.frob = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(config: SkillConfig) -> RtmClient {
        RtmClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn authorization_url_is_signed() {
        let client = client(SkillConfig::with_credentials("key", "secret"));

        let url = Url::parse(&client.authorization_url("frob1").unwrap()).unwrap();
        let pairs: BTreeMap<String, String> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.host_str(), Some("www.rememberthemilk.com"));
        assert_eq!(pairs.get("perms").map(String::as_str), Some("delete"));
        assert_eq!(pairs.get("frob").map(String::as_str), Some("frob1"));

        let mut unsigned = pairs.clone();
        let sig = unsigned.remove("api_sig").unwrap();
        assert_eq!(sig, signing::sign("secret", &unsigned));
    }

    #[tokio::test]
    async fn saved_token_is_restored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        FileTokenStore::new(&path).save("tok").unwrap();

        let mut config = SkillConfig::with_credentials("key", "secret");
        config.token_path = Some(path);
        let client = client(config);

        assert_eq!(
            client.auth_token().await,
            TokenState {
                has_token: true,
                handshake_pending: false,
            }
        );
    }

    #[tokio::test]
    async fn calls_fail_locally_without_prerequisites() {
        let client = client(SkillConfig::with_credentials("key", "secret"));

        assert_eq!(client.fetch_lists().await.unwrap_err().code, "98");
        assert_eq!(client.create_task("milk", "1").await.unwrap_err().code, "300");
        assert_eq!(client.exchange_handshake_for_token().await.unwrap_err().code, "101");
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_sending() {
        let client = client(SkillConfig::default());
        assert_eq!(client.request_authorization_handshake().await.unwrap_err().code, "100");
    }
}
