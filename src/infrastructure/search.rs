// 検索クライアント
//
// 検索エンドポイントに対してキーワードクエリをHTTPで発行する。
// 実行環境に資格情報がある場合はリクエストにSigV4署名を付与する。
// タイムアウトは5秒固定で、タイムアウトはその他の失敗と区別できる
// エラー種別として返す（遅い検索と壊れた検索を呼び出し側で区別するため）。

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::infrastructure::config::ProductsConfig;
use crate::infrastructure::sigv4::{aws_uri_encode, sign_request, SigningParams};

/// 検索リクエストのタイムアウト
const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);

/// 検索インデックスのクエリパス
const SEARCH_PATH: &str = "/products/_search";

/// 検索操作のエラー型
#[derive(Debug, Error)]
pub enum SearchError {
    /// 検索エンドポイントが未設定
    #[error("Search endpoint is not configured")]
    MissingEndpoint,

    /// 検索エンドポイントのURLが不正
    #[error("Invalid search endpoint: {0}")]
    InvalidEndpoint(String),

    /// リクエストがタイムアウトした
    #[error("Search request timed out")]
    Timeout,

    /// トランスポートレベルの失敗
    #[error("Search request failed: {0}")]
    RequestFailed(String),

    /// 検索サービスがエラーステータスを返した
    #[error("Search service returned status {status}: {message}")]
    UpstreamError { status: u16, message: String },

    /// レスポンスが期待する形式でない
    #[error("Malformed search response: {0}")]
    MalformedResponse(String),
}

impl SearchError {
    /// 設定不備に起因するエラーかどうか
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SearchError::MissingEndpoint | SearchError::InvalidEndpoint(_)
        )
    }
}

/// 検索操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait SearchOps: Send + Sync {
    /// キーワードクエリを発行し、一致したソースドキュメントを返す
    async fn search(&self, query: &str) -> Result<Vec<Value>, SearchError>;
}

/// 検索インデックスへのHTTPクライアント
#[derive(Debug, Clone)]
pub struct SearchClient {
    /// HTTPクライアント（5秒タイムアウト設定済み）
    http: reqwest::Client,
    /// 検索エンドポイント（未設定の場合は検索時にエラー）
    endpoint: Option<String>,
    /// SigV4署名に使用するリージョン
    region: String,
}

/// 実行環境から読み取った署名用資格情報
struct EnvCredentials {
    access_key: String,
    secret_key: String,
    session_token: Option<String>,
}

impl EnvCredentials {
    /// 標準の環境変数から資格情報を読み取る
    ///
    /// アクセスキーとシークレットキーが揃っていない場合はNone
    /// （署名なしの素のリクエストにフォールバックする）。
    fn from_env() -> Option<Self> {
        let access_key = std::env::var("AWS_ACCESS_KEY_ID").ok().filter(|v| !v.is_empty())?;
        let secret_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .ok()
            .filter(|v| !v.is_empty())?;
        let session_token = std::env::var("AWS_SESSION_TOKEN").ok().filter(|v| !v.is_empty());
        Some(Self {
            access_key,
            secret_key,
            session_token,
        })
    }
}

/// レスポンスボディから結果エンベロープを取り出す
///
/// `hits.hits[]._source`の配列を期待する。形が異なる場合は
/// MalformedResponseを返す。
fn parse_hits(body: &Value) -> Result<Vec<Value>, SearchError> {
    let hits = body
        .get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            SearchError::MalformedResponse("missing hits.hits array".to_string())
        })?;

    Ok(hits
        .iter()
        .filter_map(|hit| hit.get("_source"))
        .cloned()
        .collect())
}

/// エラーレスポンスのボディからメッセージを取り出す
///
/// 検索サービスのエラー形式（`error.reason`）を優先し、
/// JSONでないボディはそのまま使う。
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(reason) = value
            .get("error")
            .and_then(|e| e.get("reason"))
            .and_then(Value::as_str)
        {
            return reason.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.to_string()
    }
}

impl SearchClient {
    /// 新しいSearchClientを作成
    pub fn new(config: &ProductsConfig) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.search_endpoint.clone(),
            region: config.region.clone(),
        })
    }

    /// クエリURLを構築する
    fn build_url(&self, query: &str) -> Result<Url, SearchError> {
        let endpoint = self.endpoint.as_deref().ok_or(SearchError::MissingEndpoint)?;

        let mut url =
            Url::parse(endpoint).map_err(|e| SearchError::InvalidEndpoint(e.to_string()))?;
        if url.host_str().is_none() {
            return Err(SearchError::InvalidEndpoint(
                "endpoint has no host".to_string(),
            ));
        }
        url.set_path(SEARCH_PATH);
        // 署名対象の正規クエリ文字列と同じエンコード形式を使う
        url.set_query(Some(&format!("q={}", aws_uri_encode(query))));
        Ok(url)
    }
}

#[async_trait]
impl SearchOps for SearchClient {
    async fn search(&self, query: &str) -> Result<Vec<Value>, SearchError> {
        let url = self.build_url(query)?;

        debug!(query = query, "検索リクエスト送信");

        let mut request = self.http.get(url.clone());

        // 資格情報があればSigV4署名を付与する
        if let Some(credentials) = EnvCredentials::from_env() {
            let host = match url.port() {
                // ホストヘッダーは実際に送信される値と一致させる
                Some(port) => format!("{}:{port}", url.host_str().unwrap_or_default()),
                None => url.host_str().unwrap_or_default().to_string(),
            };
            let params = SigningParams {
                access_key: &credentials.access_key,
                secret_key: &credentials.secret_key,
                session_token: credentials.session_token.as_deref(),
                region: &self.region,
                service: "es",
            };
            let signed = sign_request(
                &params,
                "GET",
                &host,
                SEARCH_PATH,
                &[("q", query)],
                &[],
                b"",
                Utc::now(),
            );

            request = request
                .header("authorization", &signed.authorization)
                .header("x-amz-date", &signed.amz_date)
                .header("x-amz-content-sha256", &signed.content_sha256);
            if let Some(token) = &signed.security_token {
                request = request.header("x-amz-security-token", token);
            }
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else {
                SearchError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body);
            warn!(status = status.as_u16(), message = message.as_str(), "検索サービスがエラーを返した");
            return Err(SearchError::UpstreamError {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::MalformedResponse(e.to_string()))?;

        parse_hits(&body)
    }
}
