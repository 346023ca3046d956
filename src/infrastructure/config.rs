// 環境変数ベースの設定
//
// 各Lambda関数が必要とする設定を起動時に一度だけ読み込み、検証する。
// 必須変数の欠落は設定エラーであり、クラッシュではなくエラーレスポンスに
// つながる（エントリポイント側で処理）。

use thiserror::Error;

/// 設定エラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// 必須環境変数を読み込む
fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// 任意環境変数を読み込む（未設定・空文字はNone）
fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// 認証Lambda用設定
///
/// 環境変数:
/// - USER_POOL_ID: ユーザープールID
/// - USER_POOL_CLIENT_ID: アプリクライアントID
/// - USER_POOL_CLIENT_SECRET: アプリクライアントシークレット（任意）
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// ユーザープールID
    pub user_pool_id: String,
    /// アプリクライアントID
    pub client_id: String,
    /// アプリクライアントシークレット（SECRET_HASH計算に使用）
    pub client_secret: Option<String>,
}

impl AuthConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            user_pool_id: require_env("USER_POOL_ID")?,
            client_id: require_env("USER_POOL_CLIENT_ID")?,
            client_secret: optional_env("USER_POOL_CLIENT_SECRET"),
        })
    }

    /// 明示的な値で設定を作成（テスト用）
    pub fn new(
        user_pool_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            user_pool_id: user_pool_id.into(),
            client_id: client_id.into(),
            client_secret,
        }
    }
}

/// 注文Lambda用設定
///
/// 環境変数:
/// - ORDERS_TABLE: 注文テーブル名
/// - QUEUE_URL: 非同期処理キューURL
/// - TOPIC_ARN: 通知トピックARN
#[derive(Debug, Clone)]
pub struct OrdersConfig {
    /// 注文テーブル名
    pub orders_table: String,
    /// 非同期処理キューURL
    pub queue_url: String,
    /// 通知トピックARN
    pub topic_arn: String,
}

impl OrdersConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            orders_table: require_env("ORDERS_TABLE")?,
            queue_url: require_env("QUEUE_URL")?,
            topic_arn: require_env("TOPIC_ARN")?,
        })
    }

    /// 明示的な値で設定を作成（テスト用）
    pub fn new(
        orders_table: impl Into<String>,
        queue_url: impl Into<String>,
        topic_arn: impl Into<String>,
    ) -> Self {
        Self {
            orders_table: orders_table.into(),
            queue_url: queue_url.into(),
            topic_arn: topic_arn.into(),
        }
    }
}

/// 商品Lambda用設定
///
/// 環境変数:
/// - PRODUCTS_TABLE: 商品テーブル名
/// - ES_ENDPOINT: 検索エンドポイント（任意。検索パスのみ必要）
/// - AWS_REGION: リージョン（SigV4署名用、デフォルトus-east-1）
#[derive(Debug, Clone)]
pub struct ProductsConfig {
    /// 商品テーブル名
    pub products_table: String,
    /// 検索エンドポイント
    pub search_endpoint: Option<String>,
    /// リージョン
    pub region: String,
}

impl ProductsConfig {
    /// 環境変数から設定を読み込む
    ///
    /// ES_ENDPOINTは任意。未設定のまま検索が要求された場合は
    /// 検索クライアント側が設定エラーを返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            products_table: require_env("PRODUCTS_TABLE")?,
            search_endpoint: optional_env("ES_ENDPOINT"),
            region: optional_env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        })
    }

    /// 明示的な値で設定を作成（テスト用）
    pub fn new(
        products_table: impl Into<String>,
        search_endpoint: Option<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            products_table: products_table.into(),
            search_endpoint,
            region: region.into(),
        }
    }
}
