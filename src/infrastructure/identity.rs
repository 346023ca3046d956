// アイデンティティプロバイダークライアント
//
// Cognitoユーザープールに対するサインアップ・ログイン操作を提供する。
// サインアップは「ユーザー作成 + パスワード恒久設定」の2段階で1つの
// 論理操作を構成する。2段階目が失敗した場合はベストエフォートで
// 作成済みユーザーを削除し、中途半端な状態を残さない。

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType, MessageActionType};
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::TokenSet;
use crate::infrastructure::config::AuthConfig;

/// アイデンティティ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdentityError {
    /// ユーザー作成またはパスワード設定に失敗
    #[error("{0}")]
    SignUpFailed(String),

    /// 認証に失敗（資格情報不正・ユーザー無効を含む）
    #[error("{0}")]
    AuthenticationFailed(String),

    /// 認証成功レスポンスにトークンが含まれない
    #[error("Authentication succeeded but no tokens were returned")]
    MissingTokens,
}

/// アイデンティティ操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait IdentityOps: Send + Sync {
    /// ユーザーを作成し、パスワードを恒久パスワードとして設定する
    ///
    /// ウェルカムメッセージは抑止し、メールアドレスは検証済みとして
    /// 登録する。成功すればそのままログイン可能な状態になる。
    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<(), IdentityError>;

    /// 管理者開始のパスワード認証フローでログインする
    async fn log_in(&self, username: &str, password: &str) -> Result<TokenSet, IdentityError>;
}

/// クライアントシークレット用のキー付きハッシュを計算する
///
/// HMAC-SHA256(key=client_secret, message=username + client_id)のBase64。
/// アプリクライアントにシークレットが設定されている場合、
/// プロバイダーはこの値を認証パラメータとして要求する。
pub fn secret_hash(client_secret: &str, username: &str, client_id: &str) -> String {
    // HMACは任意長のキーを受け付けるため、ここは失敗しない
    let mut mac = Hmac::<Sha256>::new_from_slice(client_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// IdentityOpsのCognito実装
#[derive(Debug, Clone)]
pub struct CognitoIdentityClient {
    /// Cognitoクライアント
    client: CognitoClient,
    /// 認証設定
    config: AuthConfig,
}

impl CognitoIdentityClient {
    /// 新しいCognitoIdentityClientを作成
    pub fn new(client: CognitoClient, config: AuthConfig) -> Self {
        Self { client, config }
    }

    /// 作成済みユーザーをベストエフォートで削除する
    ///
    /// サインアップ2段階目の失敗時のみ呼ばれる。削除自体の失敗は
    /// ログに残すだけで、元のエラーを優先して返す。
    async fn cleanup_user(&self, username: &str) {
        let result = self
            .client
            .admin_delete_user()
            .user_pool_id(&self.config.user_pool_id)
            .username(username)
            .send()
            .await;

        if let Err(e) = result {
            warn!(
                username = username,
                error = e.into_service_error().to_string(),
                "サインアップ失敗後のユーザー削除に失敗"
            );
        }
    }
}

#[async_trait]
impl IdentityOps for CognitoIdentityClient {
    async fn sign_up(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<(), IdentityError> {
        let email_attribute = AttributeType::builder()
            .name("email")
            .value(email)
            .build()
            .map_err(|e| IdentityError::SignUpFailed(e.to_string()))?;
        let verified_attribute = AttributeType::builder()
            .name("email_verified")
            .value("true")
            .build()
            .map_err(|e| IdentityError::SignUpFailed(e.to_string()))?;

        // ユーザー作成（ウェルカムメッセージ抑止・メール検証済み）
        self.client
            .admin_create_user()
            .user_pool_id(&self.config.user_pool_id)
            .username(username)
            .temporary_password(password)
            .user_attributes(email_attribute)
            .user_attributes(verified_attribute)
            .message_action(MessageActionType::Suppress)
            .send()
            .await
            .map_err(|e| IdentityError::SignUpFailed(e.into_service_error().to_string()))?;

        // パスワードを恒久パスワードとして設定（強制リセットなしでログイン可能にする）
        let set_password = self
            .client
            .admin_set_user_password()
            .user_pool_id(&self.config.user_pool_id)
            .username(username)
            .password(password)
            .permanent(true)
            .send()
            .await;

        if let Err(e) = set_password {
            // 作成済みだが一時パスワードのままのユーザーを残さない
            self.cleanup_user(username).await;
            return Err(IdentityError::SignUpFailed(
                e.into_service_error().to_string(),
            ));
        }

        info!(username = username, "ユーザー作成完了");

        Ok(())
    }

    async fn log_in(&self, username: &str, password: &str) -> Result<TokenSet, IdentityError> {
        let mut builder = self
            .client
            .admin_initiate_auth()
            .user_pool_id(&self.config.user_pool_id)
            .client_id(&self.config.client_id)
            .auth_flow(AuthFlowType::AdminNoSrpAuth)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", password);

        // アプリクライアントにシークレットがある場合はSECRET_HASHが必須
        if let Some(secret) = &self.config.client_secret {
            builder = builder.auth_parameters(
                "SECRET_HASH",
                secret_hash(secret, username, &self.config.client_id),
            );
        }

        let result = builder
            .send()
            .await
            .map_err(|e| IdentityError::AuthenticationFailed(e.into_service_error().to_string()))?;

        let auth = result
            .authentication_result
            .ok_or(IdentityError::MissingTokens)?;

        let token_set = TokenSet {
            access_token: auth.access_token.ok_or(IdentityError::MissingTokens)?,
            id_token: auth.id_token.ok_or(IdentityError::MissingTokens)?,
            refresh_token: auth.refresh_token.ok_or(IdentityError::MissingTokens)?,
        };

        info!(username = username, "ログイン成功");

        Ok(token_set)
    }
}
