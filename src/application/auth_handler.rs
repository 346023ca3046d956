// 認証ハンドラー
//
// POST /auth のリクエストを処理する。ボディの`action`フィールドで
// サインアップ/ログインに分岐し、アイデンティティクライアントへ委譲する。
// 失敗は常に整形済みのエラーレスポンスに変換する（ハンドラーはErrを返さない）。

use std::sync::Arc;

use lambda_http::{Body, Request, Response};
use serde_json::json;
use tracing::{info, warn};

use crate::application::response;
use crate::domain::{AuthRequest, RequestParseError};
use crate::infrastructure::IdentityOps;

/// 認証ハンドラー
#[derive(Clone)]
pub struct AuthHandler {
    /// アイデンティティクライアント
    identity: Arc<dyn IdentityOps>,
}

impl AuthHandler {
    /// 新しいAuthHandlerを作成
    pub fn new(identity: Arc<dyn IdentityOps>) -> Self {
        Self { identity }
    }

    /// 認証リクエストを処理する
    pub async fn handle(&self, event: Request) -> Response<Body> {
        let body = match event.body() {
            Body::Text(text) => text.as_str(),
            Body::Binary(bytes) => std::str::from_utf8(bytes).unwrap_or_default(),
            // Body::Emptyおよび将来追加されるバリアントは空ボディとして扱う
            _ => "",
        };

        let request = match AuthRequest::parse(body) {
            Ok(request) => request,
            Err(RequestParseError::InvalidAction) => {
                warn!("未知のactionが指定された");
                return response::error("Invalid action", 400);
            }
            Err(e) => {
                warn!(error = e.to_string(), "リクエストボディの解析に失敗");
                return response::error(&e.to_string(), 500);
            }
        };

        match request {
            AuthRequest::Signup {
                username,
                password,
                email,
            } => match self.identity.sign_up(&username, &password, &email).await {
                Ok(()) => {
                    info!(username = username.as_str(), "サインアップ成功");
                    response::success(&json!({ "message": "User created successfully" }))
                }
                Err(e) => {
                    warn!(username = username.as_str(), error = e.to_string(), "サインアップ失敗");
                    response::error(&e.to_string(), 500)
                }
            },
            AuthRequest::Login { username, password } => {
                match self.identity.log_in(&username, &password).await {
                    Ok(tokens) => response::success(&tokens),
                    Err(e) => {
                        warn!(username = username.as_str(), error = e.to_string(), "ログイン失敗");
                        response::error(&e.to_string(), 500)
                    }
                }
            }
        }
    }
}
