// ルート別リクエスト型
//
// 受信イベントの未型付きJSONボディを境界で型付きリクエストに変換する。
// 変換はここで一度だけ行い、以降の層は型付きの値のみを扱う。

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// リクエストボディの解析エラー
#[derive(Debug, Error)]
pub enum RequestParseError {
    /// ボディがJSONとして解析できない、または必須フィールドが欠落
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// `action`が未知または未指定
    #[error("Invalid action")]
    InvalidAction,
}

/// 認証エンドポイントのリクエスト
///
/// ボディの`action`フィールドで分岐する。
#[derive(Debug, Clone, PartialEq)]
pub enum AuthRequest {
    /// サインアップ（`action=signup`）
    Signup {
        username: String,
        password: String,
        email: String,
    },
    /// ログイン（`action=login`）
    Login { username: String, password: String },
}

#[derive(Debug, Deserialize)]
struct SignupBody {
    username: String,
    password: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

impl AuthRequest {
    /// JSONボディから認証リクエストを解析する
    ///
    /// `action`が`signup`/`login`以外の場合は`InvalidAction`、
    /// フィールド欠落やJSON不正は`InvalidBody`を返す。
    pub fn parse(body: &str) -> Result<Self, RequestParseError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| RequestParseError::InvalidBody(e.to_string()))?;

        match value.get("action").and_then(Value::as_str) {
            Some("signup") => {
                let body: SignupBody = serde_json::from_value(value)
                    .map_err(|e| RequestParseError::InvalidBody(e.to_string()))?;
                Ok(AuthRequest::Signup {
                    username: body.username,
                    password: body.password,
                    email: body.email,
                })
            }
            Some("login") => {
                let body: LoginBody = serde_json::from_value(value)
                    .map_err(|e| RequestParseError::InvalidBody(e.to_string()))?;
                Ok(AuthRequest::Login {
                    username: body.username,
                    password: body.password,
                })
            }
            _ => Err(RequestParseError::InvalidAction),
        }
    }
}

/// 注文作成リクエスト（POST /orders）
///
/// 商品明細はこの層では検証しない（上流で検証される前提）。
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    /// 商品明細のリスト（自由形式）
    pub products: Vec<Value>,
    /// 合計金額
    pub total: f64,
}

impl CreateOrderRequest {
    /// JSONボディから注文作成リクエストを解析する
    pub fn parse(body: &str) -> Result<Self, RequestParseError> {
        serde_json::from_str(body).map_err(|e| RequestParseError::InvalidBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_signup_request() {
        let body = r#"{"action":"signup","username":"alice","password":"p4ss","email":"a@example.com"}"#;
        let request = AuthRequest::parse(body).unwrap();

        assert_eq!(
            request,
            AuthRequest::Signup {
                username: "alice".to_string(),
                password: "p4ss".to_string(),
                email: "a@example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_login_request() {
        let body = r#"{"action":"login","username":"alice","password":"p4ss"}"#;
        let request = AuthRequest::parse(body).unwrap();

        assert_eq!(
            request,
            AuthRequest::Login {
                username: "alice".to_string(),
                password: "p4ss".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_unknown_action() {
        let body = r#"{"action":"register","username":"alice"}"#;
        let result = AuthRequest::parse(body);
        assert!(matches!(result, Err(RequestParseError::InvalidAction)));
    }

    #[test]
    fn test_parse_missing_action() {
        let body = r#"{"username":"alice","password":"p4ss"}"#;
        let result = AuthRequest::parse(body);
        assert!(matches!(result, Err(RequestParseError::InvalidAction)));
    }

    #[test]
    fn test_parse_signup_missing_email() {
        let body = r#"{"action":"signup","username":"alice","password":"p4ss"}"#;
        let result = AuthRequest::parse(body);
        assert!(matches!(result, Err(RequestParseError::InvalidBody(_))));
    }

    #[test]
    fn test_parse_malformed_json() {
        let result = AuthRequest::parse("not json");
        assert!(matches!(result, Err(RequestParseError::InvalidBody(_))));
    }

    #[test]
    fn test_parse_create_order_request() {
        let body = r#"{"products":[{"sku":"A","qty":2}],"total":19.98}"#;
        let request = CreateOrderRequest::parse(body).unwrap();

        assert_eq!(request.products.len(), 1);
        assert_eq!(request.products[0]["sku"], "A");
        assert_eq!(request.total, 19.98);
    }

    #[test]
    fn test_parse_create_order_missing_total() {
        let body = r#"{"products":[]}"#;
        let result = CreateOrderRequest::parse(body);
        assert!(matches!(result, Err(RequestParseError::InvalidBody(_))));
    }

    #[test]
    fn test_request_parse_error_display() {
        assert_eq!(RequestParseError::InvalidAction.to_string(), "Invalid action");
        assert!(
            RequestParseError::InvalidBody("eof".to_string())
                .to_string()
                .contains("Invalid request body")
        );
    }
}
