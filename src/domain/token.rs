// 認証トークンセット
//
// ログイン成功時にIDプロバイダーから返される3種のトークン。
// 呼び出し元へそのまま返却し、サーバー側では保持しない。

use serde::{Deserialize, Serialize};

/// 認証トークンセット
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    /// アクセストークン
    pub access_token: String,
    /// IDトークン
    pub id_token: String,
    /// リフレッシュトークン
    pub refresh_token: String,
}
