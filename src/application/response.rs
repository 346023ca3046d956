// HTTPレスポンスフォーマッター
//
// 全ハンドラーで共通のレスポンス形式を提供する。
// 成功・失敗を問わずCORS開放ヘッダーを付与した整形済みの
// レスポンスを構築する。構築以外の副作用は持たず、失敗もしない。

use lambda_http::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use lambda_http::{Body, Response};
use serde::Serialize;
use serde_json::json;

/// CORSヘッダーを生成
///
/// - Content-Type: application/json
/// - Access-Control-Allow-Origin: *
/// - Access-Control-Allow-Headers: Content-Type, Authorization
/// - Access-Control-Allow-Methods: GET, POST, OPTIONS
fn build_cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );

    headers
}

/// ボディとステータスからレスポンスを構築する
fn build(status: u16, body: String) -> Response<Body> {
    let mut response = Response::builder()
        .status(status)
        .body(Body::Text(body))
        .expect("レスポンスの構築に失敗");

    *response.headers_mut() = build_cors_headers();

    response
}

/// 成功レスポンス（200）を構築する
///
/// シリアライズに失敗した場合は500エラーレスポンスに切り替える
/// （このフォーマッター自体は決してパニックしない）。
pub fn success<T: Serialize>(data: &T) -> Response<Body> {
    match serde_json::to_string(data) {
        Ok(body) => build(200, body),
        Err(e) => error(&format!("Serialization error: {e}"), 500),
    }
}

/// エラーレスポンスを構築する
///
/// ボディは`{"error": message}`形式に固定する。
pub fn error(message: &str, status: u16) -> Response<Body> {
    let body = json!({ "error": message }).to_string();
    build(status, body)
}
