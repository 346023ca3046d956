/// 認証HTTP Lambdaエントリポイント
///
/// POST /auth のサインアップ/ログインリクエストを処理する。
use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use storefront::application::{response, AuthHandler};
use storefront::infrastructure::{init_logging, AuthConfig, CognitoIdentityClient};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("認証Lambda関数を初期化");

    // 環境変数から設定を読み込む。設定不備でもクラッシュせず、
    // 汎用の設定エラーを返すサービスとして起動する。
    let config = match AuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = e.to_string(), "設定の読み込みに失敗");
            return run(service_fn(config_error_handler)).await;
        }
    };

    // AWSクライアントはプロセスごとに一度だけ構築し、全呼び出しで共有する
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let cognito = aws_sdk_cognitoidentityprovider::Client::new(&aws_config);
    let handler = AuthHandler::new(Arc::new(CognitoIdentityClient::new(cognito, config)));

    run(service_fn(move |event: Request| {
        let handler = handler.clone();
        async move { Ok::<Response<Body>, Error>(handler.handle(event).await) }
    }))
    .await
}

/// 設定不備時のフォールバックハンドラー
///
/// 欠落した環境変数名は呼び出し元に露出しない。
async fn config_error_handler(_event: Request) -> Result<Response<Body>, Error> {
    Ok(response::error("Service configuration error", 500))
}
