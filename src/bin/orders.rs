/// 注文HTTP Lambdaエントリポイント
///
/// POST /orders（作成）と GET /orders / GET /orders/{orderId} を処理する。
use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use storefront::application::{response, OrderService, OrdersHandler};
use storefront::infrastructure::{
    init_logging, DynamoStoreClient, OrdersConfig, SnsNotifier, SqsQueue,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("注文Lambda関数を初期化");

    // 環境変数から設定を読み込む。設定不備でもクラッシュせず、
    // 汎用の設定エラーを返すサービスとして起動する。
    let config = match OrdersConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = e.to_string(), "設定の読み込みに失敗");
            return run(service_fn(config_error_handler)).await;
        }
    };

    // AWSクライアントはプロセスごとに一度だけ構築し、全呼び出しで共有する
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = Arc::new(DynamoStoreClient::new(aws_sdk_dynamodb::Client::new(
        &aws_config,
    )));
    let queue = Arc::new(SqsQueue::new(aws_sdk_sqs::Client::new(&aws_config)));
    let notifier = Arc::new(SnsNotifier::new(aws_sdk_sns::Client::new(&aws_config)));

    let handler = OrdersHandler::new(
        OrderService::new(store, config.orders_table.clone()),
        queue,
        notifier,
        config,
    );

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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_config_error_handler_returns_generic_500() {
        let response = config_error_handler(Request::new(Body::Empty)).await.unwrap();

        assert_eq!(response.status(), 500);
        let body = match response.body() {
            Body::Text(text) => text.clone(),
            _ => panic!("予期しないBody型"),
        };
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["error"], "Service configuration error");
    }
}
