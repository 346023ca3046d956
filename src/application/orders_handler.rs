// 注文ハンドラー
//
// POST /orders（作成）と GET /orders（一覧）/ GET /orders/{orderId}（1件取得）
// を処理する。作成時はストア書き込み → キュー送信 → 通知発行を厳密に
// この順で逐次実行する。途中で失敗した場合、完了済みの副作用は
// ロールバックせず、呼び出し元へエラーを返す（暗黙の成功は返さない）。

use std::sync::Arc;

use lambda_http::http::Method;
use lambda_http::request::RequestContext;
use lambda_http::{Body, Request, RequestExt, Response};
use serde_json::Value;
use tracing::{info, warn};

use crate::application::response;
use crate::application::OrderService;
use crate::domain::CreateOrderRequest;
use crate::infrastructure::{NotificationOps, OrdersConfig, QueueOps, StoreError};

/// リクエストコンテキストから認証済みユーザーIDを取り出す
///
/// ゲートウェイのオーソライザーが付与したクレームの`sub`を参照する。
fn extract_user_id(event: &Request) -> Option<String> {
    match event.request_context_ref()? {
        RequestContext::ApiGatewayV1(ctx) => ctx
            .authorizer
            .fields
            .get("claims")
            .and_then(|claims| claims.get("sub"))
            .and_then(Value::as_str)
            .map(str::to_string),
        RequestContext::ApiGatewayV2(ctx) => ctx
            .authorizer
            .as_ref()
            .and_then(|authorizer| authorizer.jwt.as_ref())
            .and_then(|jwt| jwt.claims.get("sub"))
            .cloned(),
        _ => None,
    }
}

/// ストアエラーをHTTPレスポンスに変換する
///
/// 設定不備・リソース不在は詳細を伏せた汎用メッセージに置き換える。
fn store_error_response(err: StoreError) -> Response<Body> {
    match err {
        StoreError::MissingTable => response::error("Database configuration error", 500),
        StoreError::ResourceNotFound(_) => response::error("Database resource not found", 500),
        other => response::error(&other.to_string(), 500),
    }
}

/// 注文ハンドラー
#[derive(Clone)]
pub struct OrdersHandler {
    /// 注文サービス
    orders: OrderService,
    /// 非同期処理キュー
    queue: Arc<dyn QueueOps>,
    /// 通知クライアント
    notifier: Arc<dyn NotificationOps>,
    /// 注文Lambda設定
    config: OrdersConfig,
}

impl OrdersHandler {
    /// 新しいOrdersHandlerを作成
    pub fn new(
        orders: OrderService,
        queue: Arc<dyn QueueOps>,
        notifier: Arc<dyn NotificationOps>,
        config: OrdersConfig,
    ) -> Self {
        Self {
            orders,
            queue,
            notifier,
            config,
        }
    }

    /// 注文リクエストを処理する
    pub async fn handle(&self, event: Request) -> Response<Body> {
        let Some(user_id) = extract_user_id(&event) else {
            warn!("リクエストコンテキストにユーザーIDがない");
            return response::error("Missing user identity", 500);
        };

        let method = event.method().clone();
        if method == Method::POST {
            self.create_order(&user_id, &event).await
        } else if method == Method::GET {
            let path_parameters = event.path_parameters();
            match path_parameters.first("orderId") {
                Some(order_id) => self.get_order(order_id).await,
                None => self.list_orders(&user_id).await,
            }
        } else {
            response::error("Method not allowed", 405)
        }
    }

    /// 注文を作成し、後続処理のキュー送信と通知発行を行う
    async fn create_order(&self, user_id: &str, event: &Request) -> Response<Body> {
        let body = match event.body() {
            Body::Text(text) => text.as_str(),
            Body::Binary(bytes) => std::str::from_utf8(bytes).unwrap_or_default(),
            // Body::Emptyおよび将来追加されるバリアントは空ボディとして扱う
            _ => "",
        };

        let request = match CreateOrderRequest::parse(body) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = e.to_string(), "注文リクエストの解析に失敗");
                return response::error(&e.to_string(), 500);
            }
        };

        // 1. ストアへ書き込み
        let order = match self
            .orders
            .create_order(user_id, request.products, request.total)
            .await
        {
            Ok(order) => order,
            Err(e) => return store_error_response(e),
        };

        // 2. 非同期処理キューへ送信
        let order_json = match serde_json::to_value(&order) {
            Ok(value) => value,
            Err(e) => return response::error(&e.to_string(), 500),
        };
        if let Err(e) = self
            .queue
            .send_message(&self.config.queue_url, &order_json)
            .await
        {
            warn!(
                order_id = order.order_id.as_str(),
                error = e.to_string(),
                "キュー送信に失敗"
            );
            return response::error(&e.to_string(), 500);
        }

        // 3. 通知発行
        if let Err(e) = self
            .notifier
            .publish_order(&self.config.topic_arn, &order)
            .await
        {
            warn!(
                order_id = order.order_id.as_str(),
                error = e.to_string(),
                "通知発行に失敗"
            );
            return response::error(&e.to_string(), 500);
        }

        info!(order_id = order.order_id.as_str(), "注文処理完了");

        response::success(&order)
    }

    /// 注文を1件取得する（存在しない場合はnullを返す）
    async fn get_order(&self, order_id: &str) -> Response<Body> {
        match self.orders.get_order(order_id).await {
            Ok(item) => response::success(&item.unwrap_or(Value::Null)),
            Err(e) => store_error_response(e),
        }
    }

    /// 認証済みユーザーの注文一覧を取得する
    async fn list_orders(&self, user_id: &str) -> Response<Body> {
        match self.orders.get_user_orders(user_id).await {
            Ok(orders) => response::success(&orders),
            Err(e) => store_error_response(e),
        }
    }
}
