// 通知クライアント
//
// 新規注文の通知をトピックに発行する。1回の発行で
// default/email/sms の3表現を含む構造化メッセージを送り、
// 購読プロトコルごとの表現選択はプロバイダー側のフィルタリングに委ねる。
// リトライは行わず、送信失敗はそのまま呼び出し元へ伝播する。

use async_trait::async_trait;
use aws_sdk_sns::Client as SnsClient;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::domain::Order;

/// 通知操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NotificationError {
    /// メッセージ発行に失敗
    #[error("Notification publish error: {0}")]
    PublishError(String),

    /// メッセージのシリアライズに失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 通知操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait NotificationOps: Send + Sync {
    /// 新規注文の通知をトピックに発行する
    async fn publish_order(&self, topic_arn: &str, order: &Order) -> Result<(), NotificationError>;
}

/// プロトコル別の3表現を持つ通知メッセージを構築する
///
/// メッセージ構造はプロバイダーのjson MessageStructure仕様に従う。
fn build_order_message(order: &Order) -> serde_json::Value {
    json!({
        "default": format!("New order received: {}", order.order_id),
        "email": format!("New Order #{}\nTotal: ${}", order.order_id, order.total),
        "sms": format!("New order #{} for ${}", order.order_id, order.total),
    })
}

/// NotificationOpsのSNS実装
#[derive(Debug, Clone)]
pub struct SnsNotifier {
    /// SNSクライアント
    client: SnsClient,
}

impl SnsNotifier {
    /// 新しいSnsNotifierを作成
    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationOps for SnsNotifier {
    async fn publish_order(&self, topic_arn: &str, order: &Order) -> Result<(), NotificationError> {
        let message = serde_json::to_string(&build_order_message(order))
            .map_err(|e| NotificationError::SerializationError(e.to_string()))?;

        debug!(
            topic_arn = topic_arn,
            order_id = order.order_id.as_str(),
            "注文通知を発行"
        );

        self.client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .message_structure("json")
            .send()
            .await
            .map_err(|e| NotificationError::PublishError(e.into_service_error().to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_build_order_message_three_renderings() {
        let order = Order::new("u1".to_string(), vec![json!({"sku": "A"})], 19.98);
        let message = build_order_message(&order);

        assert_eq!(
            message["default"],
            format!("New order received: {}", order.order_id)
        );
        assert_eq!(
            message["email"],
            format!("New Order #{}\nTotal: ${}", order.order_id, order.total)
        );
        assert_eq!(
            message["sms"],
            format!("New order #{} for ${}", order.order_id, order.total)
        );
    }

    #[test]
    fn test_notification_error_display() {
        assert_eq!(
            NotificationError::PublishError("topic not found".to_string()).to_string(),
            "Notification publish error: topic not found"
        );
    }

    /// ユニットテスト用のNotificationOpsモック
    #[derive(Debug, Clone, Default)]
    pub(crate) struct MockNotifier {
        /// (topic_arn, order_id)の発行記録
        published: Arc<Mutex<Vec<(String, String)>>>,
        /// 次の操作で返すエラー
        next_error: Arc<Mutex<Option<NotificationError>>>,
    }

    impl MockNotifier {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn set_next_error(&self, error: NotificationError) {
            *self.next_error.lock().unwrap() = Some(error);
        }

        pub(crate) fn published_orders(&self) -> Vec<(String, String)> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationOps for MockNotifier {
        async fn publish_order(
            &self,
            topic_arn: &str,
            order: &Order,
        ) -> Result<(), NotificationError> {
            if let Some(error) = self.next_error.lock().unwrap().take() {
                return Err(error);
            }
            self.published
                .lock()
                .unwrap()
                .push((topic_arn.to_string(), order.order_id.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mock_notifier_records_publishes() {
        let notifier = MockNotifier::new();
        let order = Order::new("u1".to_string(), Vec::<Value>::new(), 5.0);

        notifier
            .publish_order("arn:aws:sns:us-east-1:123456789012:orders", &order)
            .await
            .unwrap();

        let published = notifier.published_orders();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].1, order.order_id);
    }
}
