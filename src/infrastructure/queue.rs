// 非同期処理キュークライアント
//
// 注文の後続処理（在庫引当・決済など、この層の外）のための
// メッセージ送信を提供する。この層からはファイアアンドフォーゲットであり、
// 送達保証はキューサービス側に委ねる。リトライは行わない。

use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// キュー操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueueError {
    /// メッセージ送信に失敗
    #[error("Queue send error: {0}")]
    SendError(String),

    /// メッセージボディのシリアライズに失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// キュー操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait QueueOps: Send + Sync {
    /// JSONドキュメントをメッセージボディとして送信する
    async fn send_message(&self, queue_url: &str, body: &Value) -> Result<(), QueueError>;
}

/// QueueOpsのSQS実装
#[derive(Debug, Clone)]
pub struct SqsQueue {
    /// SQSクライアント
    client: SqsClient,
}

impl SqsQueue {
    /// 新しいSqsQueueを作成
    pub fn new(client: SqsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueueOps for SqsQueue {
    async fn send_message(&self, queue_url: &str, body: &Value) -> Result<(), QueueError> {
        let message_body = serde_json::to_string(body)
            .map_err(|e| QueueError::SerializationError(e.to_string()))?;

        debug!(queue_url = queue_url, "キューにメッセージ送信");

        self.client
            .send_message()
            .queue_url(queue_url)
            .message_body(message_body)
            .send()
            .await
            .map_err(|e| QueueError::SendError(e.into_service_error().to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_queue_error_display() {
        assert_eq!(
            QueueError::SendError("queue does not exist".to_string()).to_string(),
            "Queue send error: queue does not exist"
        );
    }

    /// ユニットテスト用のQueueOpsモック
    ///
    /// 送信されたメッセージを(queue_url, body)として記録する。
    #[derive(Debug, Clone, Default)]
    pub(crate) struct MockQueue {
        /// 送信記録
        sent: Arc<Mutex<Vec<(String, Value)>>>,
        /// 次の操作で返すエラー
        next_error: Arc<Mutex<Option<QueueError>>>,
    }

    impl MockQueue {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn set_next_error(&self, error: QueueError) {
            *self.next_error.lock().unwrap() = Some(error);
        }

        pub(crate) fn sent_messages(&self) -> Vec<(String, Value)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueueOps for MockQueue {
        async fn send_message(&self, queue_url: &str, body: &Value) -> Result<(), QueueError> {
            if let Some(error) = self.next_error.lock().unwrap().take() {
                return Err(error);
            }
            self.sent
                .lock()
                .unwrap()
                .push((queue_url.to_string(), body.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mock_queue_records_messages() {
        let queue = MockQueue::new();
        queue
            .send_message("https://sqs.example/orders", &json!({"orderId": "ORD-1"}))
            .await
            .unwrap();

        let sent = queue.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "https://sqs.example/orders");
        assert_eq!(sent[0].1["orderId"], "ORD-1");
    }

    #[tokio::test]
    async fn test_mock_queue_error_injection() {
        let queue = MockQueue::new();
        queue.set_next_error(QueueError::SendError("unavailable".to_string()));

        let result = queue.send_message("https://sqs.example/orders", &json!({})).await;
        assert!(result.is_err());
        assert!(queue.sent_messages().is_empty());
    }
}
