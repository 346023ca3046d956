// 注文ドメインモデル
//
// 注文は作成時に一意なIDとタイムスタンプを付与され、
// 以降このレイヤーでは変更されない（ドキュメントストアが所有する）。

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 注文ID接頭辞
pub const ORDER_ID_PREFIX: &str = "ORD-";

/// 注文ステータス
///
/// 作成直後は常に`Pending`。以降の遷移は下流の処理系が担う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// 受付済み（未処理）
    Pending,
    /// 処理中
    Processing,
    /// 完了
    Completed,
    /// キャンセル済み
    Cancelled,
}

/// 注文
///
/// フィールド名はAPIのJSON表現（camelCase）に合わせてシリアライズされる。
/// 商品明細（`products`）は上流で検証される前提の自由形式JSONのまま保持する。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// 注文ID（`ORD-` + UUID v4）
    pub order_id: String,
    /// 注文したユーザーのID
    pub user_id: String,
    /// 注文日時（ISO-8601 / RFC3339、UTC）
    pub order_date: String,
    /// 商品明細のリスト
    pub products: Vec<Value>,
    /// 合計金額
    pub total: f64,
    /// ステータス
    pub status: OrderStatus,
}

impl Order {
    /// 新しい注文を構築する
    ///
    /// 一意な注文IDを生成し、現在時刻をISO-8601形式で記録する。
    /// ステータスは常に`Pending`で開始する。
    pub fn new(user_id: impl Into<String>, products: Vec<Value>, total: f64) -> Self {
        Self {
            order_id: format!("{}{}", ORDER_ID_PREFIX, Uuid::new_v4()),
            user_id: user_id.into(),
            order_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            products,
            total,
            status: OrderStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_order_has_prefixed_id() {
        let order = Order::new("u1", vec![], 0.0);
        assert!(order.order_id.starts_with(ORDER_ID_PREFIX));
        // `ORD-` + UUID（36文字）
        assert_eq!(order.order_id.len(), ORDER_ID_PREFIX.len() + 36);
    }

    #[test]
    fn test_new_order_ids_are_unique() {
        let first = Order::new("u1", vec![], 0.0);
        let second = Order::new("u1", vec![], 0.0);
        assert_ne!(first.order_id, second.order_id);
    }

    #[test]
    fn test_new_order_date_is_valid_iso8601() {
        let order = Order::new("u1", vec![], 0.0);
        let parsed = chrono::DateTime::parse_from_rfc3339(&order.order_date);
        assert!(parsed.is_ok(), "orderDate should parse as RFC3339: {}", order.order_date);
    }

    #[test]
    fn test_new_order_status_is_pending() {
        let order = Order::new("u1", vec![], 0.0);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_order_serializes_camel_case() {
        let order = Order::new("u1", vec![json!({"sku": "A", "qty": 2})], 19.98);
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(value["userId"], "u1");
        assert_eq!(value["total"], 19.98);
        assert_eq!(value["status"], "pending");
        assert_eq!(value["products"][0]["sku"], "A");
        assert_eq!(value["products"][0]["qty"], 2);
        assert!(value["orderId"].as_str().unwrap().starts_with("ORD-"));
        assert!(value["orderDate"].is_string());
    }

    #[test]
    fn test_order_round_trips_through_json() {
        let order = Order::new("u1", vec![json!({"sku": "B", "qty": 1})], 5.0);
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(back.order_id, order.order_id);
        assert_eq!(back.user_id, "u1");
        assert_eq!(back.status, OrderStatus::Pending);
    }

    #[test]
    fn test_order_status_serialization_values() {
        assert_eq!(serde_json::to_value(OrderStatus::Pending).unwrap(), "pending");
        assert_eq!(serde_json::to_value(OrderStatus::Processing).unwrap(), "processing");
        assert_eq!(serde_json::to_value(OrderStatus::Completed).unwrap(), "completed");
        assert_eq!(serde_json::to_value(OrderStatus::Cancelled).unwrap(), "cancelled");
    }
}
