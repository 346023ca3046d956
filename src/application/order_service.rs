// 注文サービス
//
// 注文の作成と参照を提供する。ストア操作はStoreClient経由で行い、
// ストア層の型付きエラーはそのまま呼び出し元へ伝播する。

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use crate::domain::Order;
use crate::infrastructure::{QueryOptions, StoreClient, StoreError};

/// 注文テーブルのユーザー別セカンダリインデックス名
const USER_INDEX: &str = "UserIndex";

/// 注文サービス
#[derive(Clone)]
pub struct OrderService {
    /// ドキュメントストア
    store: Arc<dyn StoreClient>,
    /// 注文テーブル名
    table: String,
}

impl OrderService {
    /// 新しいOrderServiceを作成
    pub fn new(store: Arc<dyn StoreClient>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// 注文を作成して永続化する
    ///
    /// 注文IDの生成・タイムスタンプ・初期ステータスの付与はドメイン層で
    /// 行う。商品明細と合計金額の形式はこの層では検証しない。
    pub async fn create_order(
        &self,
        user_id: &str,
        products: Vec<Value>,
        total: f64,
    ) -> Result<Order, StoreError> {
        let order = Order::new(user_id.to_string(), products, total);

        let item = serde_json::to_value(&order)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        self.store.put_item(&self.table, &item).await?;

        info!(
            order_id = order.order_id.as_str(),
            user_id = user_id,
            total = total,
            "注文を作成"
        );

        Ok(order)
    }

    /// 注文IDで1件取得する（存在しない場合はNone）
    pub async fn get_order(&self, order_id: &str) -> Result<Option<Value>, StoreError> {
        self.store.get_item(&self.table, "orderId", order_id).await
    }

    /// ユーザーの注文一覧をセカンダリインデックスで取得する
    pub async fn get_user_orders(&self, user_id: &str) -> Result<Vec<Value>, StoreError> {
        self.store
            .query_items(
                &self.table,
                QueryOptions {
                    index_name: USER_INDEX.to_string(),
                    key_condition: "userId = :userId".to_string(),
                    values: vec![(":userId".to_string(), json!(user_id))],
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ORDER_ID_PREFIX;
    use crate::infrastructure::store::tests::MemoryStoreClient;
    use serde_json::json;

    fn service_with_store() -> (OrderService, MemoryStoreClient) {
        let store = MemoryStoreClient::new();
        let service = OrderService::new(Arc::new(store.clone()), "orders");
        (service, store)
    }

    #[tokio::test]
    async fn test_create_order_persists_item() {
        let (service, store) = service_with_store();

        let order = service
            .create_order("u1", vec![json!({"sku": "A", "qty": 2})], 19.98)
            .await
            .unwrap();

        assert!(order.order_id.starts_with(ORDER_ID_PREFIX));
        assert_eq!(store.item_count("orders"), 1);

        // 永続化された項目がワイヤ形式で取得できる
        let item = store
            .get_item("orders", "orderId", &order.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item["userId"], "u1");
        assert_eq!(item["total"], 19.98);
        assert_eq!(item["status"], "pending");
    }

    #[tokio::test]
    async fn test_create_order_store_failure_propagates() {
        let (service, store) = service_with_store();
        store.set_next_error(StoreError::WriteError("throttled".to_string()));

        let result = service.create_order("u1", vec![], 5.0).await;
        assert_eq!(
            result.unwrap_err(),
            StoreError::WriteError("throttled".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_order_found() {
        let (service, store) = service_with_store();
        store.seed("orders", vec![json!({"orderId": "ORD-1", "userId": "u1"})]);

        let item = service.get_order("ORD-1").await.unwrap();
        assert_eq!(item.unwrap()["userId"], "u1");
    }

    #[tokio::test]
    async fn test_get_order_not_found_is_none() {
        let (service, _store) = service_with_store();

        let item = service.get_order("ORD-missing").await.unwrap();
        assert!(item.is_none());
    }

    #[tokio::test]
    async fn test_get_user_orders_scoped_to_user() {
        let (service, store) = service_with_store();
        store.seed(
            "orders",
            vec![
                json!({"orderId": "ORD-1", "userId": "u1"}),
                json!({"orderId": "ORD-2", "userId": "u2"}),
                json!({"orderId": "ORD-3", "userId": "u1"}),
            ],
        );

        let orders = service.get_user_orders("u1").await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|order| order["userId"] == "u1"));
    }

    #[tokio::test]
    async fn test_unconfigured_table_fails() {
        let store = MemoryStoreClient::new();
        let service = OrderService::new(Arc::new(store), "");

        let result = service.get_order("ORD-1").await;
        assert_eq!(result.unwrap_err(), StoreError::MissingTable);
    }
}
