// 商品サービス
//
// 商品カタログの参照を提供する。この層からカタログは読み取り専用。

use std::sync::Arc;

use serde_json::{json, Value};

use crate::infrastructure::{QueryOptions, StoreClient, StoreError};

/// 商品テーブルのカテゴリ別セカンダリインデックス名
const CATEGORY_INDEX: &str = "CategoryIndex";

/// 商品サービス
#[derive(Clone)]
pub struct ProductService {
    /// ドキュメントストア
    store: Arc<dyn StoreClient>,
    /// 商品テーブル名
    table: String,
}

impl ProductService {
    /// 新しいProductServiceを作成
    pub fn new(store: Arc<dyn StoreClient>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// カテゴリに一致する商品をセカンダリインデックスで取得する
    pub async fn get_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Value>, StoreError> {
        self.store
            .query_items(
                &self.table,
                QueryOptions {
                    index_name: CATEGORY_INDEX.to_string(),
                    key_condition: "category = :category".to_string(),
                    values: vec![(":category".to_string(), json!(category))],
                },
            )
            .await
    }

    /// 全商品を取得する
    pub async fn get_all_products(&self) -> Result<Vec<Value>, StoreError> {
        self.store.scan_items(&self.table, None).await
    }
}
