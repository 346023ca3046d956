// ドキュメントストアクライアント
//
// テーブル名でパラメータ化された汎用的なget/put/query/scan操作を提供する。
// 項目はDynamoDBのAttributeValueとserde_json::Valueの間でserde_dynamoにより
// 変換され、上位層は未加工のJSONドキュメントとして扱う。

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// ストア操作のエラー型
///
/// 下層のサービスエラーは種別を保ったまま上位へ伝播する。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// テーブル名が未設定または空
    #[error("TableName is required")]
    MissingTable,

    /// キーが未指定
    #[error("Key is required")]
    MissingKey,

    /// 対象リソース（テーブル・インデックス）が存在しない
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// 読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// 書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// 項目のシリアライズ/デシリアライズに失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// セカンダリインデックスクエリの指定
///
/// インデックス名、キー条件式、条件式にバインドする値を必須とする。
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// インデックス名（例: `UserIndex`）
    pub index_name: String,
    /// キー条件式（例: `userId = :userId`）
    pub key_condition: String,
    /// プレースホルダーとバインド値のペア
    pub values: Vec<(String, Value)>,
}

/// スキャンの任意オプション
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// フィルター式（例: `category = :category`）
    pub filter_expression: Option<String>,
    /// プレースホルダーとバインド値のペア
    pub values: Vec<(String, Value)>,
}

/// ドキュメントストア操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// 主キーで1件取得する
    ///
    /// 見つからない場合は`Ok(None)`。テーブル名が空なら`MissingTable`、
    /// キー値が空なら`MissingKey`。
    async fn get_item(
        &self,
        table: &str,
        key_name: &str,
        key_value: &str,
    ) -> Result<Option<Value>, StoreError>;

    /// 項目を無条件に書き込む（同一キーの既存項目は上書き）
    async fn put_item(&self, table: &str, item: &Value) -> Result<(), StoreError>;

    /// セカンダリインデックスに対するクエリを実行する
    async fn query_items(&self, table: &str, options: QueryOptions)
        -> Result<Vec<Value>, StoreError>;

    /// テーブル全体をスキャンする
    ///
    /// 内部でLastEvaluatedKeyを追跡し、全ページを結合して返す。
    /// 呼び出し元にページネーショントークンは露出しない。
    async fn scan_items(
        &self,
        table: &str,
        options: Option<ScanOptions>,
    ) -> Result<Vec<Value>, StoreError>;
}

/// StoreClientのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoStoreClient {
    /// DynamoDBクライアント
    client: DynamoDbClient,
}

impl DynamoStoreClient {
    /// 新しいDynamoStoreClientを作成
    pub fn new(client: DynamoDbClient) -> Self {
        Self { client }
    }

    /// テーブル名を検証する
    fn require_table(table: &str) -> Result<(), StoreError> {
        if table.is_empty() {
            warn!("テーブル名が未設定のままストア操作が要求された");
            return Err(StoreError::MissingTable);
        }
        Ok(())
    }

    /// AttributeValueマップをJSONドキュメントに変換する
    fn item_to_value(
        item: std::collections::HashMap<String, aws_sdk_dynamodb::types::AttributeValue>,
    ) -> Result<Value, StoreError> {
        serde_dynamo::aws_sdk_dynamodb_1::from_item(item)
            .map_err(|e| StoreError::SerializationError(e.to_string()))
    }

    /// バインド値をAttributeValueに変換する
    fn to_attribute_value(value: &Value) -> Result<aws_sdk_dynamodb::types::AttributeValue, StoreError> {
        serde_dynamo::aws_sdk_dynamodb_1::to_attribute_value(value)
            .map_err(|e| StoreError::SerializationError(e.to_string()))
    }
}

#[async_trait]
impl StoreClient for DynamoStoreClient {
    async fn get_item(
        &self,
        table: &str,
        key_name: &str,
        key_value: &str,
    ) -> Result<Option<Value>, StoreError> {
        Self::require_table(table)?;
        if key_name.is_empty() || key_value.is_empty() {
            return Err(StoreError::MissingKey);
        }

        debug!(table = table, key = key_name, "GetItem実行");

        let result = self
            .client
            .get_item()
            .table_name(table)
            .key(
                key_name,
                aws_sdk_dynamodb::types::AttributeValue::S(key_value.to_string()),
            )
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_resource_not_found_exception() {
                    StoreError::ResourceNotFound(service_error.to_string())
                } else {
                    StoreError::ReadError(service_error.to_string())
                }
            })?;

        match result.item {
            Some(item) => Ok(Some(Self::item_to_value(item)?)),
            None => Ok(None),
        }
    }

    async fn put_item(&self, table: &str, item: &Value) -> Result<(), StoreError> {
        Self::require_table(table)?;

        let item = serde_dynamo::aws_sdk_dynamodb_1::to_item(item)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        debug!(table = table, "PutItem実行");

        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_resource_not_found_exception() {
                    StoreError::ResourceNotFound(service_error.to_string())
                } else {
                    StoreError::WriteError(service_error.to_string())
                }
            })?;

        Ok(())
    }

    async fn query_items(
        &self,
        table: &str,
        options: QueryOptions,
    ) -> Result<Vec<Value>, StoreError> {
        Self::require_table(table)?;

        debug!(
            table = table,
            index = options.index_name.as_str(),
            "Query実行"
        );

        let mut builder = self
            .client
            .query()
            .table_name(table)
            .index_name(&options.index_name)
            .key_condition_expression(&options.key_condition);

        for (placeholder, value) in &options.values {
            builder = builder.expression_attribute_values(placeholder, Self::to_attribute_value(value)?);
        }

        let result = builder.send().await.map_err(|e| {
            let service_error = e.into_service_error();
            if service_error.is_resource_not_found_exception() {
                StoreError::ResourceNotFound(service_error.to_string())
            } else {
                StoreError::ReadError(service_error.to_string())
            }
        })?;

        result
            .items
            .unwrap_or_default()
            .into_iter()
            .map(Self::item_to_value)
            .collect()
    }

    async fn scan_items(
        &self,
        table: &str,
        options: Option<ScanOptions>,
    ) -> Result<Vec<Value>, StoreError> {
        Self::require_table(table)?;

        let options = options.unwrap_or_default();
        let mut items = Vec::new();
        let mut last_evaluated_key = None;

        // ページネーション: LastEvaluatedKeyがある限りスキャンを続ける
        loop {
            let mut builder = self.client.scan().table_name(table);

            if let Some(expression) = &options.filter_expression {
                builder = builder.filter_expression(expression);
                for (placeholder, value) in &options.values {
                    builder =
                        builder.expression_attribute_values(placeholder, Self::to_attribute_value(value)?);
                }
            }

            // 前回のスキャンの続きから開始
            if let Some(key) = last_evaluated_key.take() {
                builder = builder.set_exclusive_start_key(Some(key));
            }

            let result = builder.send().await.map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_resource_not_found_exception() {
                    StoreError::ResourceNotFound(service_error.to_string())
                } else {
                    StoreError::ReadError(service_error.to_string())
                }
            })?;

            if let Some(page) = result.items {
                for item in page {
                    items.push(Self::item_to_value(item)?);
                }
            }

            // 次のページがあるか確認
            match result.last_evaluated_key {
                Some(key) => last_evaluated_key = Some(key),
                None => break,
            }
        }

        debug!(table = table, count = items.len(), "Scan完了");

        Ok(items)
    }
}
