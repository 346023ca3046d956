// 商品ハンドラー
//
// GET /products を処理する。クエリパラメータで分岐する:
// - `search`: 検索クライアントへ委譲。検索の失敗は内部詳細を隠した
//   503（サービス一時停止）に丸める。ただし設定不備は503ではなく
//   500の設定エラーとして返す。
// - `category`: カテゴリ別一覧
// - なし: 全件一覧

use std::sync::Arc;

use lambda_http::http::Method;
use lambda_http::{Body, Request, RequestExt, Response};
use tracing::{info, warn};

use crate::application::response;
use crate::application::ProductService;
use crate::infrastructure::{SearchOps, StoreError};

/// 検索失敗時に呼び出し元へ返す汎用メッセージ
const SEARCH_UNAVAILABLE: &str = "Search service is currently unavailable. Please try again later.";

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

/// 商品ハンドラー
#[derive(Clone)]
pub struct ProductsHandler {
    /// 商品サービス
    products: ProductService,
    /// 検索クライアント
    search: Arc<dyn SearchOps>,
}

impl ProductsHandler {
    /// 新しいProductsHandlerを作成
    pub fn new(products: ProductService, search: Arc<dyn SearchOps>) -> Self {
        Self { products, search }
    }

    /// 商品リクエストを処理する
    pub async fn handle(&self, event: Request) -> Response<Body> {
        if *event.method() != Method::GET {
            return response::error("Method not allowed", 405);
        }

        let query_parameters = event.query_string_parameters();

        if let Some(query) = query_parameters.first("search") {
            return self.search_products(query).await;
        }

        if let Some(category) = query_parameters.first("category") {
            info!(category = category, "カテゴリ別に商品を取得");
            return match self.products.get_products_by_category(category).await {
                Ok(products) => response::success(&products),
                Err(e) => store_error_response(e),
            };
        }

        match self.products.get_all_products().await {
            Ok(products) => response::success(&products),
            Err(e) => store_error_response(e),
        }
    }

    /// キーワード検索を実行する
    ///
    /// 検索の失敗は種別を問わず503の汎用メッセージに丸める
    /// （タイムアウトも含む）。設定不備のみ500の設定エラーとして返す。
    async fn search_products(&self, query: &str) -> Response<Body> {
        info!(query = query, "商品を検索");

        match self.search.search(query).await {
            Ok(results) => response::success(&results),
            Err(e) if e.is_config_error() => {
                warn!(error = e.to_string(), "検索エンドポイントの設定不備");
                response::error("Search service configuration error", 500)
            }
            Err(e) => {
                warn!(error = e.to_string(), "検索に失敗");
                response::error(SEARCH_UNAVAILABLE, 503)
            }
        }
    }
}
