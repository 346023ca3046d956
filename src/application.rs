// アプリケーション層モジュール
pub mod auth_handler;
pub mod order_service;
pub mod orders_handler;
pub mod product_service;
pub mod products_handler;
pub mod response;

// 再エクスポート
pub use auth_handler::AuthHandler;
pub use order_service::OrderService;
pub use orders_handler::OrdersHandler;
pub use product_service::ProductService;
pub use products_handler::ProductsHandler;
