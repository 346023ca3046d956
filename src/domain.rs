// ドメイン層モジュール
pub mod order;
pub mod request;
pub mod token;

// 再エクスポート
pub use order::{Order, OrderStatus, ORDER_ID_PREFIX};
pub use request::{AuthRequest, CreateOrderRequest, RequestParseError};
pub use token::TokenSet;
