// インフラストラクチャ層モジュール
pub mod config;
pub mod identity;
pub mod logging;
pub mod notification;
pub mod queue;
pub mod search;
pub mod sigv4;
pub mod store;

// 再エクスポート
pub use config::{AuthConfig, ConfigError, OrdersConfig, ProductsConfig};
pub use identity::{CognitoIdentityClient, IdentityError, IdentityOps};
pub use logging::init_logging;
pub use notification::{NotificationError, NotificationOps, SnsNotifier};
pub use queue::{QueueError, QueueOps, SqsQueue};
pub use search::{SearchClient, SearchError, SearchOps};
pub use store::{DynamoStoreClient, QueryOptions, ScanOptions, StoreClient, StoreError};
