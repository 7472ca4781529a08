//! # Workout Parser 共有ユーティリティ
//!
//! ワークアウト解析サービスと、今後追加されるサービスで共通に使うユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - axum などの Web フレームワークには依存しない（変換は各サービスの責務）
//! - ビジネスロジックを含まない純粋なデータ構造と初期化処理のみを配置
//! - トレーシング関連の依存は `observability` feature で有効化する

pub mod error_response;
pub mod health;
pub mod observability;

pub use error_response::ErrorBody;
pub use health::HealthResponse;
