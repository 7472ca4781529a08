//! # ヘルスチェックハンドラ
//!
//! ロードバランサーやコンテナオーケストレーターの liveness probe 用。
//! 外部サービス（Completion API / 認証サービス）への疎通は確認しない。

use axum::Json;
use workout_parser_shared::HealthResponse;

/// GET /health
///
/// 常に 200 OK と `{"status":"healthy","version":"..."}` を返す。
pub async fn health_check() -> Json<HealthResponse> {
   Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}
