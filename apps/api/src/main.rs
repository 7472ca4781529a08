//! # ワークアウト解析 API サーバー
//!
//! ## 環境変数
//!
//! 一覧は [`workout_parser_api::config`] を参照。ログ関連は以下の 2 つ。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `LOG_FORMAT` | No | `json` または `pretty`（デフォルト） |
//! | `RUST_LOG` | No | ログフィルタ（デフォルト: `info,workout_parser=debug,tower_http=info`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用）
//! cargo run -p workout-parser-api
//!
//! # 本番環境（環境変数を直接指定）
//! OPENAI_API_KEY=sk-... LOG_FORMAT=json cargo run -p workout-parser-api --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use workout_parser_api::{
   app_builder::{PARSE_WORKOUT_PATH, build_app, build_state},
   config::ApiConfig,
};
use workout_parser_shared::observability::{TracingConfig, init_tracing};

/// サーバーのエントリーポイント
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. State とルーターの構築
/// 5. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
   // 本番環境では .env ファイルは使用せず、環境変数を直接設定する
   dotenvy::dotenv().ok();

   let tracing_config = TracingConfig::from_env("workout-parser-api");
   init_tracing(&tracing_config);
   let _tracing_guard =
      tracing::info_span!("app", service = %tracing_config.service_name).entered();

   let config = ApiConfig::from_env()?;
   tracing::debug!(?config, "設定を読み込みました");

   let state = Arc::new(build_state(&config)?);
   let app = build_app(state);

   let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
   let listener = TcpListener::bind(addr).await?;
   tracing::info!("サーバーが起動しました: {} (POST {})", addr, PARSE_WORKOUT_PATH);

   axum::serve(listener, app)
      .with_graceful_shutdown(shutdown_signal())
      .await?;

   tracing::info!("サーバーを停止しました");
   Ok(())
}

/// Ctrl+C を受け取ったら処理中のリクエストを待って停止する
async fn shutdown_signal() {
   if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!("シグナルハンドラの登録に失敗しました: {}", e);
      std::future::pending::<()>().await;
   }
}
