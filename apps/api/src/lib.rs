//! # ワークアウト解析 API
//!
//! 自由記述のワークアウトテキストを受け取り、固定のシステム指示とともに
//! Completion API（OpenAI 互換）へ転送し、返ってきた JSON を検証して返す。
//!
//! ```text
//! ┌──────────┐     ┌────────────────────┐     ┌────────────────┐
//! │  Client  │────▶│ workout-parser-api │────▶│ Completion API │
//! └──────────┘     └────────────────────┘     └────────────────┘
//!                            │ (REQUIRE_AUTH=true)
//!                            ▼
//!                  ┌────────────────────┐
//!                  │   認証サービス      │
//!                  └────────────────────┘
//! ```
//!
//! リクエスト間で共有する可変状態はなく、結果の保存やリトライも行わない。
//!
//! ## モジュール構成
//!
//! - [`app_builder`] - State とルーターの構築
//! - [`client`] - 外部 API クライアント（Completion API / 認証サービス）
//! - [`config`] - アプリケーション設定（環境変数からの読み込み）
//! - [`error`] - エラー定義と HTTP レスポンスへの変換
//! - [`handler`] - HTTP リクエストハンドラ
//! - [`middleware`] - CORS
//! - [`prompt`] - Completion API に渡すシステム指示

pub mod app_builder;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod prompt;
