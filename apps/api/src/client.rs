//! # 外部 API クライアント
//!
//! ハンドラから呼び出す外部サービスとの通信を担当する。
//!
//! - `completion`: Completion API（OpenAI 互換）
//! - `identity`: 認証サービス（Bearer トークンの検証）
//!
//! どちらもトレイトで定義し、テスト時にはスタブに差し替える。

mod completion;
mod identity;

pub use completion::{CompletionClient, CompletionError, OpenAiCompletionClient};
pub use identity::{IdentityError, IdentityVerifier, Principal, SupabaseIdentityClient};

/// エラーレスポンスの本文を読み込む
///
/// 読み込みに失敗した場合は空文字列ではなく失敗内容を返す。
async fn read_error_body(response: reqwest::Response) -> String {
   match response.text().await {
      Ok(body) => body,
      Err(e) => format!("<failed to read body: {e}>"),
   }
}
