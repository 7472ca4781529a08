//! # エラーレスポンス
//!
//! 全エンドポイントで共通のエラーレスポンス構造体を提供する。
//!
//! ## 形状
//!
//! ```json
//! { "error": "Failed to call completion service", "details": "..." }
//! ```
//!
//! - `error` は常に含まれる、人間可読な固定メッセージ
//! - `details` は上流サービスの失敗内容（502 のみ）
//! - `raw` は JSON として解釈できなかったモデル出力（502 のみ）
//!
//! ## 設計
//!
//! - `ErrorBody` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換は各サービスの責務（shared に axum 依存を入れない）

use serde::{Deserialize, Serialize};

/// 内部エラー時の固定メッセージ
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// エラーレスポンス
///
/// `details` / `raw` は値がある場合のみシリアライズされる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
   pub error:   String,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub details: Option<String>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub raw:     Option<String>,
}

impl ErrorBody {
   /// `error` のみを持つレスポンスを作成する
   pub fn new(error: impl Into<String>) -> Self {
      Self {
         error:   error.into(),
         details: None,
         raw:     None,
      }
   }

   /// 診断用の `details` を付加する
   pub fn with_details(mut self, details: impl Into<String>) -> Self {
      self.details = Some(details.into());
      self
   }

   /// 解析できなかった生の出力を `raw` として付加する
   pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
      self.raw = Some(raw.into());
      self
   }

   /// 500 Internal Server Error
   ///
   /// メッセージは固定値（内部情報を漏らさないため）。
   pub fn internal_error() -> Self {
      Self::new(INTERNAL_ERROR_MESSAGE)
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;
   use serde_json::json;

   use super::*;

   #[test]
   fn test_newはerrorのみをシリアライズする() {
      let json = serde_json::to_value(ErrorBody::new("raw_text is required")).unwrap();

      assert_eq!(json, json!({ "error": "raw_text is required" }));
   }

   #[test]
   fn test_with_detailsでdetailsが含まれる() {
      let body = ErrorBody::new("Failed to reach completion service").with_details("timed out");
      let json = serde_json::to_value(&body).unwrap();

      assert_eq!(
         json,
         json!({ "error": "Failed to reach completion service", "details": "timed out" })
      );
   }

   #[test]
   fn test_with_rawで空文字列もそのまま保持する() {
      let json = serde_json::to_value(ErrorBody::new("bad output").with_raw("")).unwrap();

      // 空文字列でも raw は省略しない
      assert_eq!(json, json!({ "error": "bad output", "raw": "" }));
   }

   #[test]
   fn test_internal_errorは固定メッセージを返す() {
      assert_eq!(ErrorBody::internal_error().error, "Internal server error");
      assert_eq!(ErrorBody::internal_error().details, None);
   }

   #[test]
   fn test_jsonデシリアライズでオプションフィールドが欠けていてもよい() {
      let body: ErrorBody = serde_json::from_str(r#"{"error":"Unauthorized"}"#).unwrap();

      assert_eq!(body, ErrorBody::new("Unauthorized"));
   }
}
