//! # API エラーハンドリング
//!
//! ワークアウト解析エンドポイントの終端結果（成功以外）を定義し、
//! axum レスポンスへ変換する。
//!
//! ## マッピング
//!
//! | ParseWorkoutError | HTTP Status | ボディ |
//! |-------------------|-------------|--------|
//! | MethodNotAllowed | 405 | `{ error }` |
//! | MissingBearerToken | 401 | `{ error }` |
//! | IdentityNotConfigured | 500 | `{ error }` |
//! | Unauthenticated | 401 | `{ error }` |
//! | PayloadTooLarge | 413 | `{ error }` |
//! | InvalidJsonBody | 400 | `{ error }` |
//! | MissingRawText | 400 | `{ error }` |
//! | CompletionNotConfigured | 500 | `{ error }` |
//! | UpstreamUnreachable | 502 | `{ error, details }` |
//! | UpstreamStatus | 502 | `{ error, details }` |
//! | UpstreamInvalidJson | 502 | `{ error, raw }` |
//! | Internal | 500 | `{ error }`（固定メッセージ） |
//!
//! 設定不備・上流エラー・内部エラーは変換時に `tracing::error!` で記録する。

use axum::{
   Json,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use thiserror::Error;
use workout_parser_shared::ErrorBody;

use crate::client::{CompletionError, IdentityError};

/// ワークアウト解析の失敗
///
/// 最初に失敗した検証ステップに対応するバリアントが 1 つだけ返る。
#[derive(Debug, Error)]
pub enum ParseWorkoutError {
   /// POST / OPTIONS 以外のメソッド
   #[error("Method not allowed")]
   MethodNotAllowed,

   /// Authorization ヘッダーがない、または `Bearer <token>` 形式でない
   #[error("Missing or invalid Authorization header")]
   MissingBearerToken,

   /// 認証サービスの URL / 匿名キーが設定されていない
   #[error("Auth service is not configured")]
   IdentityNotConfigured,

   /// トークン検証に失敗した
   #[error("Unauthorized")]
   Unauthenticated(#[source] IdentityError),

   /// リクエストボディが上限を超えている、または読み込めない
   #[error("Request body too large")]
   PayloadTooLarge(String),

   /// リクエストボディが JSON として読めない
   #[error("Invalid JSON body")]
   InvalidJsonBody,

   /// `raw_text` が存在しない、文字列でない、または空白のみ
   #[error("raw_text is required")]
   MissingRawText,

   /// Completion API の認証キーが設定されていない
   #[error("OpenAI API key is not configured")]
   CompletionNotConfigured,

   /// Completion API に到達できない
   #[error("Failed to reach OpenAI API")]
   UpstreamUnreachable(String),

   /// Completion API が 2xx 以外を返した
   #[error("Failed to call OpenAI API")]
   UpstreamStatus { status: u16, body: String },

   /// モデル出力が JSON として読めない
   #[error("OpenAI returned non-JSON response")]
   UpstreamInvalidJson(String),

   /// 上記以外の想定外の失敗
   #[error("Internal server error")]
   Internal(String),
}

impl ParseWorkoutError {
   /// HTTP ステータスコード
   pub fn status_code(&self) -> StatusCode {
      match self {
         Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
         Self::MissingBearerToken | Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
         Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
         Self::InvalidJsonBody | Self::MissingRawText => StatusCode::BAD_REQUEST,
         Self::IdentityNotConfigured | Self::CompletionNotConfigured | Self::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
         }
         Self::UpstreamUnreachable(_) | Self::UpstreamStatus { .. } | Self::UpstreamInvalidJson(_) => {
            StatusCode::BAD_GATEWAY
         }
      }
   }

   /// レスポンスボディ
   ///
   /// 診断情報を返すのは 502 のみ。内部エラーの詳細は返さない。
   pub fn body(&self) -> ErrorBody {
      match self {
         Self::UpstreamUnreachable(details) => ErrorBody::new(self.to_string()).with_details(details),
         Self::UpstreamStatus { body, .. } => ErrorBody::new(self.to_string()).with_details(body),
         Self::UpstreamInvalidJson(raw) => ErrorBody::new(self.to_string()).with_raw(raw),
         Self::Internal(_) => ErrorBody::internal_error(),
         _ => ErrorBody::new(self.to_string()),
      }
   }

   /// 運用者向けのログを出力する
   fn log(&self) {
      match self {
         Self::IdentityNotConfigured | Self::CompletionNotConfigured => {
            tracing::error!(
               error.category = "configuration",
               error.kind = "missing_credential",
               "設定不備: {}",
               self
            );
         }
         Self::Unauthenticated(source) => {
            tracing::warn!(
               error.category = "authentication",
               error.kind = "token_verification",
               "トークン検証に失敗: {}",
               source
            );
         }
         Self::PayloadTooLarge(detail) => {
            tracing::warn!(
               error.category = "client",
               error.kind = "payload_too_large",
               "リクエストボディを読み込めません: {}",
               detail
            );
         }
         Self::UpstreamUnreachable(details) => {
            tracing::error!(
               error.category = "external_service",
               error.kind = "completion_unreachable",
               "Completion API に接続できません: {}",
               details
            );
         }
         Self::UpstreamStatus { status, body } => {
            tracing::error!(
               error.category = "external_service",
               error.kind = "completion_status",
               upstream.status = status,
               "Completion API エラー: {}",
               body
            );
         }
         Self::UpstreamInvalidJson(raw) => {
            tracing::error!(
               error.category = "external_service",
               error.kind = "completion_invalid_json",
               "モデル出力を JSON として解析できません: {}",
               raw
            );
         }
         Self::Internal(detail) => {
            tracing::error!(
               error.category = "internal",
               error.kind = "unexpected",
               "内部エラー: {}",
               detail
            );
         }
         _ => {}
      }
   }
}

impl From<CompletionError> for ParseWorkoutError {
   fn from(err: CompletionError) -> Self {
      match err {
         CompletionError::Unreachable(details) => Self::UpstreamUnreachable(details),
         CompletionError::Status { status, body } => Self::UpstreamStatus { status, body },
         CompletionError::Unexpected(detail) => Self::Internal(detail),
      }
   }
}

impl From<IdentityError> for ParseWorkoutError {
   fn from(err: IdentityError) -> Self {
      Self::Unauthenticated(err)
   }
}

impl IntoResponse for ParseWorkoutError {
   fn into_response(self) -> Response {
      self.log();
      (self.status_code(), Json(self.body())).into_response()
   }
}

/// 内部エラーレスポンス
///
/// ハンドラの外（panic 回復など）で使う。
pub fn internal_error_response() -> Response {
   (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(ErrorBody::internal_error()),
   )
      .into_response()
}

#[cfg(test)]
mod tests {
   use axum::body::to_bytes;
   use pretty_assertions::assert_eq;
   use rstest::rstest;
   use serde_json::{Value, json};

   use super::*;

   async fn status_and_json(response: Response) -> (StatusCode, Value) {
      let status = response.status();
      let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
      (status, serde_json::from_slice(&body).unwrap())
   }

   #[rstest]
   #[case(ParseWorkoutError::MethodNotAllowed, 405, "Method not allowed")]
   #[case(ParseWorkoutError::MissingBearerToken, 401, "Missing or invalid Authorization header")]
   #[case(ParseWorkoutError::IdentityNotConfigured, 500, "Auth service is not configured")]
   #[case(ParseWorkoutError::Unauthenticated(IdentityError::Rejected), 401, "Unauthorized")]
   #[case(ParseWorkoutError::PayloadTooLarge("length limit exceeded".into()), 413, "Request body too large")]
   #[case(ParseWorkoutError::InvalidJsonBody, 400, "Invalid JSON body")]
   #[case(ParseWorkoutError::MissingRawText, 400, "raw_text is required")]
   #[case(ParseWorkoutError::CompletionNotConfigured, 500, "OpenAI API key is not configured")]
   #[tokio::test]
   async fn test_クライアントエラーと設定不備はerrorのみを返す(
      #[case] err: ParseWorkoutError,
      #[case] status: u16,
      #[case] message: &str,
   ) {
      let (actual_status, body) = status_and_json(err.into_response()).await;

      assert_eq!(actual_status.as_u16(), status);
      assert_eq!(body, json!({ "error": message }));
   }

   #[tokio::test]
   async fn test_上流に到達できない場合は502とdetails() {
      let err = ParseWorkoutError::from(CompletionError::Unreachable("connection refused".into()));
      let (status, body) = status_and_json(err.into_response()).await;

      assert_eq!(status, StatusCode::BAD_GATEWAY);
      assert_eq!(
         body,
         json!({ "error": "Failed to reach OpenAI API", "details": "connection refused" })
      );
   }

   #[tokio::test]
   async fn test_上流のエラーステータスは502と生のボディ() {
      let err = ParseWorkoutError::from(CompletionError::Status {
         status: 429,
         body:   r#"{"error":{"message":"Rate limit reached"}}"#.to_string(),
      });
      let (status, body) = status_and_json(err.into_response()).await;

      assert_eq!(status, StatusCode::BAD_GATEWAY);
      assert_eq!(body["error"], "Failed to call OpenAI API");
      assert_eq!(body["details"], r#"{"error":{"message":"Rate limit reached"}}"#);
   }

   #[tokio::test]
   async fn test_json以外のモデル出力は502とraw() {
      let err = ParseWorkoutError::UpstreamInvalidJson("not json".to_string());
      let (status, body) = status_and_json(err.into_response()).await;

      assert_eq!(status, StatusCode::BAD_GATEWAY);
      assert_eq!(
         body,
         json!({ "error": "OpenAI returned non-JSON response", "raw": "not json" })
      );
   }

   #[tokio::test]
   async fn test_内部エラーは詳細を漏らさない() {
      let err = ParseWorkoutError::from(CompletionError::Unexpected("secret stack trace".into()));
      let (status, body) = status_and_json(err.into_response()).await;

      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
      assert_eq!(body, json!({ "error": "Internal server error" }));
   }

   #[tokio::test]
   async fn test_internal_error_responseは固定メッセージ() {
      let (status, body) = status_and_json(internal_error_response()).await;

      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
      assert_eq!(body, json!({ "error": "Internal server error" }));
   }
}
