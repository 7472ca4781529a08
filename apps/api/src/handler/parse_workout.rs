//! # ワークアウト解析ハンドラ
//!
//! 自由記述のワークアウトテキストを Completion API に渡し、返ってきた JSON を
//! そのまま呼び出し元へ返す。解析処理自体は外部モデルに委譲する。
//!
//! ## 処理順序
//!
//! 各ステップで失敗した時点で打ち切り、それ以降の外部呼び出しは行わない。
//!
//! 1. （認証必須時）`Authorization: Bearer <token>` の存在と形式
//! 2. （認証必須時）認証サービスが設定されているか
//! 3. （認証必須時）トークン検証
//! 4. ボディを上限（[`MAX_BODY_BYTES`]）まで読み込み、JSON として解析できるか
//! 5. `raw_text` が空白以外の文字を含む文字列か
//! 6. Completion API が設定されているか
//! 7. Completion API 呼び出し → 本文を JSON として解析 → そのまま返す
//!
//! ボディは認証ステップが終わるまで読み込まない。
//!
//! プリフライトと 405 はこのハンドラに到達する前に処理される
//! （[`crate::middleware::cors`] と [`method_not_allowed`]）。

use std::sync::Arc;

use axum::{
   Json,
   body::{Body, to_bytes},
   extract::State,
   http::{HeaderMap, StatusCode, header},
   response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{
   client::{CompletionClient, IdentityVerifier},
   error::ParseWorkoutError,
   prompt::WORKOUT_SYSTEM_PROMPT,
};

/// リクエストボディの上限（2 MiB）
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// 認証モード
#[derive(Clone)]
pub enum AuthMode {
   /// 認証なし（誰でも呼び出せる）
   Disabled,
   /// Bearer トークン必須
   ///
   /// `None` は認証サービスが設定されていないことを表し、
   /// トークンが正しい形式でもリクエストは 500 になる。
   Required(Option<Arc<dyn IdentityVerifier>>),
}

/// ワークアウト解析ハンドラの共有状態
#[derive(Clone)]
pub struct ParseWorkoutState {
   /// Completion API クライアント（`None` は認証キー未設定）
   pub completion_client: Option<Arc<dyn CompletionClient>>,
   pub auth_mode:         AuthMode,
}

/// POST /api/v1/parse-workout
///
/// ## リクエストボディ
///
/// ```json
/// { "raw_text": "Squat 3x5 @ 225, bench 5x5 185" }
/// ```
///
/// ## レスポンス
///
/// 成功時はモデルが返した JSON をフィールドの追加・変換なしで返す。
/// 失敗時のステータスとボディは [`ParseWorkoutError`] を参照。
#[tracing::instrument(skip_all, fields(user_id = tracing::field::Empty))]
pub async fn parse_workout(
   State(state): State<Arc<ParseWorkoutState>>,
   headers: HeaderMap,
   body: Body,
) -> Response {
   match run(&state, &headers, body).await {
      Ok(parsed) => (StatusCode::OK, Json(parsed)).into_response(),
      Err(e) => e.into_response(),
   }
}

/// POST 以外のメソッドに対するフォールバック
pub async fn method_not_allowed() -> Response {
   ParseWorkoutError::MethodNotAllowed.into_response()
}

async fn run(
   state: &ParseWorkoutState,
   headers: &HeaderMap,
   body: Body,
) -> Result<Value, ParseWorkoutError> {
   if let AuthMode::Required(verifier) = &state.auth_mode {
      let token = extract_bearer_token(headers)?;
      let verifier = verifier
         .as_ref()
         .ok_or(ParseWorkoutError::IdentityNotConfigured)?;
      let principal = verifier.verify(token).await?;
      tracing::Span::current().record("user_id", principal.id.as_str());
      tracing::debug!(user.id = %principal.id, "トークン検証に成功");
   }

   let body = to_bytes(body, MAX_BODY_BYTES)
      .await
      .map_err(|e| ParseWorkoutError::PayloadTooLarge(e.to_string()))?;
   let raw_text = parse_raw_text(&body)?;

   let completion_client = state
      .completion_client
      .as_ref()
      .ok_or(ParseWorkoutError::CompletionNotConfigured)?;

   tracing::debug!(raw_text.len = raw_text.len(), "Completion API を呼び出します");
   let content = completion_client
      .complete(WORKOUT_SYSTEM_PROMPT, &raw_text)
      .await?;

   serde_json::from_str::<Value>(&content)
      .map_err(|_| ParseWorkoutError::UpstreamInvalidJson(content))
}

/// `Authorization: Bearer <token>` からトークンを取り出す
///
/// スキーム名は大文字小文字を区別しない。ヘッダーがない場合、スキームが
/// `Bearer` でない場合、トークンが空の場合はエラー。
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ParseWorkoutError> {
   let value = headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or(ParseWorkoutError::MissingBearerToken)?;

   let Some((scheme, token)) = value.split_once(' ') else {
      return Err(ParseWorkoutError::MissingBearerToken);
   };
   let token = token.trim();

   if !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
      return Err(ParseWorkoutError::MissingBearerToken);
   }
   Ok(token)
}

/// リクエストボディから `raw_text` を取り出す
///
/// ボディが JSON でなければ [`ParseWorkoutError::InvalidJsonBody`]。
/// `raw_text` が存在しない・文字列でない・空白のみの場合は
/// [`ParseWorkoutError::MissingRawText`]。値はトリムせずに返す。
pub fn parse_raw_text(body: &[u8]) -> Result<String, ParseWorkoutError> {
   let value: Value =
      serde_json::from_slice(body).map_err(|_| ParseWorkoutError::InvalidJsonBody)?;

   match value.get("raw_text").and_then(Value::as_str) {
      Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
      _ => Err(ParseWorkoutError::MissingRawText),
   }
}
