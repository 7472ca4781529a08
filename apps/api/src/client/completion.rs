//! # Completion API クライアント
//!
//! OpenAI 互換の Chat Completions API を呼び出し、最初の選択肢の
//! メッセージ本文を返す。本文の中身（JSON かどうか）は検証しない。
//!
//! ## エンドポイント
//!
//! - `POST /v1/chat/completions`

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::read_error_body;

/// Completion API クライアントエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
   /// 接続できない、またはタイムアウトした
   #[error("Completion API に接続できません: {0}")]
   Unreachable(String),

   /// 2xx 以外のステータスが返された
   #[error("Completion API がステータス {status} を返しました: {body}")]
   Status { status: u16, body: String },

   /// 成功レスポンスが JSON として読めないなど、想定外の応答
   #[error("予期しないエラー: {0}")]
   Unexpected(String),
}

// --- リクエスト型 ---

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
   role:    &'a str,
   content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
   model:       &'a str,
   messages:    [ChatMessage<'a>; 2],
   temperature: f32,
}

/// Completion API クライアントトレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
#[async_trait]
pub trait CompletionClient: Send + Sync {
   /// システム指示とユーザー入力を送り、最初の選択肢の本文を返す
   ///
   /// 本文が存在しない場合は空文字列を返す。
   async fn complete(&self, system_prompt: &str, user_text: &str)
   -> Result<String, CompletionError>;
}

/// OpenAI Chat Completions API クライアント
pub struct OpenAiCompletionClient {
   base_url: String,
   api_key:  String,
   model:    String,
   client:   reqwest::Client,
}

impl OpenAiCompletionClient {
   /// 新しいクライアントを作成する
   ///
   /// # 引数
   ///
   /// - `base_url`: API のベース URL（例: `https://api.openai.com`）
   /// - `timeout`: 1 リクエストあたりの上限時間（接続から本文受信まで）
   pub fn new(
      base_url: &str,
      api_key: impl Into<String>,
      model: impl Into<String>,
      timeout: Duration,
   ) -> Result<Self, reqwest::Error> {
      Ok(Self {
         base_url: base_url.trim_end_matches('/').to_string(),
         api_key:  api_key.into(),
         model:    model.into(),
         client:   reqwest::Client::builder().timeout(timeout).build()?,
      })
   }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
   async fn complete(
      &self,
      system_prompt: &str,
      user_text: &str,
   ) -> Result<String, CompletionError> {
      let url = format!("{}/v1/chat/completions", self.base_url);
      let request = ChatCompletionRequest {
         model:       &self.model,
         messages:    [
            ChatMessage {
               role:    "system",
               content: system_prompt,
            },
            ChatMessage {
               role:    "user",
               content: user_text,
            },
         ],
         temperature: 0.0,
      };

      let response = self
         .client
         .post(&url)
         .bearer_auth(&self.api_key)
         .json(&request)
         .send()
         .await
         .map_err(|e| CompletionError::Unreachable(e.to_string()))?;

      let status = response.status();
      if !status.is_success() {
         let body = read_error_body(response).await;
         return Err(CompletionError::Status {
            status: status.as_u16(),
            body,
         });
      }

      let body = response
         .json::<Value>()
         .await
         .map_err(|e| CompletionError::Unexpected(e.to_string()))?;

      Ok(first_choice_content(&body))
   }
}

/// `choices[0].message.content` を取り出す（存在しなければ空文字列）
fn first_choice_content(body: &Value) -> String {
   body
      .pointer("/choices/0/message/content")
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_string()
}
