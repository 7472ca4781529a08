//! # 認証サービスクライアント
//!
//! Bearer トークンを認証サービス（Supabase Auth 互換）に問い合わせ、
//! トークンの持ち主（プリンシパル）を取得する。
//!
//! ## エンドポイント
//!
//! - `GET /auth/v1/user` - トークンに対応するユーザーを返す

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::read_error_body;

/// 認証済みの呼び出し元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
   /// ユーザー ID
   pub id:    String,
   /// メールアドレス（認証サービスが返した場合のみ）
   pub email: Option<String>,
}

/// 認証サービスクライアントエラー
///
/// いずれのバリアントも呼び出し元には 401 として返す。
/// 区別はログ出力のためだけに使う。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
   /// トークンが拒否された（401 / 403）
   #[error("トークンが拒否されました")]
   Rejected,

   /// 成功レスポンスにユーザー ID が含まれていない
   #[error("プリンシパルが見つかりません")]
   NoPrincipal,

   /// 接続できない、またはタイムアウトした
   #[error("認証サービスに接続できません: {0}")]
   Unreachable(String),

   /// 予期しないステータスやレスポンス
   #[error("予期しないエラー: {0}")]
   Unexpected(String),
}

/// トークン検証トレイト
///
/// テスト時にスタブを使用できるようトレイトで定義。
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
   /// トークンを検証し、プリンシパルを返す
   async fn verify(&self, token: &str) -> Result<Principal, IdentityError>;
}

/// Supabase Auth クライアント
pub struct SupabaseIdentityClient {
   base_url: String,
   anon_key: String,
   client:   reqwest::Client,
}

impl SupabaseIdentityClient {
   /// 新しいクライアントを作成する
   ///
   /// # 引数
   ///
   /// - `base_url`: プロジェクトのベース URL（例: `https://xyz.supabase.co`）
   /// - `anon_key`: 匿名アクセスキー（`apikey` ヘッダーに付与）
   pub fn new(
      base_url: &str,
      anon_key: impl Into<String>,
      timeout: Duration,
   ) -> Result<Self, reqwest::Error> {
      Ok(Self {
         base_url: base_url.trim_end_matches('/').to_string(),
         anon_key: anon_key.into(),
         client:   reqwest::Client::builder().timeout(timeout).build()?,
      })
   }
}

#[async_trait]
impl IdentityVerifier for SupabaseIdentityClient {
   async fn verify(&self, token: &str) -> Result<Principal, IdentityError> {
      let url = format!("{}/auth/v1/user", self.base_url);

      let response = self
         .client
         .get(&url)
         .bearer_auth(token)
         .header("apikey", &self.anon_key)
         .send()
         .await
         .map_err(|e| IdentityError::Unreachable(e.to_string()))?;

      match response.status() {
         status if status.is_success() => {
            let body = response
               .json::<Value>()
               .await
               .map_err(|e| IdentityError::Unexpected(e.to_string()))?;
            principal_from_user(&body).ok_or(IdentityError::NoPrincipal)
         }
         reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            Err(IdentityError::Rejected)
         }
         status => {
            let body = read_error_body(response).await;
            Err(IdentityError::Unexpected(format!(
               "予期しないステータス {}: {}",
               status, body
            )))
         }
      }
   }
}

/// ユーザーレスポンスからプリンシパルを組み立てる
///
/// `id` が空文字列または存在しない場合は `None`。
fn principal_from_user(body: &Value) -> Option<Principal> {
   let id = body.get("id").and_then(Value::as_str)?.trim();
   if id.is_empty() {
      return None;
   }

   Some(Principal {
      id:    id.to_string(),
      email: body.get("email").and_then(Value::as_str).map(str::to_string),
   })
}
