//! # アプリケーション構築
//!
//! 設定から State を組み立て、ルーターとミドルウェアを構成する。
//! `main.rs` と統合テストの両方から使う。

use std::{any::Any, sync::Arc};

use axum::{
   Router,
   middleware::from_fn,
   response::Response,
   routing::{get, post},
};
use tower_http::{
   catch_panic::CatchPanicLayer,
   request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
   trace::TraceLayer,
};
use workout_parser_shared::observability::{MakeRequestUuidV7, make_request_span};

use crate::{
   client::{
      CompletionClient,
      IdentityVerifier,
      OpenAiCompletionClient,
      SupabaseIdentityClient,
   },
   config::ApiConfig,
   error::internal_error_response,
   handler::{AuthMode, ParseWorkoutState, health_check, method_not_allowed, parse_workout},
   middleware::cors,
};

/// ワークアウト解析エンドポイントのパス
pub const PARSE_WORKOUT_PATH: &str = "/api/v1/parse-workout";

/// 設定から State を構築する
///
/// 認証キーが欠けているクライアントは作成せず `None` のままにする。
/// 欠落はリクエストごとに 500 として報告される。
pub fn build_state(config: &ApiConfig) -> Result<ParseWorkoutState, reqwest::Error> {
   let completion_client: Option<Arc<dyn CompletionClient>> = match &config.completion.api_key {
      Some(api_key) => Some(Arc::new(OpenAiCompletionClient::new(
         &config.completion.base_url,
         api_key.clone(),
         config.completion.model.clone(),
         config.upstream_timeout,
      )?)),
      None => {
         tracing::warn!("OPENAI_API_KEY が設定されていません。解析リクエストは 500 を返します");
         None
      }
   };

   let auth_mode = if config.identity.require_auth {
      let verifier: Option<Arc<dyn IdentityVerifier>> =
         match (&config.identity.url, &config.identity.anon_key) {
            (Some(url), Some(anon_key)) => Some(Arc::new(SupabaseIdentityClient::new(
               url,
               anon_key.clone(),
               config.upstream_timeout,
            )?)),
            _ => {
               tracing::warn!(
                  "SUPABASE_URL / SUPABASE_ANON_KEY が設定されていません。認証付きリクエストは 500 を返します"
               );
               None
            }
         };
      AuthMode::Required(verifier)
   } else {
      AuthMode::Disabled
   };

   Ok(ParseWorkoutState {
      completion_client,
      auth_mode,
   })
}

/// ルーターを構築する
pub fn build_app(state: Arc<ParseWorkoutState>) -> Router {
   Router::new()
      .route("/health", get(health_check))
      .route(
         PARSE_WORKOUT_PATH,
         post(parse_workout).fallback(method_not_allowed),
      )
      .with_state(state)
      // レイヤー順序（下に書いたものが外側）
      // 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
      // 2. TraceLayer: request_id を含むスパンを作成
      // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
      // 4. cors: プリフライト応答と全レスポンスへの CORS ヘッダー付与
      // 5. CatchPanicLayer（最内）: panic を固定の 500 レスポンスに変換
      .layer(CatchPanicLayer::custom(handle_panic))
      .layer(from_fn(cors))
      .layer(PropagateRequestIdLayer::x_request_id())
      .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
      .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
   let detail = if let Some(s) = err.downcast_ref::<String>() {
      s.as_str()
   } else if let Some(s) = err.downcast_ref::<&str>() {
      s
   } else {
      "unknown panic"
   };

   tracing::error!(
      error.category = "internal",
      error.kind = "panic",
      "リクエスト処理中に panic が発生しました: {}",
      detail
   );
   internal_error_response()
}
