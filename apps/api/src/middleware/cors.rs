//! # CORS ミドルウェア
//!
//! ブラウザから直接呼び出せるよう、全レスポンス（エラー・404・405 を含む）に
//! 許可的な CORS ヘッダーを付与する。
//!
//! `OPTIONS`（プリフライト）はルーティングやハンドラに渡さず、
//! その場で `200 "ok"` を返す。

use axum::{
   extract::Request,
   http::{HeaderMap, HeaderValue, Method, StatusCode, header},
   middleware::Next,
   response::{IntoResponse, Response},
};

/// `Access-Control-Allow-Origin`
pub const ALLOW_ORIGIN: &str = "*";
/// `Access-Control-Allow-Headers`
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
/// `Access-Control-Allow-Methods`
pub const ALLOW_METHODS: &str = "POST, OPTIONS";

/// プリフライトに応答し、それ以外のレスポンスに CORS ヘッダーを付与する
pub async fn cors(request: Request, next: Next) -> Response {
   if request.method() == Method::OPTIONS {
      let mut response = (StatusCode::OK, "ok").into_response();
      apply_cors_headers(response.headers_mut());
      return response;
   }

   let mut response = next.run(request).await;
   apply_cors_headers(response.headers_mut());
   response
}

fn apply_cors_headers(headers: &mut HeaderMap) {
   headers.insert(
      header::ACCESS_CONTROL_ALLOW_ORIGIN,
      HeaderValue::from_static(ALLOW_ORIGIN),
   );
   headers.insert(
      header::ACCESS_CONTROL_ALLOW_HEADERS,
      HeaderValue::from_static(ALLOW_HEADERS),
   );
   headers.insert(
      header::ACCESS_CONTROL_ALLOW_METHODS,
      HeaderValue::from_static(ALLOW_METHODS),
   );
}
