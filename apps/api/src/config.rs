//! # アプリケーション設定
//!
//! 環境変数からアプリケーション設定を読み込む。
//!
//! 設定は起動時に一度だけ構築し、ハンドラの State に注入する。
//! ハンドラがリクエスト処理中に環境変数を直接読むことはない。
//!
//! ## 環境変数一覧
//!
//! | 変数名 | 必須 | デフォルト | 説明 |
//! |--------|------|------------|------|
//! | `API_HOST` | No | `0.0.0.0` | バインドアドレス |
//! | `API_PORT` | No | `8000` | ポート番号 |
//! | `OPENAI_API_KEY` | No | - | Completion API の認証キー（未設定時はリクエストごとに 500） |
//! | `OPENAI_BASE_URL` | No | `https://api.openai.com` | Completion API のベース URL |
//! | `OPENAI_MODEL` | No | `gpt-4o-mini` | 使用するモデル |
//! | `UPSTREAM_TIMEOUT_SECS` | No | `30` | 外部 API 呼び出しのタイムアウト（秒） |
//! | `REQUIRE_AUTH` | No | `false` | Bearer トークンによる認証を必須にする |
//! | `SUPABASE_URL` | No | - | 認証サービスのベース URL |
//! | `SUPABASE_ANON_KEY` | No | - | 認証サービスの匿名アクセスキー |
//!
//! 認証キー類が欠けていても起動は失敗しない。欠落はリクエスト処理時に
//! 500 として報告される。値の形式が不正な場合のみ起動時にエラーとする。

use std::{env, fmt, time::Duration};

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// 設定読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
   #[error("API_PORT は有効なポート番号である必要があります: {0:?}")]
   InvalidPort(String),

   #[error("UPSTREAM_TIMEOUT_SECS は 1 以上の整数である必要があります: {0:?}")]
   InvalidTimeout(String),
}

/// Completion API（OpenAI 互換）の設定
#[derive(Clone)]
pub struct CompletionConfig {
   /// 認証キー（未設定なら `None`）
   pub api_key:  Option<String>,
   /// ベース URL（末尾の `/` は除去済み）
   pub base_url: String,
   /// モデル名
   pub model:    String,
}

impl fmt::Debug for CompletionConfig {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("CompletionConfig")
         .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
         .field("base_url", &self.base_url)
         .field("model", &self.model)
         .finish()
   }
}

/// 認証サービスの設定
#[derive(Clone)]
pub struct IdentityConfig {
   /// Bearer トークンによる認証を必須にするか
   pub require_auth: bool,
   /// 認証サービスのベース URL
   pub url:          Option<String>,
   /// 匿名アクセスキー
   pub anon_key:     Option<String>,
}

impl fmt::Debug for IdentityConfig {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("IdentityConfig")
         .field("require_auth", &self.require_auth)
         .field("url", &self.url)
         .field("anon_key", &self.anon_key.as_ref().map(|_| "<redacted>"))
         .finish()
   }
}

/// アプリケーション全体の設定
#[derive(Debug, Clone)]
pub struct ApiConfig {
   /// バインドアドレス
   pub host:             String,
   /// ポート番号
   pub port:             u16,
   /// 外部 API 呼び出しのタイムアウト
   pub upstream_timeout: Duration,
   pub completion:       CompletionConfig,
   pub identity:         IdentityConfig,
}

impl ApiConfig {
   /// 環境変数から設定を読み込む
   pub fn from_env() -> Result<Self, ConfigError> {
      Self::from_lookup(|key| env::var(key).ok())
   }

   /// 任意の参照関数から設定を読み込む
   ///
   /// テストではプロセスの環境変数を書き換えずに `HashMap` などを渡す。
   /// 空文字列の値は未設定として扱う。
   pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
   where
      F: Fn(&str) -> Option<String>,
   {
      let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

      let port = match get("API_PORT") {
         Some(raw) => parse_port(&raw)?,
         None => DEFAULT_PORT,
      };
      let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
         Some(raw) => parse_timeout(&raw)?,
         None => Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
      };

      Ok(Self {
         host: get("API_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
         port,
         upstream_timeout,
         completion: CompletionConfig {
            api_key:  get("OPENAI_API_KEY"),
            base_url: trim_base_url(
               &get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ),
            model:    get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
         },
         identity: IdentityConfig {
            require_auth: get("REQUIRE_AUTH").is_some_and(|v| parse_flag(&v)),
            url:          get("SUPABASE_URL").map(|v| trim_base_url(&v)),
            anon_key:     get("SUPABASE_ANON_KEY"),
         },
      })
   }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
   raw.trim()
      .parse()
      .map_err(|_| ConfigError::InvalidPort(raw.to_string()))
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
   match raw.trim().parse::<u64>() {
      Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
      _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
   }
}

fn parse_flag(raw: &str) -> bool {
   raw.trim().eq_ignore_ascii_case("true")
}

fn trim_base_url(raw: &str) -> String {
   raw.trim().trim_end_matches('/').to_string()
}
