//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! - 各ハンドラはサブモジュールに配置し、ここで re-export する
//! - ハンドラは薄く保ち、解析そのものは Completion API に委譲する
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック
//! - `parse_workout`: ワークアウトテキストの解析

pub mod health;
pub mod parse_workout;

pub use health::health_check;
pub use parse_workout::{
   AuthMode,
   MAX_BODY_BYTES,
   ParseWorkoutState,
   method_not_allowed,
   parse_workout,
};
