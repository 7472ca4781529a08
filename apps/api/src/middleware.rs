//! # ミドルウェア
//!
//! ワークアウト解析 API 用のミドルウェアを提供する。

pub mod cors;

pub use cors::cors;
