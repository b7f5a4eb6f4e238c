//! tokio_mini_http11 - Tokio integration for mini_http11
//!
//! tokio を使用した HTTP/1.1 サーバー。
//!
//! ## 特徴
//!
//! - **mini_http11 ベース**: Sans I/O のデコーダー / パーサー / エンコーダーを使う
//! - **逐次処理**: 1 接続を最後まで処理してから次の接続を受け付ける
//! - **1 リクエスト 1 接続**: レスポンスを送ったら接続を閉じる
//! - **tracing**: 接続ごとの結果を tracing で出力する
//!
//! ## サーバー
//!
//! ```ignore
//! use tokio_mini_http11::{Server, Request, Response};
//!
//! async fn handler(request: Request) -> Response {
//!     Response::with_version(&request.http_version, 200)
//!         .header("Content-Type", "text/plain")
//!         .body(b"Hello, World!".to_vec())
//! }
//!
//! let server = Server::bind("0.0.0.0:8080").await?;
//! server.serve(handler).await?;
//! ```

pub mod error;
pub mod server;

pub use error::{Error, Result};
pub use server::{Handler, Server, log_outcome, serve_connection};

// mini_http11 の型を re-export
pub use mini_http11::{
    Config, CycleOutcome, CyclePhase, FailurePolicy, Request, Response, StatusRegistry,
};
