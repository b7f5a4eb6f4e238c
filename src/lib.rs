//! # mini_http11
//!
//! 1 接続で 1 リクエストだけを処理する HTTP/1.1 メッセージプロセッサー
//!
//! ## 特徴
//!
//! - **依存なし**: 標準ライブラリのみ使用
//! - **Sans I/O**: デコーダー、パーサー、エンコーダーは I/O を持たない
//! - **1 リクエスト 1 接続**: Keep-Alive、chunked、TLS は扱わない
//!
//! ## 処理の流れ
//!
//! ```text
//! bytes → StreamDecoder → parse_request → Request
//!       → Handler → Response → ResponseEncoder → bytes
//! ```
//!
//! ## 使い方
//!
//! ```rust
//! use std::io::{Read, Write};
//!
//! use mini_http11::{Config, CycleOutcome, Request, RequestCycle, Response, StatusRegistry};
//!
//! struct Loopback {
//!     input: std::io::Cursor<Vec<u8>>,
//!     output: Vec<u8>,
//! }
//!
//! impl Read for Loopback {
//!     fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
//!         self.input.read(buf)
//!     }
//! }
//!
//! impl Write for Loopback {
//!     fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
//!         self.output.write(buf)
//!     }
//!     fn flush(&mut self) -> std::io::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let config = Config::default();
//! let registry = StatusRegistry::default();
//! let cycle = RequestCycle::new(&config, &registry);
//!
//! let mut stream = Loopback {
//!     input: std::io::Cursor::new(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n".to_vec()),
//!     output: Vec::new(),
//! };
//! let handler = |request: Request| {
//!     Response::with_version(&request.http_version, 200).body(b"hi".to_vec())
//! };
//! let outcome = cycle.run(&mut stream, &handler);
//!
//! assert!(matches!(outcome, CycleOutcome::Done(_)));
//! assert_eq!(
//!     stream.output,
//!     b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nhi"
//! );
//! ```

mod config;
mod cycle;
mod decoder;
mod encoder;
mod error;
mod headers;
mod parser;
mod request;
mod response;
mod status;

pub use config::{Config, FailurePolicy};
pub use cycle::{CycleOutcome, CyclePhase, Handler, Rejection, RequestCycle, Transmission};
pub use decoder::{DecodeStatus, Decoded, READ_BUFFER_SIZE, StreamDecoder};
pub use encoder::{ResponseEncoder, encode_response};
pub use error::Error;
pub use headers::HeaderList;
pub use parser::parse_request;
pub use request::Request;
pub use response::Response;
pub use status::StatusRegistry;
