//! 1 接続ぶんのリクエスト処理
//!
//! デコード → パース → ハンドラー → エンコード → 送信 を 1 回だけ行う。
//! Keep-Alive はしない。処理が終わったら接続は閉じる。
//!
//! 終端失敗 (ParseFailed / InvalidRequest / EncodeFailed / SendFailed) では、デフォルトでは
//! クライアントに何も送らずに接続を閉じる。クライアントからは接続が閉じられた
//! ことしか分からない。`FailurePolicy::ErrorResponse` を設定すると、
//! 400 / 500 の最小限のレスポンスを送る。
//!
//! I/O を伴うのは `decode()` と `complete()` だけで、間の `parse()` /
//! `encode()` は I/O を持たない。非同期ランタイムからはこの 2 つを直接使い、
//! 間でハンドラーを await する。

use std::io::{Read, Write};

use crate::config::{Config, FailurePolicy};
use crate::decoder::{Decoded, StreamDecoder};
use crate::encoder::ResponseEncoder;
use crate::error::Error;
use crate::parser::parse_request;
use crate::request::Request;
use crate::response::Response;
use crate::status::StatusRegistry;

/// 処理フェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// ストリームから読み込み中
    Decoding,
    /// ヘッダーブロックをパース中
    Parsing,
    /// ハンドラーを実行中
    Handling,
    /// レスポンスをエンコード中
    Encoding,
    /// 書き込み中
    Sending,
    /// 完了
    Done,
    /// ヘッダーブロックを 1 バイトも読めなかった
    ParseFailed,
    /// リクエストが不正
    InvalidRequest,
    /// レスポンスをエンコードできなかった
    EncodeFailed,
    /// 書き込みがエラーになった
    SendFailed,
}

impl CyclePhase {
    /// 終端状態か
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CyclePhase::Done
                | CyclePhase::ParseFailed
                | CyclePhase::InvalidRequest
                | CyclePhase::EncodeFailed
                | CyclePhase::SendFailed
        )
    }
}

/// リクエストハンドラー
pub trait Handler {
    /// リクエストを処理してレスポンスを返す
    fn handle(&self, request: Request) -> Response;
}

/// 関数からハンドラーを作成
impl<F> Handler for F
where
    F: Fn(Request) -> Response,
{
    fn handle(&self, request: Request) -> Response {
        (self)(request)
    }
}

/// 書き込み結果
///
/// 1 回だけ書き込みを行い、書けなかった分の再送はしない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transmission {
    /// 書き込めたバイト数
    pub written: usize,
    /// 書き込もうとしたバイト数
    pub expected: usize,
    /// flush まで成功したか
    ///
    /// flush に失敗しても `written` は書き込めた分のまま残す。
    pub flushed: bool,
}

impl Transmission {
    /// 一部しか書き込めなかったか
    pub fn is_partial(&self) -> bool {
        self.written < self.expected
    }
}

/// パースまたはエンコードが失敗した場合の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// 終端フェーズ
    pub phase: CyclePhase,
    /// 原因
    pub error: Error,
    /// 送るべきエラーレスポンス (`FailurePolicy::SilentDrop` の場合は常に `None`)
    pub reply: Option<Vec<u8>>,
}

/// 1 接続ぶんの処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// レスポンスを書き込んだ
    Done(Transmission),
    /// 終端失敗
    Failed {
        phase: CyclePhase,
        error: Error,
        /// エラーレスポンスの書き込み結果
        ///
        /// 送るべきエラーレスポンスがなかった場合は `None`。
        reply: Option<Result<Transmission, Error>>,
    },
}

impl CycleOutcome {
    /// 最終フェーズ
    pub fn phase(&self) -> CyclePhase {
        match self {
            CycleOutcome::Done(_) => CyclePhase::Done,
            CycleOutcome::Failed { phase, .. } => *phase,
        }
    }
}

/// リクエスト処理
///
/// 接続をまたいで持つ状態は設定とステータス表 (読み取り専用) だけ。
#[derive(Debug, Clone, Copy)]
pub struct RequestCycle<'a> {
    config: &'a Config,
    registry: &'a StatusRegistry,
}

impl<'a> RequestCycle<'a> {
    pub fn new(config: &'a Config, registry: &'a StatusRegistry) -> Self {
        Self { config, registry }
    }

    /// 1 接続を最後まで処理する (ブロッキング)
    pub fn run<S, H>(&self, stream: &mut S, handler: &H) -> CycleOutcome
    where
        S: Read + Write,
        H: Handler,
    {
        let decoded = self.decode(stream);
        self.complete(stream, decoded, handler)
    }

    /// Decoding: ストリームから読み込む
    pub fn decode<R: Read>(&self, reader: &mut R) -> Decoded {
        StreamDecoder::read_from(reader, self.config.max_request_size)
    }

    /// Parsing 以降を処理して書き込む
    pub fn complete<W, H>(&self, writer: &mut W, decoded: Decoded, handler: &H) -> CycleOutcome
    where
        W: Write,
        H: Handler,
    {
        match self.respond(decoded, handler) {
            Ok(bytes) => match send(writer, &bytes) {
                Ok(transmission) => CycleOutcome::Done(transmission),
                Err(error) => CycleOutcome::Failed {
                    phase: CyclePhase::SendFailed,
                    error,
                    reply: None,
                },
            },
            Err(rejection) => {
                let reply = rejection.reply.map(|bytes| send(writer, &bytes));
                CycleOutcome::Failed {
                    phase: rejection.phase,
                    error: rejection.error,
                    reply,
                }
            }
        }
    }

    /// Parsing → Handling → Encoding
    ///
    /// 送信するバイト列を返す。I/O は行わない。
    pub fn respond<H: Handler>(&self, decoded: Decoded, handler: &H) -> Result<Vec<u8>, Rejection> {
        let request = self.parse(decoded)?;
        let response = handler.handle(request);
        self.encode(&response)
    }

    /// Parsing: デコード結果から `Request` を作る
    ///
    /// ボディはデコーダーが区切りの後ろに見つけた分をそのまま使う。
    pub fn parse(&self, decoded: Decoded) -> Result<Request, Rejection> {
        let Decoded { header, body, .. } = decoded;

        let Some(header) = header else {
            return Err(Rejection {
                phase: CyclePhase::ParseFailed,
                error: Error::StreamReadFailure,
                reply: None,
            });
        };

        let mut request = parse_request(&header).map_err(|error| Rejection {
            phase: CyclePhase::InvalidRequest,
            error,
            reply: self.error_reply(400, "HTTP/1.1"),
        })?;
        request.body = body;
        Ok(request)
    }

    /// Encoding: 送信するバイト列を作る
    pub fn encode(&self, response: &Response) -> Result<Vec<u8>, Rejection> {
        ResponseEncoder::new(self.registry, self.config.max_response_size)
            .encode(response)
            .map_err(|error| Rejection {
                phase: CyclePhase::EncodeFailed,
                error,
                reply: self.error_reply(500, &response.http_version),
            })
    }

    /// 設定を取得
    pub fn config(&self) -> &Config {
        self.config
    }

    fn error_reply(&self, status_code: u16, http_version: &str) -> Option<Vec<u8>> {
        match self.config.failure_policy {
            FailurePolicy::SilentDrop => None,
            FailurePolicy::ErrorResponse => {
                let response = Response::with_version(http_version, status_code);
                ResponseEncoder::new(self.registry, self.config.max_response_size)
                    .encode(&response)
                    .ok()
            }
        }
    }
}

/// 1 回だけ書き込む
///
/// write 自体のエラーだけを `Error::WriteFailure` とする。flush の失敗は
/// `Transmission::flushed` で返す。
fn send<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<Transmission, Error> {
    let written = writer
        .write(bytes)
        .map_err(|e| Error::WriteFailure(e.to_string()))?;
    let flushed = writer.flush().is_ok();
    Ok(Transmission {
        written,
        expected: bytes.len(),
        flushed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(header: Option<&str>, body: Option<&[u8]>) -> Decoded {
        let mut data = Vec::new();
        if let Some(header) = header {
            data.extend_from_slice(header.as_bytes());
            if let Some(body) = body {
                data.extend_from_slice(b"\r\n\r\n");
                data.extend_from_slice(body);
            }
        }
        let mut decoder = StreamDecoder::new(8192);
        decoder.feed(&data);
        decoder.finish()
    }

    fn hello(request: Request) -> Response {
        Response::with_version(&request.http_version, 200).body(b"hello".to_vec())
    }

    #[test]
    fn respond_echoes_version() {
        let config = Config::default();
        let registry = StatusRegistry::default();
        let cycle = RequestCycle::new(&config, &registry);

        let bytes = cycle
            .respond(decoded(Some("GET / HTTP/1.0"), Some(b"")), &hello)
            .unwrap();
        assert!(bytes.starts_with(b"HTTP/1.0 200 OK\r\n"));
    }

    #[test]
    fn respond_passes_body() {
        let config = Config::default();
        let registry = StatusRegistry::default();
        let cycle = RequestCycle::new(&config, &registry);

        let echo = |request: Request| Response::new(200).body(request.body.unwrap_or_default());
        let bytes = cycle
            .respond(decoded(Some("POST / HTTP/1.1"), Some(b"abc")), &echo)
            .unwrap();
        assert!(bytes.ends_with(b"\r\n\r\nabc"));
    }

    #[test]
    fn nothing_read() {
        let config = Config::default().failure_policy(FailurePolicy::ErrorResponse);
        let registry = StatusRegistry::default();
        let cycle = RequestCycle::new(&config, &registry);

        let rejection = cycle.respond(decoded(None, None), &hello).unwrap_err();
        assert_eq!(rejection.phase, CyclePhase::ParseFailed);
        assert_eq!(rejection.error, Error::StreamReadFailure);
        // 相手がいないので返信しない
        assert_eq!(rejection.reply, None);
    }

    #[test]
    fn invalid_request_silent_drop() {
        let config = Config::default();
        let registry = StatusRegistry::default();
        let cycle = RequestCycle::new(&config, &registry);

        let rejection = cycle
            .respond(decoded(Some("ONLYONEWORD"), Some(b"")), &hello)
            .unwrap_err();
        assert_eq!(rejection.phase, CyclePhase::InvalidRequest);
        assert!(matches!(rejection.error, Error::MalformedRequest(_)));
        assert_eq!(rejection.reply, None);
    }

    #[test]
    fn invalid_request_error_response() {
        let config = Config::default().failure_policy(FailurePolicy::ErrorResponse);
        let registry = StatusRegistry::default();
        let cycle = RequestCycle::new(&config, &registry);

        let rejection = cycle
            .respond(decoded(Some("ONLYONEWORD"), Some(b"")), &hello)
            .unwrap_err();
        assert_eq!(
            rejection.reply.as_deref(),
            Some(
                &b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"[..]
            )
        );
    }

    #[test]
    fn encode_failed() {
        let config = Config::default().failure_policy(FailurePolicy::ErrorResponse);
        let registry = StatusRegistry::default();
        let cycle = RequestCycle::new(&config, &registry);

        let teapot = |_: Request| Response::new(418);
        let rejection = cycle
            .respond(decoded(Some("GET / HTTP/1.1"), Some(b"")), &teapot)
            .unwrap_err();
        assert_eq!(rejection.phase, CyclePhase::EncodeFailed);
        assert_eq!(rejection.error, Error::UnknownStatusCode(418));
        assert!(
            rejection
                .reply
                .unwrap()
                .starts_with(b"HTTP/1.1 500 Internal Server Error\r\n")
        );
    }

    #[test]
    fn error_reply_requires_registered_code() {
        let config = Config::default().failure_policy(FailurePolicy::ErrorResponse);
        let registry = StatusRegistry::new().with(200, "OK");
        let cycle = RequestCycle::new(&config, &registry);

        let rejection = cycle
            .respond(decoded(Some("BROKEN"), Some(b"")), &hello)
            .unwrap_err();
        assert_eq!(rejection.reply, None);
    }

    #[test]
    fn terminal_phases() {
        assert!(CyclePhase::Done.is_terminal());
        assert!(CyclePhase::ParseFailed.is_terminal());
        assert!(CyclePhase::InvalidRequest.is_terminal());
        assert!(CyclePhase::EncodeFailed.is_terminal());
        assert!(CyclePhase::SendFailed.is_terminal());
        assert!(!CyclePhase::Decoding.is_terminal());
        assert!(!CyclePhase::Sending.is_terminal());
    }

    /// write も flush も失敗するライター
    struct BrokenWriter {
        fail_write: bool,
        written: Vec<u8>,
    }

    impl Write for BrokenWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.fail_write {
                return Err(std::io::Error::other("broken pipe"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("flush failed"))
        }
    }

    #[test]
    fn flush_failure_keeps_written() {
        let mut writer = BrokenWriter {
            fail_write: false,
            written: Vec::new(),
        };
        let transmission = send(&mut writer, b"HTTP/1.1 200 OK\r\n\r\n").unwrap();
        assert_eq!(transmission.written, 19);
        assert_eq!(transmission.expected, 19);
        assert!(!transmission.flushed);
        assert!(!transmission.is_partial());
    }

    #[test]
    fn error_reply_write_failure_is_kept() {
        let config = Config::default().failure_policy(FailurePolicy::ErrorResponse);
        let registry = StatusRegistry::default();
        let cycle = RequestCycle::new(&config, &registry);

        let mut writer = BrokenWriter {
            fail_write: true,
            written: Vec::new(),
        };
        let outcome = cycle.complete(
            &mut writer,
            decoded(Some("ONLYONEWORD"), Some(b"")),
            &hello,
        );
        let CycleOutcome::Failed { phase, reply, .. } = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(phase, CyclePhase::InvalidRequest);
        assert!(matches!(reply, Some(Err(Error::WriteFailure(_)))));
    }
}
