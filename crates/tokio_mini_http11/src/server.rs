//! HTTP サーバー
//!
//! tokio を使用した HTTP サーバー。接続は 1 つずつ順番に処理する。
//! 1 接続の処理 (読み込み → ハンドラー → 書き込み) が終わるまで、
//! 次の接続は受け付けない。
//!
//! 読み込みにタイムアウトはない。何も送らないクライアントがいると
//! サーバー全体が止まる。
//!
//! ## 使い方
//!
//! ```ignore
//! use tokio_mini_http11::{Config, FailurePolicy, Server};
//!
//! let server = Server::bind("0.0.0.0:8080")
//!     .await?
//!     .config(Config::default().failure_policy(FailurePolicy::ErrorResponse))?;
//! server.serve(handler).await?;
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use mini_http11::{
    Config, CycleOutcome, CyclePhase, Decoded, READ_BUFFER_SIZE, Rejection, Request, RequestCycle,
    Response, StatusRegistry, StreamDecoder, Transmission,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::Instrument;

use crate::error::Result;

/// HTTP リクエストハンドラー
pub trait Handler: Send + Sync + 'static {
    /// リクエストを処理してレスポンスを返す
    fn handle(&self, request: Request) -> impl Future<Output = Response> + Send;
}

/// 関数からハンドラーを作成
impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send,
{
    fn handle(&self, request: Request) -> impl Future<Output = Response> + Send {
        (self)(request)
    }
}

/// HTTP サーバー
pub struct Server {
    listener: TcpListener,
    config: Config,
    registry: Arc<StatusRegistry>,
}

impl Server {
    /// 指定アドレスにバインド
    pub async fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");
        Ok(Self {
            listener,
            config: Config::default(),
            registry: Arc::new(StatusRegistry::default()),
        })
    }

    /// 処理設定を指定
    pub fn config(mut self, config: Config) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// ステータス表を指定
    ///
    /// 以降は読み取り専用で共有される。
    pub fn registry(mut self, registry: StatusRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// ローカルアドレスを取得
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// サーバーを起動
    ///
    /// accept に失敗した場合のみ戻る。
    pub async fn serve<H: Handler>(self, handler: H) -> Result<()> {
        loop {
            let (stream, peer_addr) = self.listener.accept().await.inspect_err(|e| {
                tracing::error!(error = %e, "accept failed");
            })?;
            self.handle_connection(stream, peer_addr, &handler).await;
        }
    }

    /// 単一の接続を処理 (テスト用)
    pub async fn handle_one<H: Handler>(self, handler: H) -> Result<CycleOutcome> {
        let (stream, peer_addr) = self.listener.accept().await?;
        Ok(self.handle_connection(stream, peer_addr, &handler).await)
    }

    async fn handle_connection<H: Handler>(
        &self,
        mut stream: TcpStream,
        peer_addr: SocketAddr,
        handler: &H,
    ) -> CycleOutcome {
        let span = tracing::debug_span!("connection", %peer_addr);
        let outcome = serve_connection(&mut stream, &self.config, &self.registry, handler)
            .instrument(span)
            .await;
        log_outcome(peer_addr, &outcome);

        // Connection: close
        if let Err(e) = stream.shutdown().await {
            tracing::debug!(%peer_addr, error = %e, "shutdown failed");
        }
        outcome
    }
}

/// 1 接続を処理
///
/// 読み込み → パース → ハンドラー → エンコード → 書き込み を 1 回だけ行う。
/// 書き込みは 1 回だけで、書けなかった分の再送はしない。
pub async fn serve_connection<S, H>(
    stream: &mut S,
    config: &Config,
    registry: &StatusRegistry,
    handler: &H,
) -> CycleOutcome
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: Handler,
{
    let cycle = RequestCycle::new(config, registry);

    let decoded = read_decoded(stream, config.max_request_size).await;
    if let Some(e) = decoded.overflow() {
        tracing::warn!(error = %e, "header boundary not found, using whole buffer");
    }

    let request = match cycle.parse(decoded) {
        Ok(request) => request,
        Err(rejection) => return reject(stream, rejection).await,
    };
    tracing::debug!(
        method = %request.method,
        path = %request.path,
        version = %request.http_version,
        headers = request.headers.len(),
        body = request.body_len(),
        "request parsed"
    );

    let response = handler.handle(request).await;

    let bytes = match cycle.encode(&response) {
        Ok(bytes) => bytes,
        Err(rejection) => return reject(stream, rejection).await,
    };

    match send(stream, &bytes).await {
        Ok(transmission) => CycleOutcome::Done(transmission),
        Err(error) => CycleOutcome::Failed {
            phase: CyclePhase::SendFailed,
            error,
            reply: None,
        },
    }
}

/// 区切りを見つけるか、上限に達するか、読み込みが 0 バイトかエラーを返すまで読む
async fn read_decoded<R: AsyncRead + Unpin>(reader: &mut R, max_request_size: usize) -> Decoded {
    let mut decoder = StreamDecoder::new(max_request_size);
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    while !decoder.is_ready() {
        let want = decoder.remaining_capacity().min(buf.len());
        match reader.read(&mut buf[..want]).await {
            Ok(0) => break,
            Ok(n) => {
                decoder.feed(&buf[..n]);
            }
            Err(e) => {
                tracing::debug!(error = %e, "read failed");
                break;
            }
        }
    }

    decoder.finish()
}

async fn reject<W: AsyncWrite + Unpin>(writer: &mut W, rejection: Rejection) -> CycleOutcome {
    let reply = match rejection.reply {
        Some(bytes) => Some(send(writer, &bytes).await),
        None => None,
    };
    CycleOutcome::Failed {
        phase: rejection.phase,
        error: rejection.error,
        reply,
    }
}

async fn send<W: AsyncWrite + Unpin>(
    writer: &mut W,
    bytes: &[u8],
) -> std::result::Result<Transmission, mini_http11::Error> {
    let written = writer
        .write(bytes)
        .await
        .map_err(|e| mini_http11::Error::WriteFailure(e.to_string()))?;
    let flushed = writer
        .flush()
        .await
        .inspect_err(|e| tracing::debug!(error = %e, "flush failed"))
        .is_ok();
    Ok(Transmission {
        written,
        expected: bytes.len(),
        flushed,
    })
}

/// 接続ごとの処理結果をログに出力
pub fn log_outcome(peer_addr: SocketAddr, outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Done(transmission) if transmission.is_partial() || !transmission.flushed => {
            tracing::warn!(
                %peer_addr,
                written = transmission.written,
                expected = transmission.expected,
                flushed = transmission.flushed,
                "not all bytes sent"
            );
        }
        CycleOutcome::Done(transmission) => {
            tracing::info!(%peer_addr, bytes = transmission.written, "response sent");
        }
        CycleOutcome::Failed {
            phase,
            error,
            reply,
        } => {
            let replied = match reply {
                Some(Ok(transmission)) => transmission.written > 0,
                Some(Err(e)) => {
                    tracing::warn!(%peer_addr, error = %e, "error response not sent");
                    false
                }
                None => false,
            };
            tracing::warn!(
                %peer_addr,
                ?phase,
                %error,
                replied,
                "connection dropped"
            );
        }
    }
}
