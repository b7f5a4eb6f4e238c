//! HTTP サーバーの例
//!
//! すべてのリクエストに同じ HTML を返す。1 接続ずつ順番に処理し、
//! レスポンスを送ったら接続を閉じる。
//!
//! 使い方:
//!   # tokio で起動 (ポート 8080)
//!   cargo run -p mini_http11_server
//!
//!   # 標準ライブラリのブロッキング I/O で起動
//!   cargo run -p mini_http11_server -- --blocking
//!
//!   # 不正なリクエストに 400 を返す
//!   cargo run -p mini_http11_server -- --error-response
//!
//! ログの詳細度は RUST_LOG で変更できる (デフォルト: info)。

use std::net::TcpListener;

use mini_http11::{Config, FailurePolicy, Request, RequestCycle, Response, StatusRegistry};
use tokio_mini_http11::{Server, log_outcome};
use tracing_subscriber::EnvFilter;

const BODY: &[u8] = b"<html><body><h4>Hello</h4></body></html>";

struct ServerOptions {
    port: u16,
    blocking: bool,
    config: Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = parse_args()?;
    options.config.validate()?;

    let addr = format!("0.0.0.0:{}", options.port);

    if options.blocking {
        serve_blocking(&addr, &options.config)
    } else {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(async {
            let server = Server::bind(&addr).await?.config(options.config)?;
            server
                .serve(|request: Request| async move { hello(request) })
                .await
        })?;
        Ok(())
    }
}

fn parse_args() -> Result<ServerOptions, Box<dyn std::error::Error>> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "mini_http11_server";

    // --help フラグ
    noargs::HELP_FLAG.take_help(&mut args);

    // --version フラグ
    let version_flag: bool = noargs::flag("version")
        .short('V')
        .doc("Show version")
        .take(&mut args)
        .is_present();
    if version_flag {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    // --blocking フラグ
    let blocking: bool = noargs::flag("blocking")
        .doc("Use blocking std::net I/O instead of tokio")
        .take(&mut args)
        .is_present();

    // --error-response フラグ
    let error_response: bool = noargs::flag("error-response")
        .doc("Reply 400/500 on failure instead of closing silently")
        .take(&mut args)
        .is_present();

    // --port オプション
    let port: u16 = noargs::opt("port")
        .short('p')
        .doc("Port to listen on")
        .default("8080")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // --max-request-size オプション
    let max_request_size: usize = noargs::opt("max-request-size")
        .doc("Maximum bytes buffered for a request")
        .default("8192")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // --max-response-size オプション
    let max_response_size: usize = noargs::opt("max-response-size")
        .doc("Maximum encoded response size in bytes")
        .default("8192")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        std::process::exit(0);
    }

    let failure_policy = if error_response {
        FailurePolicy::ErrorResponse
    } else {
        FailurePolicy::SilentDrop
    };

    Ok(ServerOptions {
        port,
        blocking,
        config: Config {
            max_request_size,
            max_response_size,
            failure_policy,
        },
    })
}

fn serve_blocking(addr: &str, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr)?;
    tracing::info!(addr = %listener.local_addr()?, "listening (blocking)");

    let registry = StatusRegistry::default();
    let cycle = RequestCycle::new(config, &registry);

    loop {
        let (mut stream, peer_addr) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                continue;
            }
        };

        let decoded = cycle.decode(&mut stream);
        if let Some(e) = decoded.overflow() {
            tracing::warn!(%peer_addr, error = %e, "header boundary not found, using whole buffer");
        }
        let outcome = cycle.complete(&mut stream, decoded, &hello);
        log_outcome(peer_addr, &outcome);
        // stream を drop して接続を閉じる
    }
}

fn hello(request: Request) -> Response {
    display_request_details(&request);
    Response::with_version(&request.http_version, 200).body(BODY.to_vec())
}

fn display_request_details(request: &Request) {
    tracing::info!(
        "Resource requested: {} {} {}",
        request.method,
        request.path,
        request.http_version
    );
    for (name, value) in request.headers.iter() {
        tracing::debug!("  - {}: {}", name, value);
    }
    if let Some(body) = &request.body {
        tracing::debug!(bytes = body.len(), "body: {}", String::from_utf8_lossy(body));
    }
}
