use crate::error::Error;
use crate::response::Response;
use crate::status::StatusRegistry;

/// レスポンスエンコーダー
///
/// リーズンフレーズを `StatusRegistry` から引き、送信するバイト列を組み立てる。
/// `Response` は変更しないので、何度エンコードしても同じ結果になる。
///
/// ```rust
/// use mini_http11::{Response, ResponseEncoder, StatusRegistry};
///
/// let registry = StatusRegistry::default();
/// let encoder = ResponseEncoder::new(&registry, 8192);
/// let bytes = encoder.encode(&Response::new(200).body(b"hi".to_vec())).unwrap();
/// assert_eq!(
///     bytes,
///     b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nhi"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ResponseEncoder<'a> {
    registry: &'a StatusRegistry,
    max_response_size: usize,
}

impl<'a> ResponseEncoder<'a> {
    /// 新しいエンコーダーを作成
    pub fn new(registry: &'a StatusRegistry, max_response_size: usize) -> Self {
        Self {
            registry,
            max_response_size,
        }
    }

    /// レスポンスをエンコード
    pub fn encode(&self, response: &Response) -> Result<Vec<u8>, Error> {
        encode_response(response, self.registry, self.max_response_size)
    }
}

/// レスポンスをエンコード
///
/// - ステータスコードが未登録なら `Error::UnknownStatusCode`
/// - 呼び出し側のヘッダーの後ろに `Content-Length` と `Connection: close` を付与する
/// - エンコード後の長さが `max_response_size` 以上なら `Error::ResponseTooLarge`
///
/// 失敗した場合は何も出力しない。
pub fn encode_response(
    response: &Response,
    registry: &StatusRegistry,
    max_response_size: usize,
) -> Result<Vec<u8>, Error> {
    let reason = registry
        .lookup(response.status_code)
        .ok_or(Error::UnknownStatusCode(response.status_code))?;

    check_field("http_version", &response.http_version)?;
    for (name, value) in response.headers.iter() {
        check_field("header name", name)?;
        check_field("header value", value)?;
    }

    let content_length = response.body.len().to_string();
    let implicit = [
        ("Content-Length", content_length.as_str()),
        ("Connection", "close"),
    ];

    let mut buf = Vec::new();

    // Status line: VERSION SP STATUS-CODE SP REASON-PHRASE CRLF
    buf.extend_from_slice(response.http_version.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(response.status_code.to_string().as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(reason.as_bytes());
    buf.extend_from_slice(b"\r\n");

    // Headers
    for (name, value) in response.headers.iter().chain(implicit) {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // End of headers
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(&response.body);

    if buf.len() >= max_response_size {
        return Err(Error::ResponseTooLarge {
            size: buf.len(),
            limit: max_response_size,
        });
    }

    Ok(buf)
}

fn check_field(kind: &str, value: &str) -> Result<(), Error> {
    if value.contains('\r') || value.contains('\n') {
        return Err(Error::InvalidField(format!("{} contains CR/LF", kind)));
    }
    Ok(())
}
