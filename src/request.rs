use crate::headers::HeaderList;

/// HTTP リクエスト
///
/// `parse_request()` が成功した場合にのみ作られる。
/// 途中までパースされた状態のリクエストは存在しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP メソッド (空ではない)
    pub method: String,
    /// リクエストパス (空ではない)
    pub path: String,
    /// HTTP バージョン (HTTP/1.1 等)
    pub http_version: String,
    /// ヘッダー (到着順)
    pub headers: HeaderList,
    /// ボディ
    ///
    /// 区切りを見つけた時点でバッファに溜まっていた分だけを持つ。
    /// Content-Length は参照しないので、後から届いたバイトは含まれない。
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// 新しいリクエストを作成 (HTTP/1.1)
    pub fn new(method: &str, path: &str) -> Self {
        Self::with_version(method, path, "HTTP/1.1")
    }

    /// カスタムバージョンでリクエストを作成
    pub fn with_version(method: &str, path: &str, http_version: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            http_version: http_version.to_string(),
            headers: HeaderList::new(),
            body: None,
        }
    }

    /// ヘッダーを追加 (ビルダーパターン)
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push(name, value);
        self
    }

    /// ボディを設定 (ビルダーパターン)
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// ボディの長さ (ボディなしは 0)
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, |b| b.len())
    }
}
