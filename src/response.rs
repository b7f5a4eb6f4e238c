use crate::headers::HeaderList;

/// HTTP レスポンス
///
/// リーズンフレーズは持たない。エンコード時に `StatusRegistry` から引く。
/// Content-Length と Connection はエンコード時に自動で付与されるため、
/// ここには含めない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// ステータスコード (200, 204, etc.)
    pub status_code: u16,
    /// HTTP バージョン (HTTP/1.1 等)
    pub http_version: String,
    /// ヘッダー
    pub headers: HeaderList,
    /// ボディ
    pub body: Vec<u8>,
}

impl Response {
    /// 新しいレスポンスを作成 (HTTP/1.1)
    pub fn new(status_code: u16) -> Self {
        Self::with_version("HTTP/1.1", status_code)
    }

    /// カスタムバージョンでレスポンスを作成
    pub fn with_version(http_version: &str, status_code: u16) -> Self {
        Self {
            status_code,
            http_version: http_version.to_string(),
            headers: HeaderList::new(),
            body: Vec::new(),
        }
    }

    /// ヘッダーを追加 (ビルダーパターン)
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push(name, value);
        self
    }

    /// ボディを設定 (ビルダーパターン)
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// ヘッダーを追加
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push(name, value);
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}
