use std::fmt;

/// 処理エラー
///
/// どのエラーも接続単位の終端失敗であり、リトライは行わない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// ヘッダーとして使えるデータを 1 バイトも読めないまま読み込みが終わった
    StreamReadFailure,
    /// 区切り (CRLF CRLF) を見つける前にバッファが上限に達した
    ///
    /// 終端失敗ではない。読めた分すべてをヘッダーブロックとして扱う。
    BufferOverflow { size: usize, limit: usize },
    /// リクエストライン、またはヘッダー行が不正
    MalformedRequest(String),
    /// ステータスコードに対応するリーズンフレーズが登録されていない
    UnknownStatusCode(u16),
    /// エンコード後のレスポンスが上限以上
    ResponseTooLarge { size: usize, limit: usize },
    /// 送信するフィールドに CR / LF が含まれている
    InvalidField(String),
    /// 書き込みに失敗した
    WriteFailure(String),
    /// 設定値が不正
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::StreamReadFailure => write!(f, "no header data read from stream"),
            Error::BufferOverflow { size, limit } => {
                write!(f, "buffer overflow: {} >= {}", size, limit)
            }
            Error::MalformedRequest(msg) => write!(f, "malformed request: {}", msg),
            Error::UnknownStatusCode(code) => write!(f, "unknown status code: {}", code),
            Error::ResponseTooLarge { size, limit } => {
                write!(f, "response too large: {} >= {}", size, limit)
            }
            Error::InvalidField(msg) => write!(f, "invalid field: {}", msg),
            Error::WriteFailure(msg) => write!(f, "write failure: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
