//! tokio_mini_http11 エラー型

use std::fmt;

/// tokio_mini_http11 エラー
#[derive(Debug)]
pub enum Error {
    /// I/O エラー
    Io(std::io::Error),
    /// HTTP 処理エラー
    Http(mini_http11::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Http(e) => write!(f, "HTTP error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Http(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<mini_http11::Error> for Error {
    fn from(e: mini_http11::Error) -> Self {
        Error::Http(e)
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
