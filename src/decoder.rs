//! ストリームデコーダー
//!
//! 受信したバイト列を上限付きのバッファに溜め、ヘッダーとボディの区切り
//! (`\r\n\r\n`) を探す。ヘッダーの中身は解釈しない。
//!
//! I/O は持たない (Sans I/O)。ブロッキングで読む場合は
//! `StreamDecoder::read_from()` を使う。
//!
//! ## ボディの切り詰め
//!
//! ボディは区切りを見つけた時点でバッファに溜まっていたバイトだけを返す。
//! Content-Length を見て読み続けることはしないので、後続の読み込みで届く
//! ボディは捨てられる (読まれない)。
//!
//! ```rust
//! use mini_http11::{DecodeStatus, StreamDecoder};
//!
//! let mut decoder = StreamDecoder::new(8192);
//! assert_eq!(decoder.feed(b"POST / HTTP/1.1\r\n\r\nhel"), DecodeStatus::Ready);
//! // 区切りを見つけた後の入力は受け付けない
//! assert_eq!(decoder.feed(b"lo"), DecodeStatus::Ready);
//!
//! let decoded = decoder.finish();
//! assert_eq!(decoded.header.as_deref(), Some("POST / HTTP/1.1"));
//! assert_eq!(decoded.body.as_deref(), Some(&b"hel"[..]));
//! ```

use std::io::Read;

use crate::error::Error;

const BOUNDARY: &[u8] = b"\r\n\r\n";

/// 1 回の読み込みで使うバッファのサイズ
///
/// `max_request_size` がどれだけ大きくても、1 回に読むのはこのサイズまで。
pub const READ_BUFFER_SIZE: usize = 8192;

/// feed() の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// 区切りがまだ見つからず、バッファにも空きがある
    NeedMore,
    /// 区切りを見つけた、またはバッファが上限に達した
    Ready,
}

/// デコード結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// ヘッダーブロック (区切りは含まない)
    ///
    /// 1 バイトも読めなかった場合は `None`。
    pub header: Option<String>,
    /// 区切りの後ろにあったバイト列
    ///
    /// 区切りが見つからなかった場合は `None`。
    pub body: Option<Vec<u8>>,
    overflow: Option<(usize, usize)>,
}

impl Decoded {
    /// 区切りを見つける前にバッファが上限に達した場合はそのエラーを返す
    ///
    /// 終端失敗ではない。バッファの中身はすべて `header` に入っている。
    pub fn overflow(&self) -> Option<Error> {
        self.overflow
            .map(|(size, limit)| Error::BufferOverflow { size, limit })
    }

    /// ヘッダーブロックを取得
    ///
    /// 1 バイトも読めなかった場合は `Error::StreamReadFailure`。
    pub fn header(&self) -> Result<&str, Error> {
        self.header.as_deref().ok_or(Error::StreamReadFailure)
    }
}

/// ストリームデコーダー (Sans I/O)
#[derive(Debug)]
pub struct StreamDecoder {
    buf: Vec<u8>,
    /// バッファに溜める最大バイト数 (max_request_size - 1)
    capacity: usize,
    max_request_size: usize,
    /// 区切りの開始位置
    boundary: Option<usize>,
}

impl StreamDecoder {
    /// 新しいデコーダーを作成
    ///
    /// `max_request_size` は区切りを含めた上限。実際に溜めるのは
    /// `max_request_size - 1` バイトまで。バッファは届いた分だけ伸ばす。
    pub fn new(max_request_size: usize) -> Self {
        let capacity = max_request_size.saturating_sub(1);
        Self {
            buf: Vec::new(),
            capacity,
            max_request_size,
            boundary: None,
        }
    }

    /// まだ受け付けられるバイト数
    pub fn remaining_capacity(&self) -> usize {
        if self.is_ready() {
            0
        } else {
            self.capacity - self.buf.len()
        }
    }

    /// 溜まっているバイト数
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// これ以上入力を受け付けないか
    pub fn is_ready(&self) -> bool {
        self.boundary.is_some() || self.buf.len() >= self.capacity
    }

    /// データを投入
    ///
    /// 空き容量を超えた分は無視する。
    pub fn feed(&mut self, data: &[u8]) -> DecodeStatus {
        if self.is_ready() {
            return DecodeStatus::Ready;
        }

        let take = data.len().min(self.remaining_capacity());
        // 前回の末尾にまたがる区切りも見つけられるよう 3 バイト戻って探す
        let search_from = self.buf.len().saturating_sub(BOUNDARY.len() - 1);
        self.buf.extend_from_slice(&data[..take]);
        self.boundary = find_boundary(&self.buf[search_from..]).map(|pos| search_from + pos);

        if self.is_ready() {
            DecodeStatus::Ready
        } else {
            DecodeStatus::NeedMore
        }
    }

    /// デコードを終了して結果を取り出す
    ///
    /// 読み込みが 0 バイトを返した場合やエラーになった場合も、その時点で呼ぶ。
    pub fn finish(mut self) -> Decoded {
        match self.boundary {
            Some(pos) => {
                let body = self.buf.split_off(pos + BOUNDARY.len());
                self.buf.truncate(pos);
                Decoded {
                    header: Some(into_text(self.buf)),
                    body: Some(body),
                    overflow: None,
                }
            }
            None => {
                let overflow = (self.buf.len() >= self.capacity && !self.buf.is_empty())
                    .then_some((self.buf.len(), self.max_request_size));
                let header = if self.buf.is_empty() {
                    None
                } else {
                    Some(into_text(self.buf))
                };
                Decoded {
                    header,
                    body: None,
                    overflow,
                }
            }
        }
    }

    /// ブロッキングでストリームから読み込んでデコード
    ///
    /// 区切りを見つけるか、上限に達するか、読み込みが 0 バイトかエラーを
    /// 返すまで読む。リトライはしない。
    pub fn read_from<R: Read>(reader: &mut R, max_request_size: usize) -> Decoded {
        let mut decoder = Self::new(max_request_size);
        let mut buf = [0u8; READ_BUFFER_SIZE];

        while !decoder.is_ready() {
            let want = decoder.remaining_capacity().min(buf.len());
            match reader.read(&mut buf[..want]) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    decoder.feed(&buf[..n]);
                }
            }
        }

        decoder.finish()
    }
}

fn find_boundary(buf: &[u8]) -> Option<usize> {
    buf.windows(BOUNDARY.len()).position(|w| w == BOUNDARY)
}

fn into_text(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
