//! リクエストパーサー
//!
//! `StreamDecoder` が切り出したヘッダーブロックを `Request` に変換する。
//!
//! - 行は LF で区切る。行末の CR は取り除く
//! - 連続する LF の間の空の区間は読み飛ばす
//! - ヘッダーは到着順に格納する
//! - 1 行でも不正な行があればリクエスト全体を不正とする
//!
//! ```rust
//! use mini_http11::parse_request;
//!
//! let request = parse_request("GET /index.html HTTP/1.1\r\nHost: example.com").unwrap();
//! assert_eq!(request.method, "GET");
//! assert_eq!(request.path, "/index.html");
//! assert_eq!(request.get_header("host"), Some("example.com"));
//!
//! assert!(parse_request("GET / HTTP/1.1\r\nBadHeaderNoColon").is_err());
//! ```

use crate::error::Error;
use crate::headers::HeaderList;
use crate::request::Request;

/// ヘッダーブロックをパース
///
/// 入力のみに依存する純粋関数。成功した場合にのみ `Request` を返し、
/// 途中までパースした結果は返さない。ボディは `None` になる。
pub fn parse_request(header_block: &str) -> Result<Request, Error> {
    let mut lines = header_block
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| line.strip_suffix('\r').unwrap_or(line));

    let start_line = lines
        .next()
        .ok_or_else(|| Error::MalformedRequest("empty header block".to_string()))?;
    let (method, path, http_version) = parse_start_line(start_line)?;

    let mut headers = HeaderList::new();
    for line in lines {
        let (name, value) = parse_header_line(line)?;
        headers.push(name, value);
    }

    Ok(Request {
        method: method.to_string(),
        path: path.to_string(),
        http_version: http_version.to_string(),
        headers,
        body: None,
    })
}

/// リクエストラインをパース: METHOD SP PATH SP VERSION
///
/// VERSION は 2 つ目の空白以降すべて。
fn parse_start_line(line: &str) -> Result<(&str, &str, &str), Error> {
    let (method, rest) = line.split_once(' ').ok_or_else(|| {
        Error::MalformedRequest(format!("invalid request line: {}", line))
    })?;
    let (path, http_version) = rest.split_once(' ').ok_or_else(|| {
        Error::MalformedRequest(format!("invalid request line: {}", line))
    })?;

    if method.is_empty() {
        return Err(Error::MalformedRequest(
            "invalid request line: empty method".to_string(),
        ));
    }
    if path.is_empty() {
        return Err(Error::MalformedRequest(
            "invalid request line: empty path".to_string(),
        ));
    }

    Ok((method, path, http_version))
}

/// ヘッダー行をパース: 最初のコロンで分割し、両側の空白を取り除く
fn parse_header_line(line: &str) -> Result<(&str, &str), Error> {
    let (name, value) = line.split_once(':').ok_or_else(|| {
        Error::MalformedRequest(format!("invalid header line: missing colon: {}", line))
    })?;
    Ok((trim_whitespace(name), trim_whitespace(value)))
}

/// 前後の ASCII 空白 (SP, HTAB, LF, VT, FF, CR) を取り除く
fn trim_whitespace(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let request = parse_request("GET /index.html HTTP/1.1\r\nHost: example.com").unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/index.html");
        assert_eq!(request.http_version, "HTTP/1.1");
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.get_header("Host"), Some("example.com"));
        assert_eq!(request.body, None);
    }

    #[test]
    fn parse_lf_only() {
        let request = parse_request("GET / HTTP/1.0\nAccept: */*\n").unwrap();
        assert_eq!(request.http_version, "HTTP/1.0");
        assert_eq!(request.get_header("Accept"), Some("*/*"));
    }

    #[test]
    fn headers_in_arrival_order() {
        let request = parse_request("GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\nA: 3").unwrap();
        let headers: Vec<(&str, &str)> = request.headers.iter().collect();
        assert_eq!(headers, vec![("A", "1"), ("B", "2"), ("A", "3")]);
    }

    #[test]
    fn header_whitespace_trimmed() {
        let request = parse_request("GET / HTTP/1.1\r\n  X-Name \t:  \x0bvalue with spaces \t").unwrap();
        assert_eq!(request.get_header("X-Name"), Some("value with spaces"));
    }

    #[test]
    fn header_value_may_contain_colon() {
        let request = parse_request("GET / HTTP/1.1\r\nHost: example.com:8080").unwrap();
        assert_eq!(request.get_header("Host"), Some("example.com:8080"));
    }

    #[test]
    fn empty_name_and_value_allowed() {
        let request = parse_request("GET / HTTP/1.1\r\n:").unwrap();
        let headers: Vec<(&str, &str)> = request.headers.iter().collect();
        assert_eq!(headers, vec![("", "")]);
    }

    #[test]
    fn version_keeps_trailing_text() {
        let request = parse_request("GET / HTTP/1.1 extra").unwrap();
        assert_eq!(request.http_version, "HTTP/1.1 extra");
    }

    #[test]
    fn consecutive_lf_skipped() {
        let request = parse_request("\nGET / HTTP/1.1\n\nHost: a\n\n").unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.get_header("Host"), Some("a"));
    }

    #[test]
    fn cr_only_line_is_malformed() {
        assert!(matches!(
            parse_request("GET / HTTP/1.1\r\n\r\nHost: a"),
            Err(Error::MalformedRequest(_))
        ));
    }

    #[test]
    fn missing_colon_anywhere_is_malformed() {
        for block in [
            "GET / HTTP/1.1\r\nBadHeaderNoColon",
            "GET / HTTP/1.1\r\nBadHeaderNoColon\r\nHost: a",
            "GET / HTTP/1.1\r\nHost: a\r\nBadHeaderNoColon",
        ] {
            assert!(
                matches!(parse_request(block), Err(Error::MalformedRequest(_))),
                "{block:?}"
            );
        }
    }

    #[test]
    fn invalid_start_lines() {
        for block in [
            "",
            "\n\n",
            "ONLYONEWORD\r\n",
            "GET /only-two\r\n",
            " / HTTP/1.1",
            "GET  HTTP/1.1",
        ] {
            assert!(
                matches!(parse_request(block), Err(Error::MalformedRequest(_))),
                "{block:?}"
            );
        }
    }

    #[test]
    fn parse_is_pure() {
        let block = "POST /api HTTP/1.1\r\nHost: a\r\nContent-Type: text/plain";
        assert_eq!(parse_request(block), parse_request(block));
    }
}
