//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// トークン生成
// ========================================

/// ヘッダー名などに使うトークン文字
pub fn token_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        Just('-'),
        Just('_'),
        Just('.'),
    ]
}

/// 1 文字以上のトークン
pub fn token_string(max_len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(token_char(), 1..=max_len)
        .prop_map(|chars| chars.into_iter().collect())
}

// ========================================
// リクエスト要素
// ========================================

pub fn http_method() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("GET".to_string()),
        Just("POST".to_string()),
        Just("PUT".to_string()),
        Just("DELETE".to_string()),
        Just("HEAD".to_string()),
        Just("OPTIONS".to_string()),
        token_string(8),
    ]
}

pub fn http_path() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        "/[a-zA-Z0-9/_.-]{1,64}".prop_map(|s| s),
    ]
}

pub fn http_version() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("HTTP/1.1".to_string()),
        Just("HTTP/1.0".to_string()),
        "HTTP/[0-9]\\.[0-9]".prop_map(|s| s),
    ]
}

/// ヘッダー名
pub fn header_name() -> impl Strategy<Value = String> {
    token_string(32)
}

/// ヘッダー値 (前後の空白なし、CR / LF なし)
///
/// パース時にトリムされても値が変わらないようにする。
pub fn header_value() -> impl Strategy<Value = String> {
    "[!-~]([ -~]{0,62}[!-~])?".prop_map(|s| s)
}

pub fn headers() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec((header_name(), header_value()), 0..10)
}

pub fn body() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..256)
}

/// ヘッダーブロック (区切りを含まない) を組み立てる
pub fn header_block(
    method: &str,
    path: &str,
    version: &str,
    headers: &[(String, String)],
) -> String {
    let mut block = format!("{} {} {}", method, path, version);
    for (name, value) in headers {
        block.push_str("\r\n");
        block.push_str(name);
        block.push_str(": ");
        block.push_str(value);
    }
    block
}
