#![no_main]

use libfuzzer_sys::fuzz_target;
use mini_http11::StreamDecoder;

const MAX_REQUEST_SIZE: usize = 1024;

fuzz_target!(|data: &[u8]| {
    // データを一度に feed
    let mut whole = StreamDecoder::new(MAX_REQUEST_SIZE);
    whole.feed(data);
    assert!(whole.buffered_len() < MAX_REQUEST_SIZE);
    let whole = whole.finish();

    // データを分割して feed (ストリーミングシナリオ)
    let mut chunked = StreamDecoder::new(MAX_REQUEST_SIZE);
    for chunk in data.chunks(17) {
        chunked.feed(chunk);
    }
    let chunked = chunked.finish();

    // ヘッダー部分は分割の仕方で変わらない
    // ボディは区切りを見つけた時点までに受信した分だけなので比較しない
    assert_eq!(whole.header, chunked.header);
    assert_eq!(whole.overflow(), chunked.overflow());
    if let Some(body) = &chunked.body {
        assert!(whole.body.as_ref().is_some_and(|b| b.starts_with(body)));
    }
});
