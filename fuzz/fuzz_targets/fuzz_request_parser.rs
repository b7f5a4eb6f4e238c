#![no_main]

use libfuzzer_sys::fuzz_target;
use mini_http11::parse_request;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    if let Ok(request) = parse_request(&text) {
        assert!(!request.method.is_empty());
        assert!(!request.path.is_empty());
        assert_eq!(request.body, None);
    }
});
