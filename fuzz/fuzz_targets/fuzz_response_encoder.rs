#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mini_http11::{Response, ResponseEncoder, StatusRegistry};

#[derive(Debug, Arbitrary)]
struct Input {
    status_code: u16,
    http_version: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    max_response_size: u16,
}

fuzz_target!(|input: Input| {
    let registry = StatusRegistry::default();
    let mut response = Response::with_version(&input.http_version, input.status_code)
        .body(input.body);
    for (name, value) in &input.headers {
        response.add_header(name, value);
    }

    let encoder = ResponseEncoder::new(&registry, input.max_response_size as usize);
    let first = encoder.encode(&response);
    let second = encoder.encode(&response);
    assert_eq!(first, second);

    if let Ok(bytes) = first {
        assert!(bytes.len() < input.max_response_size as usize);
        assert!(bytes.ends_with(&response.body));
    }
});
