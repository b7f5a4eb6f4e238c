//! RequestCycle のプロパティテスト (cycle.rs)

use mini_http11::{
    Config, CyclePhase, FailurePolicy, Request, RequestCycle, Response, StatusRegistry,
    StreamDecoder,
};
use pbt::{body, header_block, headers, http_method, http_path, http_version};
use proptest::prelude::*;

fn decode(data: &[u8], max_request_size: usize) -> mini_http11::Decoded {
    let mut decoder = StreamDecoder::new(max_request_size);
    decoder.feed(data);
    decoder.finish()
}

fn echo(request: Request) -> Response {
    let body = request.body.unwrap_or_default();
    Response::with_version(&request.http_version, 200).body(body)
}

proptest! {
    #[test]
    fn prop_respond_echoes_version_and_body(
        method in http_method(),
        path in http_path(),
        version in http_version(),
        headers in headers(),
        body in body(),
    ) {
        let config = Config::default();
        let registry = StatusRegistry::default();
        let cycle = RequestCycle::new(&config, &registry);

        let mut data = header_block(&method, &path, &version, &headers).into_bytes();
        data.extend_from_slice(b"\r\n\r\n");
        data.extend_from_slice(&body);

        let bytes = cycle.respond(decode(&data, 8192), &echo).unwrap();
        let status_line = format!("{} 200 OK\r\n", version);
        prop_assert!(bytes.starts_with(status_line.as_bytes()));
        prop_assert!(bytes.ends_with(&body));
    }

    #[test]
    fn prop_silent_drop_has_no_reply(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let config = Config::default();
        let registry = StatusRegistry::default();
        let cycle = RequestCycle::new(&config, &registry);

        if let Err(rejection) = cycle.respond(decode(&data, 8192), &echo) {
            prop_assert_eq!(rejection.reply, None);
            prop_assert!(matches!(
                rejection.phase,
                CyclePhase::ParseFailed | CyclePhase::InvalidRequest | CyclePhase::EncodeFailed
            ));
        }
    }

    #[test]
    fn prop_error_response_replies_400(line in "[a-zA-Z0-9/._-]{1,32}") {
        let config = Config::default().failure_policy(FailurePolicy::ErrorResponse);
        let registry = StatusRegistry::default();
        let cycle = RequestCycle::new(&config, &registry);

        let data = format!("{}\r\n\r\n", line);
        let rejection = cycle.respond(decode(data.as_bytes(), 8192), &echo).unwrap_err();
        prop_assert_eq!(rejection.phase, CyclePhase::InvalidRequest);
        let reply = rejection.reply.unwrap();
        prop_assert!(reply.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
    }
}
