#![no_main]

use std::io::{Cursor, Read, Write};

use libfuzzer_sys::fuzz_target;
use mini_http11::{Config, FailurePolicy, Request, RequestCycle, Response, StatusRegistry};

struct Stream {
    input: Cursor<Vec<u8>>,
    output: Vec<u8>,
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        // 少しずつ返して分割受信を再現する
        let len = buf.len().min(7);
        self.input.read(&mut buf[..len])
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn echo(request: Request) -> Response {
    let body = request.body.unwrap_or_default();
    Response::with_version(&request.http_version, 200).body(body)
}

fuzz_target!(|data: &[u8]| {
    let registry = StatusRegistry::default();

    for policy in [FailurePolicy::SilentDrop, FailurePolicy::ErrorResponse] {
        let config = Config {
            max_request_size: 512,
            max_response_size: 1024,
            failure_policy: policy,
        };
        let cycle = RequestCycle::new(&config, &registry);
        let mut stream = Stream {
            input: Cursor::new(data.to_vec()),
            output: Vec::new(),
        };

        let outcome = cycle.run(&mut stream, &echo);
        assert!(outcome.phase().is_terminal());
        assert!(stream.output.len() < config.max_response_size);
        if policy == FailurePolicy::SilentDrop && !matches!(outcome, mini_http11::CycleOutcome::Done(_)) {
            assert!(stream.output.is_empty());
        }
    }
});
