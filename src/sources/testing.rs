//! Loopback HTTP responder for exercising the real clients in tests.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// Serve `responses` in order, one connection per response, on a free
/// loopback port.
///
/// Returns the base URL and a handle that yields the head (request line plus
/// headers) of every request received.
pub(crate) fn serve(
    responses: Vec<(u16, &'static str, String)>,
) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut heads = Vec::new();
        for (status, content_type, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            heads.push(head);

            write!(
                stream,
                "HTTP/1.1 {} Test\r\nContent-Type: {}\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                content_type,
                body.len(),
                body
            )
            .unwrap();
            stream.flush().unwrap();
        }
        heads
    });

    (base, handle)
}
