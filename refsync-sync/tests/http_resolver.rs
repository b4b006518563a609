//! `HttpReferenceApi` against a local one-shot HTTP server.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use refsync_core::FieldKind;
use refsync_sync::{resolver::resolve, ApiReference, HttpReferenceApi, ResolveError};

/// Serve exactly one request with `status` and `body`; return the request line.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let base_url = format!("http://{}", listener.local_addr().expect("addr"));
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("request line");
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).expect("header");
            if header == "\r\n" || header.is_empty() {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).expect("write");
        stream.flush().expect("flush");
        request_line.trim_end().to_string()
    });
    (base_url, handle)
}

fn api() -> HttpReferenceApi {
    HttpReferenceApi::new(Duration::from_secs(5))
}

#[test]
fn found_reference_is_decoded() {
    let (base, server) = serve_once("200 OK", r#"{"name":"Sports","id":"abc-1","extra":true}"#);

    let got = resolve(&api(), &base, "abc-1", FieldKind::Channel).expect("resolve");

    assert_eq!(got, Some(ApiReference::new("Sports", "abc-1")));
    assert_eq!(server.join().unwrap(), "GET /api/channel/abc-1 HTTP/1.1");
}

#[test]
fn not_found_means_absent() {
    let (base, server) = serve_once("404 Not Found", r#"{"error":"missing"}"#);

    let got = resolve(&api(), &base, "dead", FieldKind::Category).expect("resolve");

    assert_eq!(got, None);
    assert_eq!(server.join().unwrap(), "GET /api/category/dead HTTP/1.1");
}

#[test]
fn no_content_means_absent() {
    let (base, server) = serve_once("204 No Content", "");
    assert_eq!(resolve(&api(), &base, "0a", FieldKind::Channel).expect("resolve"), None);
    server.join().unwrap();
}

#[test]
fn payload_without_name_and_id_means_absent() {
    let (base, server) = serve_once("200 OK", "{}");
    assert_eq!(resolve(&api(), &base, "0a", FieldKind::Channel).expect("resolve"), None);
    server.join().unwrap();
}

#[test]
fn server_error_is_propagated() {
    let (base, server) = serve_once("500 Internal Server Error", "{}");

    let err = resolve(&api(), &base, "0a", FieldKind::Channel).unwrap_err();

    assert!(
        matches!(err, ResolveError::Status { code: 500, .. }),
        "got: {err}"
    );
    server.join().unwrap();
}

#[test]
fn custom_agent_is_used_for_requests() {
    let (base, server) = serve_once("200 OK", r#"{"name":"Radio","id":7}"#);
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(5))
        .build();

    let got = resolve(&HttpReferenceApi::with_agent(agent), &base, "7", FieldKind::Channel)
        .expect("resolve");

    assert_eq!(got, Some(ApiReference::new("Radio", "7")));
    server.join().unwrap();
}

#[test]
fn non_json_body_is_a_decode_error() {
    let (base, server) = serve_once("200 OK", "<html>oops</html>");
    let err = resolve(&api(), &base, "0a", FieldKind::Channel).unwrap_err();
    assert!(matches!(err, ResolveError::Decode { .. }), "got: {err}");
    server.join().unwrap();
}
