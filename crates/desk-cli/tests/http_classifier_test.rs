//! HTTP classifier provider against a local canned-response server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use clap::Parser;
use desk_cli::classifiers::HttpClassifier;
use desk_cli::{Cli, DeskConfig};
use serde_json::Value;
use triage::{ClassifierAdapter, ClassifierError};

/// Serve `connections` requests with the same status and body, returning
/// the classify URL.
fn serve(status: &'static str, body: &'static str, connections: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming().take(connections) {
            let mut stream = stream.unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();
            let request: Value = serde_json::from_slice(&request_body).unwrap();
            assert!(request["text"].is_string());

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
    });
    format!("http://{addr}/classify")
}

const STORAGE_HEAVY: &str =
    r#"{"probabilities": [0.02, 0.02, 0.05, 0.01, 0.02, 0.03, 0.05, 0.80]}"#;

#[test]
fn test_returns_vector_from_endpoint() {
    let url = serve("200 OK", STORAGE_HEAVY, 1);
    let classifier = HttpClassifier::new("statistical", url, Duration::from_secs(5)).unwrap();
    let v = classifier.classify("Disk quota exceeded").unwrap();
    assert_eq!(v.as_slice().len(), 8);
    assert!((v.as_slice()[7] - 0.80).abs() < 1e-12);
}

#[test]
fn test_server_error_is_unavailable() {
    let url = serve("500 Internal Server Error", "{}", 1);
    let classifier = HttpClassifier::new("semantic", url, Duration::from_secs(5)).unwrap();
    match classifier.classify("Disk quota exceeded").unwrap_err() {
        ClassifierError::Unavailable { provider, reason } => {
            assert_eq!(provider, "semantic");
            assert!(reason.contains("500"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unexpected_body_is_malformed() {
    let url = serve("200 OK", r#"{"labels": ["Storage"]}"#, 1);
    let classifier = HttpClassifier::new("semantic", url, Duration::from_secs(5)).unwrap();
    assert!(matches!(
        classifier.classify("Disk quota exceeded").unwrap_err(),
        ClassifierError::Malformed { .. }
    ));
}

#[test]
fn test_submit_through_http_providers() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("desk.json");
    let statistical = serve("200 OK", STORAGE_HEAVY, 1);
    let semantic = serve("200 OK", STORAGE_HEAVY, 1);

    let cli = Cli::try_parse_from([
        "service-desk",
        "--json",
        "--statistical-url",
        statistical.as_str(),
        "--semantic-url",
        semantic.as_str(),
        "submit",
        "--user-id",
        "emp-3",
        "--user-name",
        "Alex",
        "--title",
        "Quota",
        "--description",
        "Shared drive is out of space",
    ])
    .unwrap();
    let config = DeskConfig {
        store_path: store,
        triage_config: None,
        statistical_url: None,
        semantic_url: None,
        classifier_timeout: Duration::from_secs(5),
    };
    let mut out = Vec::new();
    desk_cli::run(cli, config, &mut out).unwrap();

    let outcome: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(outcome["outcome"], "logged");
    assert_eq!(outcome["ticket"]["category"], "Storage");
    assert_eq!(outcome["decision"]["processing_status"], "Auto-Categorized");
    assert_eq!(outcome["ticket"]["priority"], "Standard");
}
