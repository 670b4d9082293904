use chrono::{TimeZone, Utc};
use proposal_core::{
    build_notifier, Decision, HttpEmailConfig, HttpEmailNotifier, Notifier, NotifierConfig,
    NotifyError, ResponseDraft, ResponseRecord,
};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

struct CapturedRequest {
    head: String,
    body: String,
}

/// Serves exactly one HTTP request with `status_line` and returns what it saw.
fn one_shot_server(status_line: &'static str, delay: Duration) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/emails", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut head = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap();
            }
            head.push_str(&line);
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).unwrap();

        thread::sleep(delay);
        let mut stream = stream;
        let _ = stream.write_all(
            format!("HTTP/1.1 {status_line}\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
                .as_bytes(),
        );

        CapturedRequest {
            head,
            body: String::from_utf8(body).unwrap(),
        }
    });

    (url, handle)
}

fn config(api_url: String, timeout: Duration) -> HttpEmailConfig {
    HttpEmailConfig {
        api_url,
        api_key: "secret-key".to_string(),
        from: "proposals@example.com".to_string(),
        owner_email: "owner@example.com".to_string(),
        timeout,
    }
}

fn record() -> ResponseRecord {
    ResponseDraft {
        proposal_id: "P1".to_string(),
        decision: Decision::Declined,
        name: "Bo".to_string(),
        email: "bo@x.com".to_string(),
        telegram: String::new(),
        company: "Acme".to_string(),
        notes: "Not this quarter".to_string(),
        source_address: None,
    }
    .into_record(2, Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap())
}

#[test]
fn posts_summary_to_owner_with_bearer_auth() {
    let (url, server) = one_shot_server("202 Accepted", Duration::ZERO);
    let notifier = HttpEmailNotifier::new(config(url, Duration::from_secs(5))).unwrap();

    notifier.notify(&record()).unwrap();

    let request = server.join().unwrap();
    assert!(request.head.starts_with("POST /emails HTTP/1.1"));
    assert!(request
        .head
        .to_ascii_lowercase()
        .contains("authorization: bearer secret-key"));

    let json: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(json["from"], "proposals@example.com");
    assert_eq!(json["to"], serde_json::json!(["owner@example.com"]));
    assert_eq!(json["subject"], "❌ Proposal P1: declined by Bo");
    assert!(json["text"].as_str().unwrap().contains("Not this quarter"));
}

#[test]
fn non_success_status_is_a_rejection() {
    let (url, server) = one_shot_server("503 Service Unavailable", Duration::ZERO);
    let notifier = HttpEmailNotifier::new(config(url, Duration::from_secs(5))).unwrap();

    let err = notifier.notify(&record()).unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, NotifyError::Rejected { status: 503, ref body } if body == "ok"));
    assert!(!err.to_string().contains("secret-key"));
}

#[test]
fn slow_channel_times_out() {
    let (url, server) = one_shot_server("200 OK", Duration::from_millis(800));
    let notifier = HttpEmailNotifier::new(config(url, Duration::from_millis(150))).unwrap();

    let err = notifier.notify(&record()).unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, NotifyError::Transport(ref inner) if inner.is_timeout()));
    assert_eq!(err.to_string(), "notification timed out");
}

#[test]
fn unreachable_channel_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/emails", listener.local_addr().unwrap());
    drop(listener);

    let notifier = HttpEmailNotifier::new(config(url, Duration::from_secs(2))).unwrap();
    let err = notifier.notify(&record()).unwrap_err();
    assert!(matches!(err, NotifyError::Transport(_)));
}

#[test]
fn build_notifier_selects_configured_channel() {
    assert_eq!(build_notifier(&NotifierConfig::Log).unwrap().channel(), "log");
    assert_eq!(
        build_notifier(&NotifierConfig::Disabled).unwrap().channel(),
        "disabled"
    );
    let email = NotifierConfig::HttpEmail(config(
        "http://127.0.0.1:9/emails".to_string(),
        Duration::from_secs(1),
    ));
    assert_eq!(build_notifier(&email).unwrap().channel(), "http_email");
}
