use std::sync::{Arc, Mutex};
use std::time::Duration;

use fetcher_core::{
    build, classify, normalize, AttemptId, CredentialFile, CredentialPolicy, RequestEncoding,
    ResponseOutcome, SubmissionRequest, SubmitConfig, TransferProgress,
};
use fetcher_engine::{FailureKind, ProgressSink, ReqwestTransport, Transport, TransportSettings};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string, body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<TransferProgress>>>,
}

impl TestSink {
    fn new() -> Self {
        Self::default()
    }

    fn take(&self) -> Vec<TransferProgress> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, _attempt: AttemptId, progress: TransferProgress) {
        self.events.lock().unwrap().push(progress);
    }
}

fn settings_for(server: &MockServer) -> TransportSettings {
    TransportSettings {
        endpoint: format!("{}/download", server.uri()),
        ..TransportSettings::default()
    }
}

fn multipart_request() -> SubmissionRequest {
    build(
        normalize("https://youtu.be/abc123").unwrap(),
        Some(CredentialFile::new("cookies.txt", b"# Netscape HTTP Cookie File".to_vec())),
        &SubmitConfig::default(),
    )
    .unwrap()
}

fn urlencoded_request() -> SubmissionRequest {
    build(
        normalize("https://www.youtube.com/watch?v=abc123").unwrap(),
        None,
        &SubmitConfig {
            encoding: RequestEncoding::UrlEncoded,
            credential: CredentialPolicy::Optional,
        },
    )
    .unwrap()
}

#[tokio::test]
async fn multipart_submission_returns_media_and_reports_progress() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"url\""))
        .and(body_string_contains("https://www.youtube.com/watch?v=abc123"))
        .and(body_string_contains("name=\"cookies_file\"; filename=\"cookies.txt\""))
        .and(body_string_contains("# Netscape HTTP Cookie File"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![7u8; 4096], "video/mp4"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(settings_for(&server));
    let sink = TestSink::new();

    let response = transport
        .send(1, &multipart_request(), &sink)
        .await
        .expect("response");
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type(), Some("video/mp4"));
    assert_eq!(response.body, vec![7u8; 4096]);

    let progress = sink.take();
    assert_eq!(
        progress.first(),
        Some(&TransferProgress {
            loaded: 0,
            total: Some(4096)
        })
    );
    assert_eq!(progress.last().and_then(TransferProgress::percent), Some(100));
    assert!(progress.windows(2).all(|pair| pair[0].loaded <= pair[1].loaded));
}

#[tokio::test]
async fn urlencoded_submission_sends_only_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(
            "url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dabc123",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_raw("media", "video/mp4"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(settings_for(&server));
    let response = transport
        .send(2, &urlencoded_request(), &TestSink::new())
        .await
        .expect("response");
    assert_eq!(response.status, 200);
    assert_eq!(response.body, b"media");
}

#[tokio::test]
async fn error_status_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_raw(r#"{"detail":"yt-dlp failed"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(settings_for(&server));
    let response = transport
        .send(3, &multipart_request(), &TestSink::new())
        .await
        .expect("error statuses are still responses");
    assert_eq!(response.status, 400);
    assert_eq!(response.content_type(), Some("application/json"));
    assert_eq!(response.body, br#"{"detail":"yt-dlp failed"}"#);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = TransportSettings {
        request_timeout: Duration::from_millis(50),
        ..settings_for(&server)
    };
    let transport = ReqwestTransport::new(settings);

    let err = transport
        .send(4, &multipart_request(), &TestSink::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
    assert!(err.user_message().starts_with("No response from server"));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure() {
    let settings = TransportSettings {
        endpoint: "http://127.0.0.1:1/download".to_string(),
        connect_timeout: Duration::from_millis(500),
        ..TransportSettings::default()
    };
    let transport = ReqwestTransport::new(settings);

    let err = transport
        .send(5, &multipart_request(), &TestSink::new())
        .await
        .unwrap_err();
    assert!(matches!(err.kind, FailureKind::Connect | FailureKind::Timeout));
    assert!(err.user_message().starts_with("No response from server"));
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("01234567890", "video/mp4"))
        .mount(&server)
        .await;

    let settings = TransportSettings {
        max_response_bytes: 10,
        ..settings_for(&server)
    };
    let transport = ReqwestTransport::new(settings);

    let err = transport
        .send(6, &multipart_request(), &TestSink::new())
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn oversized_error_body_is_still_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(500).set_body_raw(
            r#"{"detail":"extraction failed with a very long traceback"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let settings = TransportSettings {
        max_response_bytes: 16,
        ..settings_for(&server)
    };
    let transport = ReqwestTransport::new(settings);

    let response = transport
        .send(8, &multipart_request(), &TestSink::new())
        .await
        .expect("error responses are returned even when cut off");
    assert_eq!(response.status, 500);
    assert!(response.body.len() <= 16);
    assert_eq!(
        classify(response),
        ResponseOutcome::StructuredError("Invalid server response".to_string())
    );
}

#[tokio::test]
async fn malformed_endpoint_is_reported() {
    let settings = TransportSettings {
        endpoint: "not an endpoint".to_string(),
        ..TransportSettings::default()
    };
    let transport = ReqwestTransport::new(settings);
    let err = transport
        .send(7, &multipart_request(), &TestSink::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidEndpoint);
}
