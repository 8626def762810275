use fetcher_core::{
    classify, MediaPayload, RawResponse, ResponseOutcome, DEFAULT_MEDIA_TYPE,
    GENERIC_FAILURE_MESSAGE, INVALID_RESPONSE_MESSAGE,
};

#[test]
fn success_status_is_always_binary() {
    let outcome = classify(
        RawResponse::new(200, b"\x00\x00\x00\x18ftypmp42".to_vec())
            .with_header("Content-Type", "video/mp4"),
    );
    assert_eq!(
        outcome,
        ResponseOutcome::BinaryPayload(MediaPayload {
            bytes: b"\x00\x00\x00\x18ftypmp42".to_vec(),
            content_type: "video/mp4".to_string(),
        })
    );
}

#[test]
fn success_wins_over_json_content_type() {
    let body = br#"{"detail":"looks like an error"}"#.to_vec();
    let outcome = classify(
        RawResponse::new(200, body.clone()).with_header("content-type", "application/json"),
    );
    match outcome {
        ResponseOutcome::BinaryPayload(payload) => {
            assert_eq!(payload.bytes, body);
            assert_eq!(payload.content_type, DEFAULT_MEDIA_TYPE);
        }
        other => panic!("expected binary payload, got {other:?}"),
    }
}

#[test]
fn success_without_content_type_assumes_video() {
    let outcome = classify(RawResponse::new(206, vec![1, 2, 3]));
    match outcome {
        ResponseOutcome::BinaryPayload(payload) => {
            assert_eq!(payload.content_type, DEFAULT_MEDIA_TYPE)
        }
        other => panic!("expected binary payload, got {other:?}"),
    }
}

#[test]
fn declared_media_type_is_kept() {
    let outcome = classify(
        RawResponse::new(200, vec![0]).with_header("content-type", "video/webm; codecs=vp9"),
    );
    match outcome {
        ResponseOutcome::BinaryPayload(payload) => assert_eq!(payload.content_type, "video/webm"),
        other => panic!("expected binary payload, got {other:?}"),
    }
}

#[test]
fn json_detail_becomes_structured_error() {
    let outcome = classify(
        RawResponse::new(400, br#"{"detail":"invalid url"}"#.to_vec())
            .with_header("content-type", "application/json"),
    );
    assert_eq!(
        outcome,
        ResponseOutcome::StructuredError("invalid url".to_string())
    );
}

#[test]
fn json_message_field_is_used_when_detail_is_absent() {
    let outcome = classify(
        RawResponse::new(503, br#"{"message":"backend busy"}"#.to_vec())
            .with_header("content-type", "application/json; charset=utf-8"),
    );
    assert_eq!(
        outcome,
        ResponseOutcome::StructuredError("backend busy".to_string())
    );
}

#[test]
fn validation_detail_list_is_joined() {
    let body = br#"{"detail":[{"loc":["body","url"],"msg":"field required"},{"msg":"bad file"}]}"#;
    let outcome = classify(
        RawResponse::new(422, body.to_vec()).with_header("content-type", "application/json"),
    );
    assert_eq!(
        outcome,
        ResponseOutcome::StructuredError("field required; bad file".to_string())
    );
}

#[test]
fn json_without_message_falls_back_to_generic_failure() {
    let outcome = classify(
        RawResponse::new(400, br#"{"code":17}"#.to_vec())
            .with_header("content-type", "application/json"),
    );
    assert_eq!(
        outcome,
        ResponseOutcome::StructuredError(GENERIC_FAILURE_MESSAGE.to_string())
    );
}

#[test]
fn unparsable_json_falls_back_to_invalid_response() {
    for body in [b"{not json".to_vec(), vec![0xff, 0xfe, 0x00]] {
        let outcome = classify(
            RawResponse::new(400, body).with_header("content-type", "application/json"),
        );
        assert_eq!(
            outcome,
            ResponseOutcome::StructuredError(INVALID_RESPONSE_MESSAGE.to_string())
        );
    }
}

#[test]
fn non_json_error_embeds_status_code() {
    let outcome = classify(
        RawResponse::new(500, b"Internal Server Error".to_vec())
            .with_header("content-type", "text/plain"),
    );
    match outcome {
        ResponseOutcome::TransportFailure(message) => assert!(message.contains("500"), "{message}"),
        other => panic!("expected transport failure, got {other:?}"),
    }

    let outcome = classify(RawResponse::new(502, Vec::new()));
    match outcome {
        ResponseOutcome::TransportFailure(message) => assert!(message.contains("502"), "{message}"),
        other => panic!("expected transport failure, got {other:?}"),
    }
}
