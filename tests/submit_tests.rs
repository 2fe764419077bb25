mod common;

use common::fixtures::extracted_data;
use common::{Reply, ScriptedTransport};
use document_verifier_lib::{FieldMapping, SubmitClient, VerifyError};
use serde_json::json;

fn fields() -> FieldMapping {
    serde_json::from_value(extracted_data()).unwrap()
}

#[test]
fn sends_whole_mapping_and_returns_ack() {
    let ack = json!({ "document_id": "doc-1", "status": "verified" });
    let client = SubmitClient::new(ScriptedTransport::new(vec![Reply::json(200, ack.clone())]));

    let result = client.submit("doc-1", &fields()).unwrap();

    assert_eq!(result, ack);
    let calls = client.transport().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "PUT");
    assert_eq!(calls[0].path, "/api/document/doc-1");
    // Confidence and bounding boxes travel back unchanged.
    assert_eq!(calls[0].body, Some(json!({ "extracted_data": extracted_data() })));
}

#[test]
fn unauthorized_statuses_sign_out() {
    for status in [401, 403] {
        let client = SubmitClient::new(ScriptedTransport::new(vec![Reply::status(status)]));
        let result = client.submit("doc-1", &fields());
        assert!(matches!(result, Err(VerifyError::Unauthorized)));
        assert_eq!(client.transport().sign_outs(), 1);
    }
}

#[test]
fn failure_carries_server_error_message() {
    let client = SubmitClient::new(ScriptedTransport::new(vec![Reply::json(
        400,
        json!({ "error": "document already verified" }),
    )]));

    match client.submit("doc-1", &fields()) {
        Err(VerifyError::SubmitFailure { status, message }) => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "document already verified");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(client.transport().sign_outs(), 0);
}

#[test]
fn failure_without_message_reports_status() {
    let client = SubmitClient::new(ScriptedTransport::new(vec![Reply::status(502)]));
    match client.submit("doc-1", &fields()) {
        Err(VerifyError::SubmitFailure { status, message }) => {
            assert_eq!(status, Some(502));
            assert_eq!(message, "HTTP 502");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn network_failure_is_not_retried() {
    let client = SubmitClient::new(ScriptedTransport::new(vec![Reply::NetworkDown]));
    let result = client.submit("doc-1", &fields());

    assert!(matches!(
        result,
        Err(VerifyError::SubmitFailure { status: None, .. })
    ));
    assert_eq!(client.transport().call_count(), 1);
}

#[test]
fn empty_success_body_is_a_null_ack() {
    for reply in [
        Reply::Respond(document_verifier_lib::HttpResponse::new(204, "")),
        Reply::Respond(document_verifier_lib::HttpResponse::new(200, " \n")),
    ] {
        let client = SubmitClient::new(ScriptedTransport::new(vec![reply]));
        assert_eq!(client.submit("doc-1", &fields()).unwrap(), serde_json::Value::Null);
    }
}

#[test]
fn unreadable_success_body_is_a_save_failure() {
    let client = SubmitClient::new(ScriptedTransport::new(vec![Reply::Respond(
        document_verifier_lib::HttpResponse::new(200, "<html>ok</html>"),
    )]));
    match client.submit("doc-1", &fields()) {
        Err(VerifyError::SubmitFailure { status, message }) => {
            assert_eq!(status, Some(200));
            assert_eq!(message, "An error occurred while saving.");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
