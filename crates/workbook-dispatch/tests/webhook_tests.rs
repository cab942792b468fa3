// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::io::Read;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};
use time::OffsetDateTime;
use workbook_app::SummaryPayload;
use workbook_dispatch::{Dispatcher, SUBJECT, SimulatedDispatcher, WebhookClient};
use workbook_testkit::WorkbookFaker;

fn sample_payload() -> SummaryPayload {
    let mut faker = WorkbookFaker::new(5);
    let answers = faker.answers();
    let chips = faker.chips();
    SummaryPayload::compile(
        "user@example.com",
        &answers,
        &chips,
        OffsetDateTime::UNIX_EPOCH,
    )
}

#[test]
fn unreachable_endpoint_error_is_actionable() {
    let client = WebhookClient::new("http://127.0.0.1:1/summary", Duration::from_millis(50))
        .expect("client should initialize");

    let error = client
        .send(&sample_payload())
        .expect_err("send should fail for unreachable endpoint");
    let message = error.to_string();
    assert!(message.contains("cannot reach"));
    assert!(message.contains("[dispatch].endpoint"));
}

#[test]
fn send_posts_payload_as_json() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/hooks/summary", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/hooks/summary");

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("request body should be readable");
        let response = Response::from_string(r#"{"queued":true}"#)
            .with_status_code(202)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
        request.respond(response).expect("response should succeed");
        body
    });

    let payload = sample_payload();
    let client = WebhookClient::new(&addr, Duration::from_secs(1))?;
    client.dispatch(&payload)?;

    let body = handle
        .join()
        .map_err(|_| anyhow!("server thread panicked"))?;
    let json: serde_json::Value = serde_json::from_str(&body)?;
    assert_eq!(json["email"], "user@example.com");
    assert_eq!(json["subject"], SUBJECT);
    assert_eq!(json["submitted_at"], "1970-01-01T00:00:00Z");
    assert_eq!(
        json["answers"].as_array().map(Vec::len),
        Some(payload.answers.len())
    );
    assert!(
        json["text"]
            .as_str()
            .is_some_and(|text| text.contains("Your answers"))
    );
    Ok(())
}

#[test]
fn non_success_status_surfaces_server_message() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/summary", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string(r#"{"error":{"message":"mailbox full"}}"#)
            .with_status_code(422)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
        request.respond(response).expect("response should succeed");
    });

    let client = WebhookClient::new(&addr, Duration::from_secs(1))?;
    let error = client
        .send(&sample_payload())
        .expect_err("422 should fail");
    assert_eq!(error.to_string(), "server error (422): mailbox full");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn simulated_dispatcher_always_accepts() -> Result<()> {
    SimulatedDispatcher.dispatch(&sample_payload())
}
