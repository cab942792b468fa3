// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, info};
use url::Url;
use workbook_app::{SummaryPayload, WORKBOOK_TITLE};

pub const SUBJECT: &str = "Your workbook summary: The First Step";

/// Sends a compiled summary to whatever delivers it.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, payload: &SummaryPayload) -> Result<()>;
}

/// Accepts every payload without leaving the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedDispatcher;

impl Dispatcher for SimulatedDispatcher {
    fn dispatch(&self, payload: &SummaryPayload) -> Result<()> {
        debug!(
            answers = payload.answers.len(),
            values = payload.values.len(),
            "simulated summary dispatch"
        );
        Ok(())
    }
}

/// Posts the summary as JSON to a mail-dispatch webhook.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    endpoint: Url,
    http: HttpClient,
}

impl WebhookClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { endpoint, http })
    }

    pub fn send(&self, payload: &SummaryPayload) -> Result<()> {
        let request = DispatchRequest {
            payload,
            subject: SUBJECT,
            text: render_summary_text(payload),
        };
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .map_err(|error| connection_error(&self.endpoint, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        info!(endpoint = %self.endpoint, status = status.as_u16(), "summary dispatched");
        Ok(())
    }
}

impl Dispatcher for WebhookClient {
    fn dispatch(&self, payload: &SummaryPayload) -> Result<()> {
        self.send(payload)
    }
}

/// Validates a webhook endpoint: absolute `http` or `https` URL with a host.
pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("dispatch.endpoint must not be empty -- set it or disable [dispatch]");
    }
    let url = Url::parse(trimmed)
        .with_context(|| format!("dispatch.endpoint {trimmed:?} is not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "dispatch.endpoint must use http or https, got {:?}",
            url.scheme()
        );
    }
    if url.host_str().is_none_or(str::is_empty) {
        bail!("dispatch.endpoint {trimmed:?} has no host");
    }
    Ok(url)
}

/// Plain-text body of the summary email.
pub fn render_summary_text(payload: &SummaryPayload) -> String {
    let mut out = String::new();
    out.push_str(WORKBOOK_TITLE);
    out.push_str(" -- your summary\n");
    out.push_str(&format!(
        "Compiled {}\n",
        format_human_date(payload.submitted_at)
    ));

    out.push_str("\n## Values you circled\n\n");
    if payload.values.is_empty() {
        out.push_str("(none selected)\n");
    } else {
        for value in &payload.values {
            out.push_str(&format!("- {value}\n"));
        }
    }

    out.push_str("\n## Your answers\n");
    if payload.answers.is_empty() {
        out.push_str("\n(no answers recorded)\n");
    }
    let mut current_page = None;
    for answer in &payload.answers {
        if current_page != Some(answer.page) {
            out.push_str(&format!("\n### Page {}\n", answer.page));
            current_page = Some(answer.page);
        }
        out.push_str(&format!("\n{}\n  {}\n", answer.prompt, answer.answer));
    }

    out.push_str("\nClarity usually comes in stages -- not all at once.\n");
    out
}

fn format_human_date(value: OffsetDateTime) -> String {
    value
        .date()
        .format(&time::macros::format_description!(
            "[month repr:long] [day], [year]"
        ))
        .unwrap_or_else(|_| "today".to_owned())
}

fn connection_error(endpoint: &Url, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check [dispatch].endpoint and that the service is running ({})",
        endpoint,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<NestedErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), error.message);
    }

    if let Ok(parsed) = serde_json::from_str::<FlatErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), error);
    }

    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Serialize)]
struct DispatchRequest<'a> {
    #[serde(flatten)]
    payload: &'a SummaryPayload,
    subject: &'a str,
    text: String,
}

#[derive(Debug, Deserialize)]
struct NestedErrorEnvelope {
    error: Option<NestedErrorBody>,
}

#[derive(Debug, Deserialize)]
struct NestedErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct FlatErrorEnvelope {
    error: Option<String>,
}
