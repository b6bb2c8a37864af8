use super::query::{contributions_query, GraphqlError, GraphqlResponse, SLICE_DAYS};
use crate::error::{ContribError, Result};
use crate::model::{RawActivityRecord, Window};
use chrono::SecondsFormat;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, info, instrument};

pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

/// Single-request GraphQL client. No retries; a failed run is retried by the
/// next scheduled invocation.
pub struct GithubClient {
    client: Client,
    endpoint: String,
    token: String,
    show_progress: bool,
}

impl GithubClient {
    pub fn new(endpoint: &str, token: &str, timeout: Duration, show_progress: bool) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ContribError::Auth("access token is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("contribmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ContribError::transport_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
            show_progress,
        })
    }

    /// Fetch the viewer's activity for `window` with one request.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub fn fetch(&self, window: Window) -> Result<RawActivityRecord> {
        let payload = request_payload(window)?;

        let pb = if self.show_progress {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Querying contributions...");
        pb.enable_steady_tick(Duration::from_millis(100));

        let outcome = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("bearer {}", self.token))
            .header(ACCEPT, "application/json")
            .json(&payload)
            .send()
            .and_then(|response| {
                let status = response.status().as_u16();
                response.text().map(|body| (status, body))
            });
        pb.finish_and_clear();

        let (status, body) = outcome?;
        debug!(status, bytes = body.len(), "Received response");

        let record = interpret_response(status, &body, window)?;
        info!(
            login = %record.login,
            events = record.events.len(),
            restricted_periods = record.restricted_periods.len(),
            "Fetched contributions"
        );
        Ok(record)
    }
}

/// Query and variables for `window`, one aliased collection per
/// [`SLICE_DAYS`] slice so no collection spans more than a year.
pub fn request_payload(window: Window) -> Result<Value> {
    let slices = window.slices(SLICE_DAYS);
    let mut variables = Map::new();
    for (i, slice) in slices.iter().enumerate() {
        let from = slice
            .start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| ContribError::Config(format!("Invalid window start {}", slice.start)))?;
        let to = slice
            .end
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| ContribError::Config(format!("Invalid window end {}", slice.end)))?;
        variables.insert(
            format!("from{i}"),
            Value::String(from.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        variables.insert(
            format!("to{i}"),
            Value::String(to.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
    }

    Ok(json!({
        "query": contributions_query(slices.len()),
        "variables": variables,
    }))
}

/// Map an HTTP status and body to a raw record or a classified failure.
pub fn interpret_response(status: u16, body: &str, window: Window) -> Result<RawActivityRecord> {
    match status {
        200..=299 => {}
        401 => {
            return Err(ContribError::Auth(
                "token was rejected (missing, expired or revoked)".to_string(),
            ))
        }
        403 if body.to_ascii_lowercase().contains("rate limit") => {
            return Err(ContribError::transport(format!("rate limited (HTTP {status})")))
        }
        403 => {
            return Err(ContribError::Auth(
                "token lacks the authorization to read contributions".to_string(),
            ))
        }
        _ => {
            return Err(ContribError::transport(format!(
                "endpoint returned HTTP {status}"
            )))
        }
    }

    let response: GraphqlResponse = serde_json::from_str(body)
        .map_err(|e| ContribError::transport_with_source("Malformed response body", e))?;

    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        return Err(classify_errors(&errors));
    }

    let viewer = response
        .data
        .and_then(|data| data.viewer)
        .ok_or_else(|| ContribError::transport("Response is missing `data.viewer`"))?;

    viewer.into_record(&window.slices(SLICE_DAYS))
}

fn classify_errors(errors: &[GraphqlError]) -> ContribError {
    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    let is_auth = errors.iter().any(|e| {
        matches!(
            e.kind.as_deref(),
            Some("FORBIDDEN") | Some("INSUFFICIENT_SCOPES") | Some("UNAUTHORIZED")
        )
    });
    if is_auth {
        ContribError::Auth(message)
    } else {
        ContribError::transport(format!("Query failed: {message}"))
    }
}
