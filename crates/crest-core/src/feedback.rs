//! Feedback submission
//!
//! Posts bug reports and feature requests as JSON to a hosted endpoint.
//! The HTTP call runs on a short-lived thread; the result comes back over
//! an mpsc channel the UI polls. Failures are shown to the user and never
//! retried automatically.

use std::sync::mpsc::{self, Receiver};
use std::thread;

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Default submission endpoint; override with `CREST_FEEDBACK_URL`
pub const DEFAULT_FEEDBACK_URL: &str = "https://crest-issue-poster.workers.dev/report";

const URL_ENV: &str = "CREST_FEEDBACK_URL";
const TOKEN_ENV: &str = "CREST_FEEDBACK_TOKEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Bug,
    Feature,
}

impl ReportKind {
    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Bug => "Bug report",
            ReportKind::Feature => "Feature request",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedbackReport {
    pub kind: ReportKind,
    pub summary: String,
    pub details: String,
    /// Optional contact address
    pub contact: String,
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("summary cannot be empty")]
    EmptySummary,

    #[error("request failed: {0}")]
    Http(String),

    #[error("server rejected report (status {0})")]
    Rejected(u16),
}

/// Submit a report synchronously (called from the background thread)
pub fn submit(report: &FeedbackReport) -> Result<(), FeedbackError> {
    if report.summary.trim().is_empty() {
        return Err(FeedbackError::EmptySummary);
    }

    let url = std::env::var(URL_ENV).unwrap_or_else(|_| DEFAULT_FEEDBACK_URL.to_string());

    let body = json!({
        "kind": report.kind,
        "summary": report.summary.trim(),
        "details": report.details.trim(),
        "contact": report.contact.trim(),
        "app_version": env!("CARGO_PKG_VERSION"),
    });

    let mut request = ureq::post(&url).set("Content-Type", "application/json");
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        request = request.set("Authorization", &format!("Bearer {}", token));
    }

    match request.send_json(body) {
        Ok(response) if response.status() < 300 => Ok(()),
        Ok(response) => Err(FeedbackError::Rejected(response.status())),
        Err(ureq::Error::Status(code, _)) => Err(FeedbackError::Rejected(code)),
        Err(e) => Err(FeedbackError::Http(e.to_string())),
    }
}

/// Submit on a background thread; poll the receiver from the UI tick
pub fn submit_in_background(report: FeedbackReport) -> Receiver<Result<(), String>> {
    let (tx, rx) = mpsc::channel();
    let builder = thread::Builder::new().name("feedback-submit".to_string());
    let spawned = builder.spawn(move || {
        let result = submit(&report).map_err(|e| e.to_string());
        let _ = tx.send(result);
    });
    if let Err(e) = spawned {
        log::error!("Failed to spawn feedback thread: {}", e);
    }
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary_rejected() {
        let report = FeedbackReport {
            kind: ReportKind::Bug,
            summary: "   ".to_string(),
            details: "details".to_string(),
            contact: String::new(),
        };
        assert!(matches!(submit(&report), Err(FeedbackError::EmptySummary)));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&ReportKind::Bug).unwrap(), "\"bug\"");
        assert_eq!(
            serde_json::to_string(&ReportKind::Feature).unwrap(),
            "\"feature\""
        );
    }
}
