use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{NewReport, Report};

const USER_AGENT: &str = "campusreport/0.1.0 (https://github.com/campusreport/campusreport)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure reported by the report backend. The server attaches a message
/// string to rejected requests; it is surfaced to the user verbatim.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{message}")]
    Rejected {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("backend returned error status {0}")]
    Status(reqwest::StatusCode),
}

/// Body shape of backend error replies.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Listing replies come either as a bare array or wrapped in a posts field,
/// depending on backend version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingBody {
    Posts { posts: Vec<Report> },
    Bare(Vec<Report>),
}

/// Blocking client for the report backend's REST endpoints.
pub struct BackendClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Submit a new report. The caller is responsible for having validated
    /// the location against the campus boundary first.
    pub fn submit_report(&self, report: &NewReport) -> Result<()> {
        let url = format!("{}/auth/posts", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(report)
            .send()
            .context("Failed to send report to backend")?;

        Self::check_status(response)?;
        Ok(())
    }

    /// Fetch every report the backend knows about. Status filtering (e.g.
    /// resolved-only) happens client-side.
    pub fn list_reports(&self) -> Result<Vec<Report>> {
        let url = format!("{}/auth/posts", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .context("Failed to fetch reports from backend")?;

        let response = Self::check_status(response)?;
        let body: ListingBody = response
            .json()
            .context("Failed to parse report listing response")?;

        Ok(match body {
            ListingBody::Posts { posts } => posts,
            ListingBody::Bare(posts) => posts,
        })
    }

    pub fn list_resolved(&self) -> Result<Vec<Report>> {
        Ok(self
            .list_reports()?
            .into_iter()
            .filter(Report::is_resolved)
            .collect())
    }

    pub fn delete_report(&self, id: &str) -> Result<()> {
        let url = format!("{}/admin/posts/{}", self.base_url, id);
        let response = self
            .client
            .delete(&url)
            .send()
            .context("Failed to send delete request to backend")?;

        Self::check_status(response)?;
        Ok(())
    }

    /// Attach an "after" photo to a resolved report. `data_uri` is the full
    /// base64 data URI, stored as-is by the backend.
    pub fn attach_solution_image(&self, id: &str, data_uri: &str) -> Result<()> {
        let url = format!("{}/auth/posts/{}/solution-image", self.base_url, id);
        let response = self
            .client
            .put(&url)
            .json(&json!({ "solutionImage": data_uri }))
            .send()
            .context("Failed to send solution image to backend")?;

        Self::check_status(response)?;
        Ok(())
    }

    fn check_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match response.json::<ErrorBody>() {
            Ok(body) => Err(BackendError::Rejected {
                status,
                message: body.message,
            }),
            Err(_) => Err(BackendError::Status(status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_parses_bare_array() {
        let json = r#"[{
            "_id": "1",
            "title": "t",
            "description": "d",
            "location": {"latitude": 19.0, "longitude": 72.0},
            "category": "Others",
            "status": "resolved"
        }]"#;

        let body: ListingBody = serde_json::from_str(json).unwrap();
        let posts = match body {
            ListingBody::Bare(posts) => posts,
            ListingBody::Posts { .. } => panic!("expected bare array"),
        };
        assert_eq!(posts.len(), 1);
        assert!(posts[0].is_resolved());
    }

    #[test]
    fn test_listing_parses_posts_wrapper() {
        let json = r#"{"posts": [{
            "_id": "2",
            "title": "t",
            "description": "d",
            "location": {"latitude": 19.0, "longitude": 72.0},
            "category": "Parking",
            "status": "open"
        }]}"#;

        let body: ListingBody = serde_json::from_str(json).unwrap();
        let posts = match body {
            ListingBody::Posts { posts } => posts,
            ListingBody::Bare(_) => panic!("expected wrapper"),
        };
        assert_eq!(posts[0].id, "2");
        assert!(!posts[0].is_resolved());
    }

    #[test]
    fn test_error_body_message_surfaces() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message": "title is required"}"#).unwrap();
        let err = BackendError::Rejected {
            status: reqwest::StatusCode::BAD_REQUEST,
            message: body.message,
        };
        assert_eq!(err.to_string(), "title is required");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = BackendClient::new("https://reports.example.edu/").unwrap();
        assert_eq!(client.base_url, "https://reports.example.edu");
    }
}
