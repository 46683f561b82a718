use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::config::ModerationConfig;
use crate::image::truncate_for_moderation;

const USER_AGENT: &str = "campusreport/0.1.0 (https://github.com/campusreport/campusreport)";

/// Fixed instruction the classifier answers with a SAFE/UNSAFE verdict.
const MODERATION_PROMPT: &str = "This is an image from a campus issue reporting app. \
Please analyze it and determine if it contains any inappropriate content such as \
nudity, adult content, violence, gore, or terrorist content. Only respond with \
'SAFE' if the image is appropriate, or 'UNSAFE: [specific reason]' if it contains \
inappropriate content.";

/// Classification returned by the moderation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationVerdict {
    Safe,
    /// Rejected, with the reason the classifier gave.
    Unsafe(String),
}

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("moderation service replied outside the SAFE/UNSAFE contract: {0:?}")]
    UnrecognizedVerdict(String),
    #[error("moderation response contained no candidate text")]
    EmptyResponse,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Classify a report image before it is attached to a submission.
///
/// Tries each configured model endpoint in order and returns the first
/// verdict obtained. An error means every endpoint failed; the caller
/// decides the fallback (the CLI asks the user to confirm manually).
pub fn verify_image(base64_image: &str, config: &ModerationConfig) -> Result<ModerationVerdict> {
    let api_key = config
        .api_key
        .clone()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .context("No moderation API key configured (set moderation.api_key or GEMINI_API_KEY)")?;

    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;

    let payload = truncate_for_moderation(base64_image);
    let body = json!({
        "contents": [{
            "parts": [
                { "text": MODERATION_PROMPT },
                { "inline_data": { "mime_type": "image/jpeg", "data": payload } }
            ]
        }],
        "generation_config": { "temperature": 0, "max_output_tokens": 50 }
    });

    let mut last_error = None;

    for endpoint in &config.endpoints {
        match query_endpoint(&client, endpoint, &api_key, &body) {
            Ok(verdict) => return Ok(verdict),
            Err(e) => {
                eprintln!("Moderation endpoint {} failed: {:#}", endpoint, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) => Err(e.context("All moderation endpoints failed")),
        None => bail!("No moderation endpoints configured"),
    }
}

fn query_endpoint(
    client: &reqwest::blocking::Client,
    endpoint: &str,
    api_key: &str,
    body: &serde_json::Value,
) -> Result<ModerationVerdict> {
    let response = client
        .post(endpoint)
        .query(&[("key", api_key)])
        .json(body)
        .send()
        .context("Failed to send moderation request")?;

    if !response.status().is_success() {
        bail!(
            "Moderation service returned error status: {}",
            response.status()
        );
    }

    let parsed: GenerateContentResponse = response
        .json()
        .context("Failed to parse moderation JSON response")?;

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or(ModerationError::EmptyResponse)?;

    Ok(parse_verdict(text.trim())?)
}

/// Parse the classifier's free-text reply. The contract is an exact prefix:
/// `SAFE` or `UNSAFE: <reason>`.
fn parse_verdict(text: &str) -> Result<ModerationVerdict, ModerationError> {
    if let Some(rest) = text.strip_prefix("UNSAFE") {
        let reason = rest.trim_start_matches(':').trim();
        return Ok(ModerationVerdict::Unsafe(reason.to_string()));
    }
    if text.starts_with("SAFE") {
        return Ok(ModerationVerdict::Safe);
    }
    Err(ModerationError::UnrecognizedVerdict(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_safe_verdict() {
        assert_eq!(parse_verdict("SAFE").unwrap(), ModerationVerdict::Safe);
        // Models sometimes append punctuation or trailing commentary.
        assert_eq!(parse_verdict("SAFE.").unwrap(), ModerationVerdict::Safe);
    }

    #[test]
    fn test_parse_unsafe_verdict_with_reason() {
        assert_eq!(
            parse_verdict("UNSAFE: depicts graphic violence").unwrap(),
            ModerationVerdict::Unsafe("depicts graphic violence".to_string())
        );
    }

    #[test]
    fn test_parse_unsafe_without_reason() {
        assert_eq!(
            parse_verdict("UNSAFE").unwrap(),
            ModerationVerdict::Unsafe(String::new())
        );
    }

    #[test]
    fn test_unrecognized_reply_is_error() {
        assert!(matches!(
            parse_verdict("I cannot classify this image"),
            Err(ModerationError::UnrecognizedVerdict(_))
        ));
    }

    #[test]
    fn test_parse_generate_content_response() {
        let json = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "SAFE" } ] } }
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let text = parsed.candidates[0].content.parts[0].text.as_deref();
        assert_eq!(text, Some("SAFE"));
    }
}
