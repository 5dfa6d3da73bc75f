// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI summary generation for the Mailtrace tracker.
//!
//! Implements the [`mailtrace_core::Summarizer`] trait against an
//! OpenAI-compatible chat completions API, with a deterministic heuristic
//! fallback so summary generation survives provider outages and missing
//! API keys.

pub mod client;
pub mod fallback;
pub mod types;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use mailtrace_config::model::SummarizerConfig;
use mailtrace_core::types::{EmailSummary, SummaryInput, SummaryPriority};
use mailtrace_core::{MailtraceError, Summarizer};

use crate::client::SummaryClient;
use crate::types::{ChatMessage, ChatRequest, ResponseFormat};

const SYSTEM_PROMPT: &str = "You are a recruitment assistant helping both recruiters and job \
     applicants. For resumes/applications, focus on qualifications and fit. For recruiter \
     messages, focus on next steps and requirements. Be concise but comprehensive.";

/// Summary generator backed by a chat completions API.
///
/// Without an API key the generator skips the network entirely and serves
/// heuristic digests; with one, any terminal API failure degrades to the
/// same heuristic rather than failing the caller.
pub struct OpenAiSummarizer {
    client: Option<SummaryClient>,
    model: String,
    max_tokens: u32,
}

impl OpenAiSummarizer {
    /// Build a summarizer from config.
    pub fn new(config: &SummarizerConfig) -> Result<Self, MailtraceError> {
        let client = match &config.api_key {
            Some(key) => Some(SummaryClient::new(key, &config.base_url)?),
            None => {
                info!("summarizer api_key not configured, serving heuristic digests only");
                None
            }
        };
        Ok(Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    async fn try_api(&self, inputs: &[SummaryInput]) -> Result<EmailSummary, MailtraceError> {
        let client = self.client.as_ref().ok_or_else(|| MailtraceError::Summarizer {
            message: "no API key configured".into(),
            source: None,
        })?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(inputs),
                },
            ],
            max_tokens: self.max_tokens,
            response_format: ResponseFormat::json_object(),
        };

        let content = client.complete_chat(&request).await?;
        parse_summary_payload(&content)
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize_emails(
        &self,
        inputs: &[SummaryInput],
    ) -> Result<EmailSummary, MailtraceError> {
        match self.try_api(inputs).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                warn!(error = %e, "completions API unavailable, using heuristic summary");
                Ok(fallback::heuristic_summary(inputs))
            }
        }
    }
}

/// Assemble the user prompt: instructions plus the emails under analysis.
fn build_prompt(inputs: &[SummaryInput]) -> String {
    let emails_text = inputs
        .iter()
        .map(|email| {
            format!(
                "Subject: {}\nFrom: {}\nTime: {}\nContent: {}",
                email.subject, email.sender, email.timestamp, email.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        "You are helping recruiters and job applicants communicate more efficiently. \
         Analyze these emails and create a helpful summary.\n\n\
         If the email contains a RESUME or JOB APPLICATION, summarize the candidate's key \
         qualifications, experience, and skills so busy recruiters can quickly assess the \
         candidate. If the email is from a RECRUITER or contains JOB-RELATED FEEDBACK, \
         summarize the key points, next steps, and any important dates or deadlines.\n\n\
         Respond with JSON in this exact format:\n\
         {{\n\
           \"title\": \"Brief descriptive title\",\n\
           \"content\": \"Helpful summary focusing on the most important information\",\n\
           \"priority\": \"urgent|normal|low\",\n\
           \"keyPoints\": [\"key point 1\", \"key point 2\", \"key point 3\"]\n\
         }}\n\n\
         Emails to analyze:\n{emails_text}"
    )
}

/// The JSON shape the model is asked to produce.
#[derive(Debug, Deserialize)]
struct SummaryPayload {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default, rename = "keyPoints")]
    key_points: Option<Vec<String>>,
}

/// Parse a completion into an [`EmailSummary`] with field-level defaulting:
/// missing title/content get placeholders, an unrecognized priority becomes
/// `normal`, missing key points become an empty list.
fn parse_summary_payload(content: &str) -> Result<EmailSummary, MailtraceError> {
    let payload: SummaryPayload =
        serde_json::from_str(content).map_err(|e| MailtraceError::Summarizer {
            message: format!("completion was not the requested JSON shape: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(EmailSummary {
        title: payload
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Email Summary".to_string()),
        content: payload
            .content
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "Unable to generate summary".to_string()),
        priority: payload
            .priority
            .as_deref()
            .and_then(|p| p.parse::<SummaryPriority>().ok())
            .unwrap_or(SummaryPriority::Normal),
        key_points: payload.key_points.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_inputs() -> Vec<SummaryInput> {
        vec![SummaryInput {
            subject: "Application for Backend Engineer".to_string(),
            content: "My resume highlights five years of experience.".to_string(),
            sender: "candidate@example.com".to_string(),
            timestamp: "2026-01-01T00:00:00.000Z".to_string(),
        }]
    }

    fn config_for(server_uri: &str) -> SummarizerConfig {
        SummarizerConfig {
            api_key: Some("test-key".to_string()),
            base_url: server_uri.to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 256,
        }
    }

    fn completion_with(content: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content.to_string()},
                "finish_reason": "stop"
            }]
        })
    }

    #[tokio::test]
    async fn api_summary_is_parsed_and_returned() {
        let server = MockServer::start().await;
        let body = completion_with(serde_json::json!({
            "title": "Resume Summary: Backend Engineer",
            "content": "Five years of relevant experience.",
            "priority": "low",
            "keyPoints": ["Experienced", "Good fit"]
        }));
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let summarizer = OpenAiSummarizer::new(&config_for(&server.uri())).unwrap();
        let summary = summarizer.summarize_emails(&test_inputs()).await.unwrap();

        assert_eq!(summary.title, "Resume Summary: Backend Engineer");
        assert_eq!(summary.priority, SummaryPriority::Low);
        assert_eq!(summary.key_points, vec!["Experienced", "Good fit"]);
    }

    #[tokio::test]
    async fn api_failure_falls_back_to_heuristic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let summarizer = OpenAiSummarizer::new(&config_for(&server.uri())).unwrap();
        let summary = summarizer.summarize_emails(&test_inputs()).await.unwrap();

        // Heuristic output for resume-shaped input.
        assert_eq!(summary.title, "Resume Analysis: Backend Engineer");
    }

    #[tokio::test]
    async fn malformed_completion_falls_back_to_heuristic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "id": "chatcmpl-test",
                        "choices": [{
                            "index": 0,
                            "message": {"role": "assistant", "content": "not json at all"},
                            "finish_reason": "stop"
                        }]
                    })),
            )
            .mount(&server)
            .await;

        let summarizer = OpenAiSummarizer::new(&config_for(&server.uri())).unwrap();
        let summary = summarizer.summarize_emails(&test_inputs()).await.unwrap();
        assert_eq!(summary.title, "Resume Analysis: Backend Engineer");
    }

    #[tokio::test]
    async fn missing_api_key_uses_heuristic_directly() {
        let config = SummarizerConfig {
            api_key: None,
            ..config_for("http://unused.invalid")
        };
        let summarizer = OpenAiSummarizer::new(&config).unwrap();
        let summary = summarizer.summarize_emails(&test_inputs()).await.unwrap();
        assert_eq!(summary.title, "Resume Analysis: Backend Engineer");
    }

    #[test]
    fn payload_parsing_defaults_missing_fields() {
        let summary = parse_summary_payload(r#"{"priority": "sideways"}"#).unwrap();
        assert_eq!(summary.title, "Email Summary");
        assert_eq!(summary.content, "Unable to generate summary");
        assert_eq!(summary.priority, SummaryPriority::Normal);
        assert!(summary.key_points.is_empty());
    }

    #[test]
    fn prompt_includes_each_email() {
        let prompt = build_prompt(&test_inputs());
        assert!(prompt.contains("Subject: Application for Backend Engineer"));
        assert!(prompt.contains("From: candidate@example.com"));
        assert!(prompt.contains("keyPoints"));
    }
}
