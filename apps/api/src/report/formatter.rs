//! Job-search summary report, rendered as markdown for pasting into an LLM chat.
//!
//! The formatter never reorders its input: detail blocks cover the first
//! [`MAX_DETAILED_APPLICATIONS`] applications in the order given.

use std::borrow::Cow;
use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::application::Application;
use crate::models::resume::ResumeVersion;

pub const MAX_DETAILED_APPLICATIONS: usize = 20;
/// Characters (Unicode scalar values) of job description kept per application.
pub const JOB_DESCRIPTION_LIMIT: usize = 500;
pub const TRUNCATION_MARKER: &str = "...";
pub const REPORT_FORMAT: &str = "markdown";

const FEEDBACK_QUESTIONS: [&str; 4] = [
    "Based on my application patterns, what should I focus on?",
    "Are there any gaps in my job search strategy?",
    "What can I improve in my approach?",
    "Which applications should I prioritize for follow-up?",
];

/// Which statuses count as active, interviewing, offers and rejections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusVocabulary {
    pub active: Vec<String>,
    pub interview: Vec<String>,
    pub offer: String,
    pub rejected: String,
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            active: owned(&["Applied", "Reviewed", "Phone Screen", "Technical", "Onsite"]),
            interview: owned(&["Phone Screen", "Technical", "Onsite"]),
            offer: "Offer".to_string(),
            rejected: "Rejected".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub total: usize,
    pub active: usize,
    pub interview: usize,
    pub offers: usize,
    pub rejections: usize,
    /// Count per status, in order of first appearance.
    pub status_counts: IndexMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub text: String,
    pub format: String,
}

pub fn summarize(applications: &[Application], vocabulary: &StatusVocabulary) -> ReportStats {
    let mut status_counts: IndexMap<String, usize> = IndexMap::new();
    for application in applications {
        *status_counts.entry(application.status.clone()).or_default() += 1;
    }

    let count = |status: &str| status_counts.get(status).copied().unwrap_or(0);
    let sum = |statuses: &[String]| statuses.iter().map(|s| count(s)).sum::<usize>();

    ReportStats {
        total: applications.len(),
        active: sum(&vocabulary.active),
        interview: sum(&vocabulary.interview),
        offers: count(&vocabulary.offer),
        rejections: count(&vocabulary.rejected),
        status_counts,
    }
}

/// Cuts `text` to [`JOB_DESCRIPTION_LIMIT`] characters plus the marker.
/// Cuts on a char boundary, so multi-byte text stays valid.
pub fn truncate_description(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(JOB_DESCRIPTION_LIMIT) {
        Some((cut, _)) => Cow::Owned(format!("{}{TRUNCATION_MARKER}", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

fn or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(fallback)
}

fn or_unknown<'a>(value: &'a str) -> &'a str {
    or(Some(value), "Unknown")
}

fn application_block(application: &Application) -> String {
    let description = truncate_description(application.job_description.as_deref().unwrap_or(""));
    format!(
        "### {} - {}\n\
         - Status: {}\n\
         - Applied: {}\n\
         - Location: {}\n\
         - Company Type: {}\n\
         - Job Description: {}\n",
        or_unknown(&application.company),
        or_unknown(&application.title),
        or_unknown(&application.status),
        or(application.date_applied.as_deref(), "Unknown"),
        or(application.location.as_deref(), "Not specified"),
        or(application.company_type.as_deref(), "Not specified"),
        description,
    )
}

fn resume_block(resume: &ResumeVersion) -> String {
    format!(
        "### {}\n\
         - Target Roles: {}\n\
         - Description: {}\n",
        or(Some(resume.name.as_str()), "Unnamed Resume"),
        or(resume.target_roles.as_deref(), "Not specified"),
        or(resume.description.as_deref(), "No description"),
    )
}

fn join_blocks(blocks: Vec<String>, empty: &str) -> String {
    if blocks.is_empty() {
        format!("{empty}\n")
    } else {
        blocks.join("\n")
    }
}

/// Renders the full report. Deterministic for a given input.
pub fn render_report(
    applications: &[Application],
    resumes: &[ResumeVersion],
    vocabulary: &StatusVocabulary,
) -> Report {
    let stats = summarize(applications, vocabulary);

    let mut text = String::new();
    text.push_str("# Job Search Summary for AI Feedback\n\n");

    text.push_str("## Overview\n");
    let _ = writeln!(text, "Total Applications: {}", stats.total);
    let _ = writeln!(text, "Active Applications: {}", stats.active);
    let _ = writeln!(text, "Interview Stage: {}", stats.interview);
    let _ = writeln!(text, "Offers: {}", stats.offers);
    let _ = writeln!(text, "Rejections: {}", stats.rejections);
    text.push('\n');

    text.push_str("## Applications by Status\n");
    if stats.status_counts.is_empty() {
        text.push_str("No applications yet\n");
    }
    for (status, count) in &stats.status_counts {
        let _ = writeln!(text, "- {status}: {count}");
    }
    text.push('\n');

    text.push_str("## Detailed Application List\n");
    let details = applications
        .iter()
        .take(MAX_DETAILED_APPLICATIONS)
        .map(application_block)
        .collect();
    text.push_str(&join_blocks(details, "No applications yet"));
    text.push('\n');

    text.push_str("## Resume Versions\n");
    let resume_blocks = resumes.iter().map(resume_block).collect();
    text.push_str(&join_blocks(resume_blocks, "No resumes uploaded"));
    text.push('\n');

    text.push_str("## Questions for AI Feedback:\n");
    for (n, question) in FEEDBACK_QUESTIONS.iter().enumerate() {
        let _ = writeln!(text, "{}. {question}", n + 1);
    }

    Report {
        text,
        format: REPORT_FORMAT.to_string(),
    }
}
