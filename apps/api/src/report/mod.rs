// Job-search report for external LLM feedback.
// Pure rendering lives in formatter; handlers only load the collections.

pub mod formatter;
pub mod handlers;

pub use formatter::{render_report, Report, StatusVocabulary};
