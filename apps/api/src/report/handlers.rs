use axum::{extract::State, Json};
use tracing::info;

use crate::applications::lifecycle::list_applications;
use crate::errors::AppError;
use crate::models::resume::ResumeVersion;
use crate::report::{render_report, Report};
use crate::state::AppState;
use crate::store::{find_all, Collection, Query};

/// GET /api/applications/export-for-llm
///
/// Applications are loaded newest first, so the detail section covers the
/// most recent ones.
pub async fn handle_export_for_llm(
    State(state): State<AppState>,
) -> Result<Json<Report>, AppError> {
    let applications = list_applications(state.docs.as_ref()).await?;
    let resumes: Vec<ResumeVersion> = find_all(
        state.docs.as_ref(),
        Collection::ResumeVersions,
        &Query::all().newest_first("created_at"),
    )
    .await?;

    let report = render_report(&applications, &resumes, &state.config.statuses);
    info!(
        applications = applications.len(),
        resumes = resumes.len(),
        bytes = report.text.len(),
        "Rendered LLM export"
    );
    Ok(Json(report))
}
