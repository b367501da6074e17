use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::aggregate::join_and_aggregate;
use crate::error::ReportError;
use crate::ingest;
use crate::models::{ColumnMapping, DirectoryEntry};
use crate::report;

/// Shared across requests: the directory loaded at startup and the column
/// mapping from the CLI. Nothing here is mutated after startup.
pub struct AppState {
    pub directory: Vec<DirectoryEntry>,
    pub mapping: ColumnMapping,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let app = build_router(state);

    info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(report::UPLOAD_FORM)
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Html<String>, ReportError> {
    let mut detail_bytes: Option<Vec<u8>> = None;
    let mut summary_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("learner_detail") => detail_bytes = Some(field.bytes().await?.to_vec()),
            Some("learner_summary") => summary_bytes = Some(field.bytes().await?.to_vec()),
            _ => {}
        }
    }

    let page = run_report(
        detail_bytes.as_deref(),
        summary_bytes.as_deref(),
        &state.directory,
        &state.mapping,
    )
    .inspect_err(|err| warn!("rejected upload: {err}"))?;

    Ok(Html(page))
}

/// The whole request pipeline: parse both uploads, join against the
/// directory, render the page. A part that arrived empty counts as missing,
/// which is how browsers submit a form with no file chosen.
pub fn run_report(
    detail_bytes: Option<&[u8]>,
    summary_bytes: Option<&[u8]>,
    directory: &[DirectoryEntry],
    mapping: &ColumnMapping,
) -> Result<String, ReportError> {
    let detail_bytes = detail_bytes
        .filter(|bytes| !bytes.is_empty())
        .ok_or(ReportError::MissingUpload("learner_detail"))?;
    let summary_bytes = summary_bytes
        .filter(|bytes| !bytes.is_empty())
        .ok_or(ReportError::MissingUpload("learner_summary"))?;

    let detail = ingest::read_detail(detail_bytes, mapping)?;
    let summary = ingest::read_summary(summary_bytes, mapping)?;

    let results = join_and_aggregate(&detail, &summary, directory);
    info!(
        matched = results.matched_rows,
        unmatched = results.unmatched_rows,
        activations = results.activation_count,
        "report generated"
    );

    report::render_results_page(&results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Vec<DirectoryEntry> {
        vec![
            DirectoryEntry {
                email: "a@x.com".to_string(),
                department: "Eng".to_string(),
                team: "T1".to_string(),
            },
            DirectoryEntry {
                email: "b@x.com".to_string(),
                department: "Eng".to_string(),
                team: "T2".to_string(),
            },
        ]
    }

    #[test]
    fn pipeline_produces_the_results_page() {
        let detail: &[u8] =
            b"Name,Course,Email,Progress\nAvery,Onboarding,a@x.com,1.0\nJules,Onboarding,b@x.com,0.0\n";
        let summary: &[u8] = b"Name,activated\nAvery,1\nJules,1\n";

        let page = run_report(
            Some(detail),
            Some(summary),
            &directory(),
            &ColumnMapping::default(),
        )
        .unwrap();

        assert!(page.contains("<strong>2</strong> accounts activated"));
        assert!(page.contains("Department Progress"));
        assert!(page.contains(">Eng</text>"));
    }

    #[test]
    fn absent_detail_part_is_a_missing_upload() {
        let summary: &[u8] = b"Name,activated\nAvery,1\n";
        let err = run_report(None, Some(summary), &directory(), &ColumnMapping::default())
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingUpload("learner_detail")));
    }

    #[test]
    fn empty_summary_part_counts_as_missing() {
        let detail: &[u8] = b"Name,Course,Email,Progress\nAvery,Onboarding,a@x.com,1.0\n";
        let empty: &[u8] = b"";
        let err = run_report(Some(detail), Some(empty), &directory(), &ColumnMapping::default())
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingUpload("learner_summary")));
    }

    #[test]
    fn bad_detail_upload_fails_before_rendering() {
        let detail: &[u8] = b"Name,Course,Email,Score\nAvery,Onboarding,a@x.com,1.0\n";
        let summary: &[u8] = b"Name,activated\nAvery,1\n";
        let err = run_report(
            Some(detail),
            Some(summary),
            &directory(),
            &ColumnMapping::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Process(_)));
    }
}
