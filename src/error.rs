use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Everything that can go wrong between receiving an upload and returning
/// the rendered page. Each variant maps to a plain-text response; failures
/// never outlive the request that caused them.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("missing upload: the '{0}' file is required")]
    MissingUpload(&'static str),

    #[error("error reading upload: {0}")]
    Upload(#[from] axum::extract::multipart::MultipartError),

    #[error("error reading {name}: {source}")]
    Ingest {
        name: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("error processing data: {0}")]
    Process(String),

    #[error("error creating visualizations: {0}")]
    Render(String),
}

impl ReportError {
    pub fn status(&self) -> StatusCode {
        match self {
            ReportError::MissingUpload(_)
            | ReportError::Upload(_)
            | ReportError::Ingest { .. }
            | ReportError::Process(_) => StatusCode::BAD_REQUEST,
            ReportError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_errors_are_client_errors() {
        assert_eq!(
            ReportError::MissingUpload("learner_detail").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ReportError::Process("no Progress column".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn render_errors_are_server_errors() {
        assert_eq!(
            ReportError::Render("empty chart area".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_name_the_missing_part() {
        let err = ReportError::MissingUpload("learner_summary");
        assert!(err.to_string().contains("learner_summary"));
    }
}
