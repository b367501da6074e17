#[derive(Debug, Clone)]
pub struct DetailRecord {
    pub email: String,
    pub progress: f64,
}

#[derive(Debug, Clone)]
pub struct SummaryRecord {
    pub activated: i64,
}

#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub email: String,
    pub department: String,
    pub team: String,
}

/// Mean progress for one department or team.
#[derive(Debug, Clone)]
pub struct GroupProgress {
    pub group: String,
    pub mean_progress: f64,
    pub learner_count: usize,
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub department_progress: Vec<GroupProgress>,
    pub team_progress: Vec<GroupProgress>,
    pub activation_count: i64,
    pub matched_rows: usize,
    pub unmatched_rows: usize,
}

/// Where to find the interesting columns in the uploaded reports.
///
/// The export tool we receive these files from has moved columns between
/// versions, so the selection is configuration rather than hard-coded: the
/// email lives at a zero-based position in the detail report, the other two
/// are named headers.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    pub email_column: usize,
    pub progress_column: String,
    pub activated_column: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            email_column: 2,
            progress_column: "Progress".to_string(),
            activated_column: "activated".to_string(),
        }
    }
}
