use std::collections::HashMap;

use crate::models::{DetailRecord, DirectoryEntry, GroupProgress, SummaryRecord, TrainingReport};

/// Join detail rows to the directory on email and aggregate progress.
///
/// Detail rows whose email has no directory entry with both a department and
/// a team are dropped; the activation count is taken from the summary report
/// alone and is unaffected by the join.
pub fn join_and_aggregate(
    detail: &[DetailRecord],
    summary: &[SummaryRecord],
    directory: &[DirectoryEntry],
) -> TrainingReport {
    let lookup: HashMap<&str, (&str, &str)> = directory
        .iter()
        .filter(|entry| !entry.department.is_empty() && !entry.team.is_empty())
        .map(|entry| {
            (
                entry.email.as_str(),
                (entry.department.as_str(), entry.team.as_str()),
            )
        })
        .collect();

    let mut departments: HashMap<&str, (f64, usize)> = HashMap::new();
    let mut teams: HashMap<&str, (f64, usize)> = HashMap::new();
    let mut matched_rows = 0usize;

    for record in detail.iter() {
        let Some(&(department, team)) = lookup.get(record.email.as_str()) else {
            continue;
        };
        matched_rows += 1;

        let entry = departments.entry(department).or_insert((0.0, 0));
        entry.0 += record.progress;
        entry.1 += 1;

        let entry = teams.entry(team).or_insert((0.0, 0));
        entry.0 += record.progress;
        entry.1 += 1;
    }

    let activation_count = summary.iter().map(|record| record.activated).sum();

    TrainingReport {
        department_progress: into_sorted_means(departments),
        team_progress: into_sorted_means(teams),
        activation_count,
        matched_rows,
        unmatched_rows: detail.len() - matched_rows,
    }
}

fn into_sorted_means(groups: HashMap<&str, (f64, usize)>) -> Vec<GroupProgress> {
    let mut values: Vec<GroupProgress> = groups
        .into_iter()
        .map(|(group, (total, count))| GroupProgress {
            group: group.to_string(),
            mean_progress: total / count as f64,
            learner_count: count,
        })
        .collect();

    values.sort_by(|a, b| a.group.cmp(&b.group));
    values
}
