use std::fmt::Write;

use chrono::Utc;

use crate::error::ReportError;
use crate::models::{GroupProgress, TrainingReport};

const BAR_WIDTH: usize = 48;
const BAR_GAP: usize = 24;
const BAR_AREA_HEIGHT: usize = 160;
const CHART_MARGIN: usize = 40;

/// Static upload page served at `/`.
pub const UPLOAD_FORM: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Training Progress Dashboard</title>
    <style>
        body { font-family: sans-serif; max-width: 640px; margin: 3em auto; color: #222; }
        label { display: block; margin-top: 1.2em; font-weight: bold; }
        input[type=submit] { margin-top: 1.6em; padding: 0.5em 1.4em; }
    </style>
</head>
<body>
    <h1>Training Progress Dashboard</h1>
    <p>Upload the learner detail and learner summary exports to generate
    department and team progress charts.</p>
    <form method="post" action="/upload" enctype="multipart/form-data">
        <label for="learner_detail">Learner detail report (CSV)</label>
        <input type="file" id="learner_detail" name="learner_detail" accept=".csv">
        <label for="learner_summary">Learner summary report (CSV)</label>
        <input type="file" id="learner_summary" name="learner_summary" accept=".csv">
        <input type="submit" value="Generate report">
    </form>
</body>
</html>
"#;

/// Render the results page with one bar chart per aggregate table.
pub fn render_results_page(report: &TrainingReport) -> Result<String, ReportError> {
    let department_chart = render_bar_chart("Department Progress", &report.department_progress)?;
    let team_chart = render_bar_chart("Team Progress", &report.team_progress)?;
    let generated_at = Utc::now().format("%Y-%m-%d %H:%M UTC");

    let mut page = String::new();
    let _ = writeln!(
        page,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Training Progress Report</title>
    <style>
        body {{ font-family: sans-serif; max-width: 960px; margin: 3em auto; color: #222; }}
        .summary {{ background: #f4f6f8; padding: 1em 1.4em; border-radius: 6px; }}
        .chart {{ margin-top: 2em; }}
        .timestamp {{ color: #888; font-size: 0.85em; }}
        a {{ color: #2c6cb0; }}
    </style>
</head>
<body>
    <h1>Training Progress Report</h1>
    <p class="timestamp">Generated: {generated_at}</p>
    <div class="summary">
        <p><strong>{activations}</strong> accounts activated</p>
        <p>{matched} learner rows matched to the directory, {unmatched} without a match</p>
    </div>"#,
        generated_at = generated_at,
        activations = report.activation_count,
        matched = report.matched_rows,
        unmatched = report.unmatched_rows,
    );

    let _ = writeln!(page, "    <div class=\"chart\">{department_chart}</div>");
    let _ = writeln!(page, "    <div class=\"chart\">{team_chart}</div>");
    let _ = writeln!(page, "    <p><a href=\"/\">Upload another report</a></p>");
    let _ = writeln!(page, "</body>\n</html>");

    Ok(page)
}

/// One titled vertical bar chart as inline SVG. An empty table renders a
/// placeholder paragraph instead.
fn render_bar_chart(title: &str, groups: &[GroupProgress]) -> Result<String, ReportError> {
    let mut output = String::new();
    let _ = writeln!(output, "<h2>{}</h2>", escape_html(title));

    if groups.is_empty() {
        let _ = writeln!(output, "<p>No learner rows matched the directory.</p>");
        return Ok(output);
    }

    if let Some(bad) = groups.iter().find(|g| !g.mean_progress.is_finite()) {
        return Err(ReportError::Render(format!(
            "non-finite mean progress for group '{}'",
            bad.group
        )));
    }

    let max_value = groups
        .iter()
        .map(|g| g.mean_progress)
        .fold(0.0f64, f64::max)
        .max(f64::EPSILON);

    let width = CHART_MARGIN * 2 + groups.len() * BAR_WIDTH + (groups.len() - 1) * BAR_GAP;
    let height = BAR_AREA_HEIGHT + 60;
    let baseline = BAR_AREA_HEIGHT + 20;

    let _ = writeln!(
        output,
        r#"<svg width="{width}" height="{height}" viewBox="0 0 {width} {height}" role="img" aria-label="{label}">"#,
        label = escape_html(title),
    );

    for (idx, group) in groups.iter().enumerate() {
        let value = group.mean_progress.max(0.0);
        let bar_height = ((value / max_value) * BAR_AREA_HEIGHT as f64).round() as usize;
        let x = CHART_MARGIN + idx * (BAR_WIDTH + BAR_GAP);
        let y = baseline - bar_height;
        let label_x = x + BAR_WIDTH / 2;

        let _ = writeln!(
            output,
            r##"  <rect x="{x}" y="{y}" width="{BAR_WIDTH}" height="{bar_height}" fill="#2c6cb0"><title>{name}: {value:.2} across {count} learners</title></rect>"##,
            name = escape_html(&group.group),
            count = group.learner_count,
        );
        let _ = writeln!(
            output,
            r#"  <text x="{label_x}" y="{value_y}" text-anchor="middle" font-size="12">{value:.2}</text>"#,
            value_y = y.saturating_sub(6).max(12),
        );
        let _ = writeln!(
            output,
            r#"  <text x="{label_x}" y="{name_y}" text-anchor="middle" font-size="12">{name}</text>"#,
            name_y = baseline + 18,
            name = escape_html(&group.group),
        );
    }

    let _ = writeln!(
        output,
        r##"  <line x1="{x1}" y1="{baseline}" x2="{x2}" y2="{baseline}" stroke="#555"/>"##,
        x1 = CHART_MARGIN / 2,
        x2 = width - CHART_MARGIN / 2,
    );
    let _ = writeln!(output, "</svg>");

    Ok(output)
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, mean: f64, count: usize) -> GroupProgress {
        GroupProgress {
            group: name.to_string(),
            mean_progress: mean,
            learner_count: count,
        }
    }

    fn sample_report() -> TrainingReport {
        TrainingReport {
            department_progress: vec![group("Eng", 0.5, 2)],
            team_progress: vec![group("T1", 1.0, 1), group("T2", 0.0, 1)],
            activation_count: 2,
            matched_rows: 2,
            unmatched_rows: 0,
        }
    }

    #[test]
    fn results_page_embeds_both_charts_and_the_count() {
        let page = render_results_page(&sample_report()).unwrap();
        assert!(page.contains("Department Progress"));
        assert!(page.contains("Team Progress"));
        assert!(page.contains("<strong>2</strong> accounts activated"));
        assert_eq!(page.matches("<svg").count(), 2);
    }

    #[test]
    fn bars_carry_value_and_group_labels() {
        let chart = render_bar_chart("Department Progress", &[group("Eng", 0.5, 2)]).unwrap();
        assert!(chart.contains("<rect"));
        assert!(chart.contains(">0.50</text>"));
        assert!(chart.contains(">Eng</text>"));
    }

    #[test]
    fn empty_table_renders_a_placeholder_instead_of_a_chart() {
        let chart = render_bar_chart("Team Progress", &[]).unwrap();
        assert!(chart.contains("No learner rows matched"));
        assert!(!chart.contains("<svg"));
    }

    #[test]
    fn group_names_are_escaped() {
        let chart = render_bar_chart("Teams", &[group("R&D <core>", 0.4, 1)]).unwrap();
        assert!(chart.contains("R&amp;D &lt;core&gt;"));
        assert!(!chart.contains("<core>"));
    }

    #[test]
    fn non_finite_means_are_a_render_error() {
        let err = render_bar_chart("Teams", &[group("T1", f64::NAN, 1)]).unwrap_err();
        assert!(matches!(err, ReportError::Render(_)));
    }
}
