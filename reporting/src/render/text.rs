//! Plain-text report

use std::path::{Path, PathBuf};

use report_agent::summary::Domain;

use super::{ensure_parent, RenderError, RenderOutcome, ReportContent, REPORT_TITLE};

/// `<dir>/daily_report_<YYYY-MM-DD>.txt`
pub fn text_report_path(dir: &Path, content: &ReportContent) -> PathBuf {
    dir.join(format!("daily_report_{}.txt", content.date_stamp()))
}

/// Format the text report body
pub fn format_text_report(content: &ReportContent) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} - {}\n", REPORT_TITLE, content.date_stamp()));
    out.push_str(&"-".repeat(50));
    out.push_str("\n\n");

    for (number, domain, body) in [
        (1, Domain::Sales, &content.sales),
        (2, Domain::Marketing, &content.marketing),
    ] {
        let heading = format!("{}. {}", number, domain.heading());
        out.push_str(&heading);
        out.push('\n');
        out.push_str(&"-".repeat(heading.chars().count()));
        out.push('\n');
        out.push_str(body);
        out.push_str("\n\n");
    }

    out
}

/// Write the text report into `dir`
pub fn render_text(content: &ReportContent, dir: &Path) -> RenderOutcome {
    RenderOutcome::from_result("text", write_text_report(content, dir))
}

fn write_text_report(content: &ReportContent, dir: &Path) -> Result<PathBuf, RenderError> {
    let path = text_report_path(dir, content);
    ensure_parent(&path)?;
    std::fs::write(&path, format_text_report(content)).map_err(|e| RenderError::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn content() -> ReportContent {
        ReportContent::new(
            NaiveDate::from_ymd_opt(2025, 8, 26).unwrap(),
            "Revenue grew 5%.",
            "Clicks doubled.",
        )
    }

    #[test]
    fn test_format_layout() {
        let text = format_text_report(&content());
        let expected = "Daily Company Performance Report - 2025-08-26\n\
            --------------------------------------------------\n\
            \n\
            1. Sales Performance Summary\n\
            ----------------------------\n\
            Revenue grew 5%.\n\
            \n\
            2. Marketing Campaign Summary\n\
            -----------------------------\n\
            Clicks doubled.\n\
            \n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_writes_dated_file() {
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("reports");

        let outcome = render_text(&content(), &out_dir);
        let path = outcome.path().unwrap();

        assert_eq!(path, out_dir.join("daily_report_2025-08-26.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), format_text_report(&content()));
    }

    #[test]
    fn test_render_is_idempotent() {
        let dir = tempdir().unwrap();
        let first = render_text(&content(), dir.path());
        let bytes = std::fs::read(first.path().unwrap()).unwrap();

        let second = render_text(&content(), dir.path());
        assert_eq!(first, second);
        assert_eq!(std::fs::read(second.path().unwrap()).unwrap(), bytes);
    }

    #[test]
    fn test_render_reports_failure() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let outcome = render_text(&content(), &blocker);
        assert!(matches!(outcome, RenderOutcome::Failed(_)));
    }
}
