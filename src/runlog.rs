//! Human-readable run artifact: one markdown file per run date listing every
//! draft with its scheduled time and content verbatim.

use crate::publish::Draft;
use chrono::DateTime;
use chrono_tz::Tz;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes the run log for `run_date` and returns its path.
///
/// The file is keyed by the run's local calendar date
/// (`<logs_dir>/<YYYY-MM-DD>.md`) and overwritten on rerun.
pub fn write_daily_log(
    log_dir: &Path,
    run_date: DateTime<Tz>,
    drafts: &[Draft],
) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let file_path = log_dir.join(format!("{}.md", run_date.format("%Y-%m-%d")));

    let mut lines: Vec<String> = vec![
        format!("# Posts scheduled for {}", run_date.format("%Y-%m-%d")),
        String::new(),
    ];
    for (index, draft) in drafts.iter().enumerate() {
        lines.push(format!("## Post {}", index + 1));
        lines.push(String::new());
        lines.push(format!("- Scheduled: {}", draft.schedule_date.to_rfc3339()));
        lines.push("- Content:".to_string());
        lines.push(String::new());
        lines.push("```text".to_string());
        lines.push(draft.content.clone());
        lines.push("```".to_string());
        lines.push(String::new());
    }

    fs::write(&file_path, lines.join("\n"))?;
    tracing::info!(path = %file_path.display(), drafts = drafts.len(), "Wrote run log");
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft_at_10z(content: &str) -> Draft {
        Draft {
            content: content.to_string(),
            schedule_date: chrono_tz::UTC.with_ymd_and_hms(2025, 9, 16, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_log_contains_draft_content_verbatim() {
        let dir = std::env::temp_dir().join("dripfeed_runlog_test_content");
        std::fs::create_dir_all(&dir).unwrap();

        let run_date = chrono_tz::UTC.with_ymd_and_hms(2025, 9, 16, 1, 0, 0).unwrap();
        let path = write_daily_log(&dir, run_date, &[draft_at_10z("Example tweet")]).unwrap();

        assert!(path.exists());
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Example tweet"));
        assert!(text.contains("2025-09-16T10:00:00+00:00"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_log_file_keyed_by_run_date() {
        let dir = std::env::temp_dir().join("dripfeed_runlog_test_key");
        std::fs::create_dir_all(&dir).unwrap();

        let run_date = chrono_tz::UTC.with_ymd_and_hms(2025, 9, 16, 1, 0, 0).unwrap();
        let path = write_daily_log(&dir, run_date, &[]).unwrap();

        assert!(path.ends_with("2025-09-16.md"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_directory_created() {
        let dir = std::env::temp_dir()
            .join("dripfeed_runlog_test_mkdir")
            .join("nested");
        std::fs::remove_dir_all(&dir).ok();

        let run_date = chrono_tz::UTC.with_ymd_and_hms(2025, 9, 16, 1, 0, 0).unwrap();
        let path = write_daily_log(&dir, run_date, &[draft_at_10z("content")]).unwrap();
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_sections_numbered_per_draft() {
        let dir = std::env::temp_dir().join("dripfeed_runlog_test_sections");
        std::fs::create_dir_all(&dir).unwrap();

        let run_date = chrono_tz::UTC.with_ymd_and_hms(2025, 9, 16, 1, 0, 0).unwrap();
        let drafts = vec![draft_at_10z("first"), draft_at_10z("second")];
        let path = write_daily_log(&dir, run_date, &drafts).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("## Post 1"));
        assert!(text.contains("## Post 2"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
