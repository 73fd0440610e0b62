//! JSON dump of the collected digest records.
//!
//! # Output Structure
//!
//! Files are grouped by local date, one file per keyword and time range:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── mixture-of-experts_past-week.json
//!     └── llm-agent_past-24h.json
//! ```
//!
//! Running the same query twice on one day overwrites the earlier file.

use crate::models::DigestResults;
use crate::utils::{ensure_writable_dir, slugify_title};
use chrono::Local;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `results` under `json_output_dir` and return the file path.
///
/// # Output Path
///
/// `{json_output_dir}/{local date}/{keyword slug}_{time range slug}.json`
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_digest(
    results: &DigestResults,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(results)?;

    let full_json_dir = format!(
        "{}/{}",
        json_output_dir.trim_end_matches('/'),
        Local::now().date_naive()
    );
    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = ensure_writable_dir(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "JSON output directory is not writable");
        return Err(e);
    }

    let path = PathBuf::from(&full_json_dir).join(file_name(results));
    info!(path = %path.display(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path.display(), papers = results.papers.len(), "Wrote digest JSON");

    Ok(path)
}

fn file_name(results: &DigestResults) -> String {
    let keywords = match slugify_title(&results.keywords) {
        slug if slug.is_empty() => "digest".to_string(),
        slug => slug,
    };
    format!("{}_{}.json", keywords, slugify_title(results.time_range.label()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleRecord, TimeRange, TimeWindow};
    use chrono::{TimeZone, Utc};

    fn results(keywords: &str) -> DigestResults {
        let now = Utc.with_ymd_and_hms(2025, 5, 8, 12, 0, 0).unwrap();
        DigestResults {
            keywords: keywords.to_string(),
            time_range: TimeRange::PastWeek,
            window: TimeWindow::ending_at(now, TimeRange::PastWeek),
            papers: Vec::new(),
            tech_blogs: vec![ArticleRecord {
                title: "Serving sparse models".to_string(),
                url: "https://huggingface.co/blog/moe-serving".to_string(),
                publish_date: Utc.with_ymd_and_hms(2025, 5, 6, 0, 0, 0).unwrap(),
                summary: "How to serve them.".to_string(),
                source_name: "Hugging Face".to_string(),
            }],
            news: Vec::new(),
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(&results("Mixture of Experts")), "mixture-of-experts_past-week.json");
        assert_eq!(file_name(&results("???")), "digest_past-week.json");
    }

    #[tokio::test]
    async fn test_write_digest() {
        let dir = std::env::temp_dir().join(format!("ai_focus_digest_json_{}", std::process::id()));
        let dir = dir.to_string_lossy().to_string();

        let path = write_digest(&results("MoE"), &dir).await.unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).await.unwrap()).unwrap();

        assert!(path.ends_with("moe_past-week.json"));
        assert_eq!(written["keywords"], "MoE");
        assert_eq!(written["time_range"], "past week");
        assert_eq!(written["tech_blogs"][0]["source_name"], "Hugging Face");

        let _ = fs::remove_dir_all(&dir).await;
    }
}
