//! Markdown report generation
//!
//! This module renders a finished crawl as a human-readable markdown report:
//! run parameters, statistics, downloaded pages and errors.

use crate::output::stats::CrawlStatistics;
use crate::state::CrawlResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Run parameters shown at the top of a report
#[derive(Debug, Clone)]
pub struct ReportInfo {
    pub seed: String,
    pub max_depth: u32,
    pub elapsed: Duration,
    pub config_hash: Option<String>,
}

/// Writes a markdown report to `output_path`
pub fn write_markdown_report(
    info: &ReportInfo,
    result: &CrawlResult,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_report(info, result);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl result as markdown
///
/// Pages and errors are sorted by URL so reports of the same crawl compare
/// equal regardless of completion order.
pub fn format_markdown_report(info: &ReportInfo, result: &CrawlResult) -> String {
    let stats = CrawlStatistics::from_result(result);
    let mut md = String::new();

    md.push_str("# DepthCrawl Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", info.seed));
    md.push_str(&format!("- **Max Depth**: {}\n", info.max_depth));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        info.elapsed.as_secs_f64()
    ));
    if let Some(hash) = &info.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Statistics\n\n");
    md.push_str(&format!("- **Pages Reached**: {}\n", stats.total_pages));
    md.push_str(&format!("- **Downloaded**: {}\n", stats.downloaded));
    md.push_str(&format!("- **Unique Hosts**: {}\n", stats.unique_hosts));
    md.push_str(&format!("- **Errors**: {}\n", stats.total_errors()));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    md.push_str("| Error Kind | Count |\n");
    md.push_str("|------------|-------|\n");
    for (kind, count) in &stats.errors_by_kind {
        md.push_str(&format!("| {} | {} |\n", kind, count));
    }
    md.push('\n');

    let mut downloaded: Vec<&String> = result.downloaded.iter().collect();
    downloaded.sort();
    md.push_str(&format!("## Downloaded Pages ({})\n\n", downloaded.len()));
    for url in downloaded {
        md.push_str(&format!("- {}\n", url));
    }
    md.push('\n');

    if !result.errors.is_empty() {
        let mut errors: Vec<_> = result.errors.iter().collect();
        errors.sort_by(|a, b| a.0.cmp(b.0));

        md.push_str(&format!("## Errors ({})\n\n", errors.len()));
        md.push_str("| URL | Kind | Detail |\n");
        md.push_str("|-----|------|--------|\n");
        for (url, error) in errors {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                url,
                error.kind(),
                error.message().replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    md
}
