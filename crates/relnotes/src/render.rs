use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::aggregate::Summary;
use crate::error::ConfigError;
use crate::models::{Category, ClassifiedEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Html,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::UnknownVariant {
                kind: "output format",
                value: s.to_string(),
                expected: "text, markdown, html, json",
            }),
        }
    }
}

impl OutputFormat {
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Text => "TEXT",
            OutputFormat::Markdown => "MARKDOWN",
            OutputFormat::Html => "HTML",
            OutputFormat::Json => "JSON",
        }
    }
}

/// Everything a renderer needs for one run
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub source_url: &'a str,
    pub generated_at: DateTime<Utc>,
    pub months: u32,
    pub cutoff: NaiveDate,
    /// Last day of the search range, in the caller's calendar
    pub today: NaiveDate,
    pub entries: &'a [ClassifiedEntry],
    pub summary: &'a Summary,
}

struct DateGroup<'a> {
    date: NaiveDate,
    label: &'a str,
    items: Vec<&'a ClassifiedEntry>,
}

impl<'a> Report<'a> {
    /// Entries grouped by date, newest first; document order within a date
    fn groups(&self) -> Vec<DateGroup<'a>> {
        let mut by_date: BTreeMap<Reverse<NaiveDate>, Vec<&'a ClassifiedEntry>> = BTreeMap::new();
        for entry in self.entries {
            by_date.entry(Reverse(entry.date)).or_default().push(entry);
        }
        by_date
            .into_iter()
            .map(|(Reverse(date), items)| {
                let first: &'a ClassifiedEntry = items[0];
                DateGroup {
                    date,
                    label: first.date_text.as_str(),
                    items,
                }
            })
            .collect()
    }

    fn generated(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

pub struct Renderer;

impl Renderer {
    pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(Self::render_text(report)),
            OutputFormat::Markdown => Ok(Self::render_markdown(report)),
            OutputFormat::Html => Ok(Self::render_html(report)),
            OutputFormat::Json => Self::render_json(report),
        }
    }

    fn render_text(report: &Report) -> String {
        let rule = "=".repeat(80);
        let mut out = String::new();

        out.push_str(&format!("{}\n", rule));
        out.push_str("RELEASE NOTES SUMMARY\n");
        out.push_str(&format!("Source: {}\n", report.source_url));
        out.push_str(&format!("Generated: {}\n", report.generated()));
        out.push_str(&format!(
            "Time range: Last {} months (since {})\n",
            report.months, report.cutoff
        ));
        out.push_str(&format!("{}\n\n", rule));

        if report.summary.is_empty() {
            out.push_str("No updates found in the specified time range.\n");
            return out;
        }

        for group in report.groups() {
            out.push_str(&format!("## {}\n", group.label));
            out.push_str(&format!("{}\n", "-".repeat(40)));
            for entry in group.items {
                out.push_str(&format!(
                    "  [{}] {}\n",
                    entry.category.display_name().to_uppercase(),
                    entry.body_text
                ));
                if !entry.links.is_empty() {
                    out.push_str("    Links:\n");
                    for link in &entry.links {
                        out.push_str(&format!("      - {}\n", link));
                    }
                }
            }
            out.push('\n');
        }

        out.push_str(&format!("{}\n", rule));
        out.push_str("STATISTICS\n");
        out.push_str(&format!("{}\n", "-".repeat(40)));
        out.push_str(&format!("Total releases: {}\n", report.summary.total_releases));
        out.push_str(&format!("Total items: {}\n", report.summary.total_items));
        if let Some(range) = report.summary.date_range {
            out.push_str(&format!("Date range: {} to {}\n", range.earliest, range.latest));
        }
        out.push_str("\nItems by category:\n");
        for (category, count) in report.summary.ranked_categories() {
            out.push_str(&format!("  - {}: {}\n", category, count));
        }

        out
    }

    fn render_markdown(report: &Report) -> String {
        let mut md = String::new();

        md.push_str("# Release Notes Summary\n\n");
        md.push_str(&format!(
            "**Source:** [{}]({})  \n",
            report.source_url, report.source_url
        ));
        md.push_str(&format!("**Generated:** {}  \n", report.generated()));
        md.push_str(&format!(
            "**Time range:** Last {} months (since {})\n\n",
            report.months, report.cutoff
        ));
        md.push_str("---\n\n");

        if report.summary.is_empty() {
            md.push_str("*No updates found in the specified time range.*\n");
            return md;
        }

        for group in report.groups() {
            md.push_str(&format!("## {}\n\n", group.label));
            for entry in group.items {
                md.push_str(&format!("- `{}` {}\n", entry.category.slug(), entry.body_text));
                for link in &entry.links {
                    md.push_str(&format!("  - [Link]({})\n", link));
                }
            }
            md.push('\n');
        }

        md.push_str("---\n\n## Statistics\n\n");
        md.push_str(&format!(
            "- **Total releases:** {}\n",
            report.summary.total_releases
        ));
        md.push_str(&format!("- **Total items:** {}\n", report.summary.total_items));
        if let Some(range) = report.summary.date_range {
            md.push_str(&format!(
                "- **Date range:** {} to {}\n",
                range.earliest, range.latest
            ));
        }
        md.push_str("\n### Items by category\n\n");
        for (category, count) in report.summary.ranked_categories() {
            md.push_str(&format!("- `{}`: {}\n", category.slug(), count));
        }

        md
    }

    fn render_html(report: &Report) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("  <meta charset=\"UTF-8\">\n");
        html.push_str("  <title>Release Notes Summary</title>\n");
        html.push_str("  <style>\n");
        html.push_str("    body { font-family: Arial, sans-serif; max-width: 1000px; margin: 40px auto; padding: 0 20px; line-height: 1.6; background: #f5f5f5; }\n");
        html.push_str("    .header { background: #2c3e50; color: white; padding: 20px 30px; border-radius: 8px; }\n");
        html.push_str("    .header a { color: white; }\n");
        html.push_str("    .release-date { background: white; border-radius: 8px; padding: 20px; margin: 20px 0; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }\n");
        html.push_str("    .release-date h2 { margin-top: 0; border-bottom: 2px solid #3498db; padding-bottom: 10px; }\n");
        html.push_str("    .release-item { margin: 15px 0; padding: 10px; background: #f9f9f9; border-left: 4px solid #ccc; border-radius: 4px; }\n");
        html.push_str("    .category { display: inline-block; padding: 2px 8px; border-radius: 3px; font-size: 0.85em; font-weight: bold; margin-right: 10px; color: white; background: #795548; }\n");
        for (class, color) in [
            ("feature", "#4CAF50"),
            ("preview", "#FF9800"),
            ("fixed", "#00BCD4"),
            ("breaking", "#E91E63"),
            ("security", "#9C27B0"),
            ("deprecated", "#f44336"),
            ("issue", "#ffc107"),
            ("other", "#795548"),
        ] {
            html.push_str(&format!(
                "    .release-item.{0} {{ border-left-color: {1}; }} .category.{0} {{ background: {1}; }}\n",
                class, color
            ));
        }
        html.push_str("    .links { font-size: 0.9em; margin: 5px 0 0 0; }\n");
        html.push_str("    .stats { background: white; border-radius: 8px; padding: 20px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }\n");
        html.push_str("    .no-results { background: #fff3cd; border: 1px solid #ffc107; border-radius: 5px; padding: 20px; margin: 20px 0; text-align: center; }\n");
        html.push_str("  </style>\n");
        html.push_str("</head>\n<body>\n");

        let source = Self::escape_html(report.source_url);
        html.push_str("<div class=\"header\">\n  <h1>Release Notes Summary</h1>\n");
        html.push_str(&format!("  <p>Generated: {}</p>\n", report.generated()));
        html.push_str(&format!(
            "  <p>Source: <a href=\"{}\">{}</a></p>\n",
            source, source
        ));
        html.push_str(&format!(
            "  <p>Time range: Last {} months (since {})</p>\n",
            report.months, report.cutoff
        ));
        html.push_str("</div>\n");

        if report.summary.is_empty() {
            html.push_str("<div class=\"no-results\">\n");
            html.push_str("  <h2>No Release Notes Found</h2>\n");
            html.push_str(&format!(
                "  <p>No release notes were found in the past {} months.</p>\n",
                report.months
            ));
            html.push_str("</div>\n");
        } else {
            for group in report.groups() {
                html.push_str("<div class=\"release-date\">\n");
                html.push_str(&format!(
                    "  <h2>{}</h2>\n",
                    Self::escape_html(group.label)
                ));
                for entry in group.items {
                    let class = entry.category.slug();
                    html.push_str(&format!("  <div class=\"release-item {}\">\n", class));
                    html.push_str(&format!(
                        "    <span class=\"category {}\">{}</span>\n",
                        class,
                        entry.category.display_name().to_uppercase()
                    ));
                    html.push_str(&format!("    {}\n", Self::escape_html(&entry.body_text)));
                    if !entry.links.is_empty() {
                        html.push_str("    <ul class=\"links\">\n");
                        for link in &entry.links {
                            let link = Self::escape_html(link);
                            html.push_str(&format!(
                                "      <li><a href=\"{}\" target=\"_blank\">{}</a></li>\n",
                                link, link
                            ));
                        }
                        html.push_str("    </ul>\n");
                    }
                    html.push_str("  </div>\n");
                }
                html.push_str("</div>\n");
            }
        }

        html.push_str("<div class=\"stats\">\n  <h2>Summary Statistics</h2>\n");
        html.push_str(&format!(
            "  <p><strong>Total Releases:</strong> {}</p>\n",
            report.summary.total_releases
        ));
        html.push_str(&format!(
            "  <p><strong>Total Items:</strong> {}</p>\n",
            report.summary.total_items
        ));
        match report.summary.date_range {
            Some(range) => html.push_str(&format!(
                "  <p><strong>Date Range:</strong> {} to {}</p>\n",
                range.earliest, range.latest
            )),
            None => html.push_str(&format!(
                "  <p><strong>Search Range:</strong> {} to {}</p>\n",
                report.cutoff, report.today
            )),
        }
        let ranked = report.summary.ranked_categories();
        if !ranked.is_empty() {
            html.push_str("  <h3>Items by Category</h3>\n  <ul>\n");
            for (category, count) in ranked {
                html.push_str(&format!(
                    "    <li><strong>{}:</strong> {}</li>\n",
                    category, count
                ));
            }
            html.push_str("  </ul>\n");
        }
        html.push_str("</div>\n");

        html.push_str("</body>\n</html>");
        html
    }

    fn render_json(report: &Report) -> Result<String> {
        #[derive(Serialize)]
        struct Metadata<'a> {
            source: &'a str,
            generated: String,
            time_range_months: u32,
            cutoff_date: NaiveDate,
        }

        #[derive(Serialize)]
        struct Item<'a> {
            text: &'a str,
            category: Category,
            urls: &'a [String],
        }

        #[derive(Serialize)]
        struct Release<'a> {
            date: NaiveDate,
            date_str: &'a str,
            items: Vec<Item<'a>>,
        }

        #[derive(Serialize)]
        struct JsonReport<'a> {
            metadata: Metadata<'a>,
            statistics: &'a Summary,
            releases: Vec<Release<'a>>,
        }

        let releases = report
            .groups()
            .into_iter()
            .map(|group| Release {
                date: group.date,
                date_str: group.label,
                items: group
                    .items
                    .into_iter()
                    .map(|entry| Item {
                        text: &entry.body_text,
                        category: entry.category,
                        urls: &entry.links,
                    })
                    .collect(),
            })
            .collect();

        let output = JsonReport {
            metadata: Metadata {
                source: report.source_url,
                generated: report.generated_at.to_rfc3339(),
                time_range_months: report.months,
                cutoff_date: report.cutoff,
            },
            statistics: report.summary,
            releases,
        };

        serde_json::to_string_pretty(&output).context("Failed to serialize report as JSON")
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use chrono::TimeZone;

    fn entry(date: &str, text: &str, category: Category, links: &[&str]) -> ClassifiedEntry {
        ClassifiedEntry {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            date_text: date.to_string(),
            category,
            body_text: text.to_string(),
            links: links.iter().map(|l| l.to_string()).collect(),
            source_offset: 0,
        }
    }

    fn sample_entries() -> Vec<ClassifiedEntry> {
        vec![
            entry("2025-05-20", "Fixed <script> handling & more", Category::BugFix, &[]),
            entry(
                "2025-06-01",
                "Y is now generally available",
                Category::NewFeature,
                &["https://example.com/y"],
            ),
        ]
    }

    fn report<'a>(entries: &'a [ClassifiedEntry], summary: &'a Summary) -> Report<'a> {
        Report {
            source_url: "https://example.com/release-notes",
            generated_at: Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap(),
            months: 6,
            cutoff: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            today: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            entries,
            summary,
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_text_newest_first_with_stats() {
        let entries = sample_entries();
        let summary = aggregate(&entries);
        let text = Renderer::render(&report(&entries, &summary), OutputFormat::Text).unwrap();

        let june = text.find("## 2025-06-01").unwrap();
        let may = text.find("## 2025-05-20").unwrap();
        assert!(june < may);
        assert!(text.contains("  [NEW FEATURE] Y is now generally available"));
        assert!(text.contains("      - https://example.com/y"));
        assert!(text.contains("Total releases: 2"));
        assert!(text.contains("Total items: 2"));
        assert!(text.contains("Date range: 2025-05-20 to 2025-06-01"));
        assert!(text.contains("Generated: 2025-07-01 12:00:00 UTC"));
    }

    #[test]
    fn test_empty_state_is_distinct() {
        let summary = aggregate(&[]);
        let r = report(&[], &summary);

        let text = Renderer::render(&r, OutputFormat::Text).unwrap();
        assert!(text.contains("No updates found in the specified time range."));
        assert!(!text.contains("STATISTICS"));

        let md = Renderer::render(&r, OutputFormat::Markdown).unwrap();
        assert!(md.contains("*No updates found in the specified time range.*"));

        let html = Renderer::render(&r, OutputFormat::Html).unwrap();
        assert!(html.contains("No Release Notes Found"));
        assert!(html.contains("Search Range:</strong> 2025-01-01 to 2025-07-01"));
    }

    #[test]
    fn test_search_range_ends_on_local_today() {
        let summary = aggregate(&[]);
        let mut r = report(&[], &summary);
        // 01:30 UTC is still the previous evening west of Greenwich
        r.generated_at = Utc.with_ymd_and_hms(2025, 7, 2, 1, 30, 0).unwrap();

        let html = Renderer::render(&r, OutputFormat::Html).unwrap();
        assert!(html.contains("Search Range:</strong> 2025-01-01 to 2025-07-01"));
        assert!(!html.contains("2025-07-02</p>"));
    }

    #[test]
    fn test_markdown_badges_and_links() {
        let entries = sample_entries();
        let summary = aggregate(&entries);
        let md = Renderer::render(&report(&entries, &summary), OutputFormat::Markdown).unwrap();

        assert!(md.contains("- `feature` Y is now generally available"));
        assert!(md.contains("  - [Link](https://example.com/y)"));
        assert!(md.contains("- `fixed`: 1"));
    }

    #[test]
    fn test_html_escapes_page_text() {
        let entries = sample_entries();
        let summary = aggregate(&entries);
        let html = Renderer::render(&report(&entries, &summary), OutputFormat::Html).unwrap();

        assert!(html.contains("Fixed &lt;script&gt; handling &amp; more"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<div class=\"release-item feature\">"));
    }

    #[test]
    fn test_json_shape() {
        let entries = sample_entries();
        let summary = aggregate(&entries);
        let json = Renderer::render(&report(&entries, &summary), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["time_range_months"], 6);
        assert_eq!(value["metadata"]["cutoff_date"], "2025-01-01");
        assert_eq!(value["statistics"]["total_items"], 2);
        assert_eq!(value["statistics"]["by_category"]["KnownIssue"], 0);
        assert_eq!(value["statistics"]["date_range"]["latest"], "2025-06-01");
        assert_eq!(value["releases"][0]["date"], "2025-06-01");
        assert_eq!(value["releases"][0]["items"][0]["category"], "NewFeature");
        assert_eq!(
            value["releases"][0]["items"][0]["urls"][0],
            "https://example.com/y"
        );
    }

    #[test]
    fn test_escape_html_combined() {
        assert_eq!(
            Renderer::escape_html("<a href=\"test\">Click & Go</a>"),
            "&lt;a href=&quot;test&quot;&gt;Click &amp; Go&lt;/a&gt;"
        );
    }
}
