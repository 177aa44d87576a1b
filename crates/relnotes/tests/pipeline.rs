//! Full pipeline runs over saved pages: markup → entries → summary → rendered output.

use chrono::{NaiveDate, TimeZone, Utc};
use relnotes::{
    Category, GenericProfile, GoogleCloudProfile, OutputFormat, Pipeline, ProfileChoice,
    Renderer, Report, RuleSet, SiteProfile, TimeWindow,
};
use url::Url;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

fn pipeline(url: &str, profile: &'static dyn SiteProfile, months: i64) -> Pipeline {
    Pipeline::new(
        Url::parse(url).unwrap(),
        profile,
        RuleSet::default(),
        TimeWindow::new(months).unwrap(),
    )
}

#[test]
fn test_changelog_keeps_only_recent_feature() {
    let output = pipeline("https://widgets.example.com/changelog", &GenericProfile, 6)
        .run(&fixture("changelog.html"), today());

    assert_eq!(output.stats.extracted, 2);
    assert_eq!(output.entries.len(), 1);

    let entry = &output.entries[0];
    assert_eq!(entry.date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    assert_eq!(entry.category, Category::NewFeature);
    assert_eq!(
        entry.links,
        vec!["https://widgets.example.com/docs/y".to_string()]
    );

    assert_eq!(output.summary.total_items, 1);
    assert_eq!(output.summary.total_releases, 1);
    assert_eq!(output.summary.by_category[&Category::NewFeature], 1);
    assert_eq!(output.summary.by_category[&Category::BugFix], 0);
}

#[test]
fn test_script_and_footer_dates_are_not_entries() {
    let output = pipeline("https://widgets.example.com/changelog", &GenericProfile, 120)
        .run(&fixture("changelog.html"), today());

    let dates: Vec<&str> = output.entries.iter().map(|e| e.date_text.as_str()).collect();
    assert_eq!(dates, vec!["2025-06-01", "2024-01-10"]);
    assert_eq!(output.entries[1].category, Category::BugFix);
}

#[test]
fn test_google_cloud_page() {
    let url = "https://cloud.google.com/run/docs/release-notes";
    let profile = ProfileChoice::Auto.resolve(&Url::parse(url).unwrap());
    assert_eq!(profile.name(), "google_cloud");

    let output = pipeline(url, profile, 6).run(&fixture("gcp_release_notes.html"), today());

    let categories: Vec<Category> = output.entries.iter().map(|e| e.category).collect();
    assert_eq!(
        categories,
        vec![
            Category::Preview,
            Category::Security,
            Category::BreakingChange,
            Category::Deprecation,
            Category::KnownIssue,
        ]
    );
    assert_eq!(output.stats.extracted, 6);
    assert_eq!(output.stats.outside_window, 1);
    assert_eq!(output.summary.total_releases, 3);
    assert_eq!(output.summary.total_items, 5);
    assert_eq!(
        output.entries[0].links,
        vec!["https://cloud.google.com/run/docs/worker-pools".to_string()]
    );

    let range = output.summary.date_range.unwrap();
    assert_eq!(range.earliest, NaiveDate::from_ymd_opt(2025, 4, 2).unwrap());
    assert_eq!(range.latest, NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
}

#[test]
fn test_page_without_entries_is_empty_summary() {
    for profile in [&GoogleCloudProfile as &'static dyn SiteProfile, &GenericProfile] {
        let output = pipeline("https://widgets.example.com/about", profile, 6)
            .run(&fixture("no_entries.html"), today());

        assert!(output.entries.is_empty());
        assert_eq!(output.summary.total_releases, 0);
        assert_eq!(output.summary.total_items, 0);
        assert!(output.summary.by_category.values().all(|c| *c == 0));
        assert_eq!(output.summary.date_range, None);
    }
}

#[test]
fn test_pipeline_is_idempotent() {
    let markup = fixture("gcp_release_notes.html");
    let url = "https://cloud.google.com/run/docs/release-notes";
    let generated_at = Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap();

    let render = || {
        let output = pipeline(url, &GoogleCloudProfile, 12).run(&markup, today());
        let window = TimeWindow::new(12).unwrap();
        let report = Report {
            source_url: url,
            generated_at,
            months: 12,
            cutoff: window.cutoff(today()),
            today: today(),
            entries: &output.entries,
            summary: &output.summary,
        };
        let json = Renderer::render(&report, OutputFormat::Json).unwrap();
        (output, json)
    };

    let (first, first_json) = render();
    let (second, second_json) = render();
    assert_eq!(first, second);
    assert_eq!(first_json, second_json);
}
