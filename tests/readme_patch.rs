use chrono::NaiveDate;
use contribmap::error::ContribError;
use contribmap::heat::{compute_stats, normalize};
use contribmap::model::{RawActivityRecord, RawEvent, RestrictedPeriod, Window};
use contribmap::readme::{patch_document, Markers};
use contribmap::summary::{document_block, render_summary};
use pretty_assertions::assert_eq;

const DOC: &str = "# Hello\n\nIntro text.\n\n<!--CONTRIB_SUMMARY_START-->\nold summary\nold image\n<!--CONTRIB_SUMMARY_END-->\n\n## Footer\n";

#[test]
fn replaces_only_the_interior() {
    let patched = patch_document(DOC, "fresh\n", &Markers::default()).unwrap();
    assert_eq!(
        patched,
        "# Hello\n\nIntro text.\n\n<!--CONTRIB_SUMMARY_START-->\nfresh\n<!--CONTRIB_SUMMARY_END-->\n\n## Footer\n"
    );
}

#[test]
fn patch_is_idempotent() {
    let once = patch_document(DOC, "block line 1\nblock line 2", &Markers::default()).unwrap();
    let twice = patch_document(&once, "block line 1\nblock line 2", &Markers::default()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn marker_lines_match_with_surrounding_whitespace() {
    let doc = "a\n  <!--CONTRIB_SUMMARY_START-->  \r\nx\n<!--CONTRIB_SUMMARY_END-->\r\nb";
    let patched = patch_document(doc, "y\n", &Markers::default()).unwrap();
    assert_eq!(patched, "a\n  <!--CONTRIB_SUMMARY_START-->  \r\ny\n<!--CONTRIB_SUMMARY_END-->\r\nb");
}

#[test]
fn missing_markers_fail_without_touching_the_document() {
    let doc = "# Hello\n\nNo markers here.\n";
    match patch_document(doc, "x\n", &Markers::default()) {
        Err(ContribError::MarkerNotFound(marker)) => assert_eq!(marker, "<!--CONTRIB_SUMMARY_START-->"),
        other => panic!("expected MarkerNotFound, got {other:?}"),
    }

    let only_start = "<!--CONTRIB_SUMMARY_START-->\nbody\n";
    assert!(matches!(
        patch_document(only_start, "x\n", &Markers::default()),
        Err(ContribError::MarkerNotFound(_))
    ));
}

#[test]
fn end_marker_before_start_marker_is_not_a_pair() {
    let doc = "<!--CONTRIB_SUMMARY_END-->\nmiddle\n<!--CONTRIB_SUMMARY_START-->\n";
    let err = patch_document(doc, "x\n", &Markers::default()).unwrap_err();
    assert_eq!(err.kind(), "marker_not_found");
}

#[test]
fn markers_inside_a_line_do_not_count() {
    let doc = "see <!--CONTRIB_SUMMARY_START--> inline\n<!--CONTRIB_SUMMARY_END-->\n";
    assert!(patch_document(doc, "x\n", &Markers::default()).is_err());
}

#[test]
fn custom_markers() {
    let markers = Markers {
        start: "<!-- heat:begin -->".to_string(),
        end: "<!-- heat:end -->".to_string(),
    };
    let doc = "<!-- heat:begin -->\n<!-- heat:end -->\n";
    let patched = patch_document(doc, "z\n", &markers).unwrap();
    assert_eq!(patched, "<!-- heat:begin -->\nz\n<!-- heat:end -->\n");
}

#[test]
fn summary_follows_the_fixed_template() {
    let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
    let window = Window::trailing(day(7), 7).unwrap();
    let event = |d, category: &str, count| RawEvent {
        date: Some(day(d)),
        category: Some(category.to_string()),
        count: Some(count),
        restricted: false,
        repository: None,
    };
    let raw = RawActivityRecord {
        login: "octocat".to_string(),
        name: None,
        events: vec![
            event(1, "commit", 1),
            event(4, "commit", 2),
            event(4, "issue", 1),
            event(7, "review", 2),
        ],
        restricted_periods: vec![RestrictedPeriod { start: day(5), end: day(6), count: 1200 }],
    };
    let stats = compute_stats(&normalize(&raw, window).unwrap());

    assert_eq!(
        render_summary(&stats, 7),
        "### Contributions (last 7 days)\n\
         - Total contributions: **1206**\n\
         - Current streak: **4** days\n\
         - Longest streak: **4** days\n\
         - Top category: **private**\n\
         - Commits: **3**, Pull requests: **0**, Issues: **1**, Reviews: **2**, Other: **0**\n\
         - Includes anonymized private activity: **1200**\n"
    );
}

#[test]
fn document_block_references_both_themes() {
    let block = document_block("summary\n", "assets/contributions-light.svg", "assets/contributions-dark.svg");
    assert_eq!(
        block,
        "summary\n\n<picture>\n  <source media=\"(prefers-color-scheme: dark)\" srcset=\"assets/contributions-dark.svg\">\n  <img alt=\"Contribution heatmap\" src=\"assets/contributions-light.svg\">\n</picture>\n"
    );
}

#[test]
fn summary_lists_top_public_repositories() {
    let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
    let window = Window::trailing(day(7), 7).unwrap();
    let event = |d, category: &str, count, repository: &str, restricted| RawEvent {
        date: Some(day(d)),
        category: Some(category.to_string()),
        count: Some(count),
        restricted,
        repository: Some(repository.to_string()),
    };
    let raw = RawActivityRecord {
        login: "octocat".to_string(),
        name: None,
        events: vec![
            event(1, "commit", 2, "octo/api", false),
            event(2, "commit", 5, "octo/web", false),
            event(3, "pull-request", 1, "octo/api", false),
            event(4, "review", 1, "friend/lib", false),
            event(5, "commit", 4, "corp/secret", true),
        ],
        restricted_periods: vec![],
    };
    let stats = compute_stats(&normalize(&raw, window).unwrap());

    assert_eq!(
        render_summary(&stats, 7),
        "### Contributions (last 7 days)\n\
         - Total contributions: **13**\n\
         - Current streak: **0** days\n\
         - Longest streak: **5** days\n\
         - Top category: **commits**\n\
         - Commits: **7**, Pull requests: **1**, Issues: **0**, Reviews: **1**, Other: **0**\n\
         - Includes anonymized private activity: **4**\n\
         \n\
         #### Top commit repos\n\
         - **octo/web**: 5\n\
         - **octo/api**: 2\n\
         \n\
         #### Top PR repos\n\
         - **octo/api**: 1\n\
         \n\
         #### Top reviewed repos\n\
         - **friend/lib**: 1\n"
    );
}
