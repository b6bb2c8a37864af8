use crate::model::{Category, SummaryStats};

/// Per-repository sections, in output order. Only public repositories are listed.
const REPOSITORY_SECTIONS: [(Category, &str); 4] = [
    (Category::Commit, "commit repos"),
    (Category::PullRequest, "PR repos"),
    (Category::Issue, "issue repos"),
    (Category::Review, "reviewed repos"),
];

/// Fixed-template Markdown summary. Plain integers only.
pub fn render_summary(stats: &SummaryStats, window_days: usize) -> String {
    let mut lines = Vec::with_capacity(8);
    lines.push(format!("### Contributions (last {window_days} days)"));
    lines.push(format!("- Total contributions: **{}**", stats.total));
    lines.push(format!("- Current streak: **{}** days", stats.current_streak));
    lines.push(format!("- Longest streak: **{}** days", stats.longest_streak));
    lines.push(format!(
        "- Top category: **{}**",
        stats.top_category.map_or("none", |c| c.label())
    ));
    lines.push(format!(
        "- Commits: **{}**, Pull requests: **{}**, Issues: **{}**, Reviews: **{}**, Other: **{}**",
        stats.category_total(Category::Commit),
        stats.category_total(Category::PullRequest),
        stats.category_total(Category::Issue),
        stats.category_total(Category::Review),
        stats.category_total(Category::Other),
    ));
    let private = stats.category_total(Category::Private);
    if private > 0 {
        lines.push(format!("- Includes anonymized private activity: **{private}**"));
    }

    for (category, title) in REPOSITORY_SECTIONS {
        let Some(repositories) = stats.top_repositories.get(&category).filter(|r| !r.is_empty()) else {
            continue;
        };
        lines.push(String::new());
        lines.push(format!("#### Top {title}"));
        for repository in repositories {
            lines.push(format!("- **{}**: {}", repository.name, repository.count));
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Summary plus a theme-aware `<picture>` pointing at the two heatmaps.
pub fn document_block(summary: &str, light_src: &str, dark_src: &str) -> String {
    let mut block = String::with_capacity(summary.len() + 256);
    block.push_str(summary);
    block.push('\n');
    block.push_str("<picture>\n");
    block.push_str(&format!(
        "  <source media=\"(prefers-color-scheme: dark)\" srcset=\"{dark_src}\">\n"
    ));
    block.push_str(&format!(
        "  <img alt=\"Contribution heatmap\" src=\"{light_src}\">\n"
    ));
    block.push_str("</picture>\n");
    block
}
