use crate::config::RunConfig;
use crate::error::Result;
use crate::model::{ContributionSeries, HeatmapArtifact, SeriesSnapshot, SummaryStats, Theme, SCHEMA_VERSION};
use crate::readme::patch_document;
use crate::summary::{document_block, render_summary};
use crate::util::{link_from, write_atomic};
use console::style;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DocumentPatch {
    pub path: PathBuf,
    pub before: String,
    pub after: String,
}

impl DocumentPatch {
    pub fn is_unchanged(&self) -> bool {
        self.before == self.after
    }
}

/// Everything one run will persist, fully computed before anything is written.
#[derive(Debug, Clone)]
pub struct PublishPlan {
    pub files: Vec<PlannedFile>,
    pub document: DocumentPatch,
}

/// Build the snapshot, summary, artifact files and patched document in memory.
/// Fails with `MarkerNotFound` before any file is touched.
pub fn plan(
    config: &RunConfig,
    login: &str,
    series: &ContributionSeries,
    stats: &SummaryStats,
    artifacts: &[HeatmapArtifact],
) -> Result<PublishPlan> {
    let snapshot = SeriesSnapshot {
        version: SCHEMA_VERSION,
        login,
        window: series.window(),
        stats,
        days: series.days(),
    };
    let mut snapshot_json = serde_json::to_string_pretty(&snapshot)?;
    snapshot_json.push('\n');

    let summary = render_summary(stats, series.len());

    let document_dir = config.readme.parent().unwrap_or_else(|| Path::new(""));
    let light = link_from(document_dir, &config.artifact_path(&Theme::Light.file_name()));
    let dark = link_from(document_dir, &config.artifact_path(&Theme::Dark.file_name()));
    let block = document_block(&summary, &light, &dark);

    let before = std::fs::read_to_string(&config.readme)?;
    let after = patch_document(&before, &block, &config.markers)?;

    let mut files = vec![
        PlannedFile {
            path: config.snapshot_path(),
            contents: snapshot_json.into_bytes(),
        },
        PlannedFile {
            path: config.summary_path(),
            contents: summary.into_bytes(),
        },
    ];
    files.extend(artifacts.iter().map(|artifact| PlannedFile {
        path: config.artifact_path(&artifact.theme.file_name()),
        contents: artifact.bytes.clone(),
    }));

    Ok(PublishPlan {
        files,
        document: DocumentPatch {
            path: config.readme.clone(),
            before,
            after,
        },
    })
}

/// Write every planned file, the document last.
pub fn commit(plan: &PublishPlan) -> Result<()> {
    for file in &plan.files {
        write_atomic(&file.path, &file.contents)?;
        info!(path = %file.path.display(), bytes = file.contents.len(), "Wrote artifact");
    }

    if plan.document.is_unchanged() {
        info!(path = %plan.document.path.display(), "Document already up to date");
    } else {
        write_atomic(&plan.document.path, plan.document.after.as_bytes())?;
        info!(path = %plan.document.path.display(), "Patched document");
    }
    Ok(())
}

/// Dry run: list the files and show the document diff without writing.
pub fn preview(plan: &PublishPlan) {
    println!("{}", style("Files that would be written").bold());
    for file in &plan.files {
        println!("  {} ({} bytes)", file.path.display(), file.contents.len());
    }

    println!();
    if plan.document.is_unchanged() {
        println!("{} is already up to date", plan.document.path.display());
        return;
    }

    println!("{}", style(format!("Changes to {}", plan.document.path.display())).bold());
    let diff = TextDiff::from_lines(plan.document.before.as_str(), plan.document.after.as_str());
    for change in diff.iter_all_changes() {
        let line = change.to_string_lossy();
        match change.tag() {
            ChangeTag::Delete => print!("{}", style(format!("-{line}")).red()),
            ChangeTag::Insert => print!("{}", style(format!("+{line}")).green()),
            ChangeTag::Equal => print!(" {line}"),
        }
        if change.missing_newline() {
            println!();
        }
    }
}
