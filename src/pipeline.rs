use crate::cli::{CommonArgs, SourceArgs};
use crate::config::RunConfig;
use crate::error::{ContribError, Result};
use crate::github::GithubClient;
use crate::heat::{compute_stats, normalize, output_heatmap, output_json, render_all};
use crate::model::{ContributionSeries, HeatmapArtifact, RawActivityRecord, SummaryStats, Window};
use crate::publish;
use std::path::Path;
use tracing::info;

/// Aggregated and rendered output of one run, not yet persisted.
pub struct Generated {
    pub login: String,
    pub series: ContributionSeries,
    pub stats: SummaryStats,
    pub artifacts: Vec<HeatmapArtifact>,
}

/// Aggregator then renderer. The raw record is consumed here.
pub fn generate(raw: RawActivityRecord, window: Window) -> Result<Generated> {
    let series = normalize(&raw, window)?;
    let stats = compute_stats(&series);
    info!(
        days = series.len(),
        total = stats.total,
        current_streak = stats.current_streak,
        longest_streak = stats.longest_streak,
        "Aggregated contributions"
    );

    let artifacts = render_all(&series, &stats);
    Ok(Generated {
        login: raw.login,
        series,
        stats,
        artifacts,
    })
}

pub fn exec_run(common: &CommonArgs, source: &SourceArgs) -> Result<()> {
    let config = RunConfig::from_args(common)?;
    let raw = fetch_live(source, config.window, !common.quiet)?;
    publish_generated(&config, generate(raw, config.window)?)
}

pub fn exec_render(common: &CommonArgs, input: &Path) -> Result<()> {
    let config = RunConfig::from_args(common)?;
    let raw = load_raw(input)?;
    publish_generated(&config, generate(raw, config.window)?)
}

pub fn exec_stats(
    common: &CommonArgs,
    source: &SourceArgs,
    input: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = RunConfig::from_args(common)?;
    let raw = match input {
        Some(path) => load_raw(path)?,
        None => fetch_live(source, config.window, !common.quiet && !json)?,
    };
    let series = normalize(&raw, config.window)?;
    let stats = compute_stats(&series);

    if json {
        output_json(&raw.login, &series, &stats)
    } else {
        output_heatmap(&raw.login, &series, &stats)
    }
}

/// Load a raw record saved as JSON, for offline rendering.
pub fn load_raw(path: &Path) -> Result<RawActivityRecord> {
    let text = std::fs::read_to_string(path)?;
    let raw: RawActivityRecord = serde_json::from_str(&text)?;
    info!(path = %path.display(), events = raw.events.len(), "Loaded raw record");
    Ok(raw)
}

fn fetch_live(source: &SourceArgs, window: Window, show_progress: bool) -> Result<RawActivityRecord> {
    let token = source
        .token
        .as_deref()
        .ok_or_else(|| ContribError::Auth("GITHUB_TOKEN is not set".to_string()))?;
    let client = GithubClient::new(&source.endpoint, token, source.timeout, show_progress)?;
    client.fetch(window)
}

fn publish_generated(config: &RunConfig, generated: Generated) -> Result<()> {
    let plan = publish::plan(
        config,
        &generated.login,
        &generated.series,
        &generated.stats,
        &generated.artifacts,
    )?;

    if config.dry_run {
        publish::preview(&plan);
        return Ok(());
    }
    publish::commit(&plan)
}
