use super::palette::Palette;
use crate::model::{ContributionSeries, HeatmapArtifact, SummaryStats, Theme};
use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

/// Number of non-empty intensity levels.
pub const BUCKET_COUNT: u64 = 4;

const CELL: u32 = 10;
const GAP: u32 = 3;
const STEP: u32 = CELL + GAP;
const LEFT_GUTTER: u32 = 30;
const TOP_GUTTER: u32 = 20;
const LEGEND_HEIGHT: u32 = 26;
const PADDING: u32 = 8;
/// Room for the legend on short windows.
const MIN_WIDTH: u32 = 160;
const WEEKDAY_LABELS: [(u32, &str); 3] = [(0, "Mon"), (2, "Wed"), (4, "Fri")];

/// `0` for an idle day, otherwise `ceil(total / max * BUCKET_COUNT)` clamped to `1..=BUCKET_COUNT`.
pub fn intensity_level(total: u64, max: u64) -> usize {
    if total == 0 || max == 0 {
        return 0;
    }
    let scaled = total.saturating_mul(BUCKET_COUNT).div_ceil(max);
    scaled.clamp(1, BUCKET_COUNT) as usize
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CellBox {
    x: u32,
    y: u32,
    level: usize,
    date: NaiveDate,
    total: u64,
}

/// Theme-independent layout of the calendar. Both themes paint the same instance.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CalendarGeometry {
    width: u32,
    height: u32,
    grid_bottom: u32,
    cells: Vec<CellBox>,
    months: Vec<(u32, String)>,
    total: u64,
    days: usize,
}

impl CalendarGeometry {
    fn new(series: &ContributionSeries, stats: &SummaryStats) -> Self {
        let window = series.window();
        let first_monday = window
            .start
            .checked_sub_days(Days::new(u64::from(window.start.weekday().num_days_from_monday())))
            .unwrap_or(window.start);
        let column = |date: NaiveDate| ((date - first_monday).num_days() / 7) as u32;
        let columns = column(window.end) + 1;

        let mut cells = Vec::with_capacity(series.len());
        let mut months: Vec<(u32, String)> = Vec::new();
        let mut last_label_column: Option<u32> = None;

        for day in series.days() {
            let col = column(day.date);
            let row = day.date.weekday().num_days_from_monday();
            let x = LEFT_GUTTER + col * STEP;

            if day.date.day() == 1 && last_label_column.map_or(true, |last| col >= last + 3) {
                months.push((x, day.date.format("%b").to_string()));
                last_label_column = Some(col);
            }

            cells.push(CellBox {
                x,
                y: TOP_GUTTER + row * STEP,
                level: intensity_level(day.total, stats.max_day_total),
                date: day.date,
                total: day.total,
            });
        }

        let grid_bottom = TOP_GUTTER + 7 * STEP;
        Self {
            width: (LEFT_GUTTER + columns * STEP + PADDING).max(MIN_WIDTH),
            height: grid_bottom + LEGEND_HEIGHT,
            grid_bottom,
            cells,
            months,
            total: stats.total,
            days: series.len(),
        }
    }

    fn paint(&self, palette: &Palette) -> String {
        let mut svg = String::with_capacity(self.cells.len() * 128 + 1024);

        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" role=\"img\" aria-label=\"{t} contributions in the last {d} days\">\n",
            w = self.width,
            h = self.height,
            t = self.total,
            d = self.days,
        ));
        svg.push_str(&format!(
            "<rect width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            self.width, self.height, palette.background
        ));
        svg.push_str(&format!(
            "<g font-family=\"-apple-system,BlinkMacSystemFont,Segoe UI,Helvetica,Arial,sans-serif\" font-size=\"9\" fill=\"{}\">\n",
            palette.text
        ));
        for (x, label) in &self.months {
            svg.push_str(&format!("<text x=\"{x}\" y=\"{}\">{label}</text>\n", TOP_GUTTER - 6));
        }
        for (row, label) in WEEKDAY_LABELS {
            svg.push_str(&format!(
                "<text x=\"{}\" y=\"{}\">{label}</text>\n",
                PADDING - 4,
                TOP_GUTTER + row * STEP + CELL - 1
            ));
        }
        svg.push_str("</g>\n");

        svg.push_str("<g shape-rendering=\"crispEdges\">\n");
        for cell in &self.cells {
            svg.push_str(&format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{CELL}\" height=\"{CELL}\" rx=\"2\" fill=\"{}\"><title>{}: {} contributions</title></rect>\n",
                cell.x,
                cell.y,
                palette.fill(cell.level),
                cell.date.format("%Y-%m-%d"),
                cell.total
            ));
        }
        svg.push_str("</g>\n");

        self.paint_legend(&mut svg, palette);
        svg.push_str("</svg>\n");
        svg
    }

    fn paint_legend(&self, svg: &mut String, palette: &Palette) {
        let swatches = palette.levels.len() as u32;
        let y = self.grid_bottom + 6;
        let right = self.width - PADDING;
        let more_x = right.saturating_sub(24);
        let first_swatch = more_x.saturating_sub(swatches * STEP + 2);
        let less_x = first_swatch.saturating_sub(26);

        svg.push_str(&format!(
            "<g font-family=\"-apple-system,BlinkMacSystemFont,Segoe UI,Helvetica,Arial,sans-serif\" font-size=\"9\" fill=\"{}\">\n",
            palette.text
        ));
        svg.push_str(&format!("<text x=\"{less_x}\" y=\"{}\">Less</text>\n", y + CELL - 1));
        svg.push_str(&format!("<text x=\"{more_x}\" y=\"{}\">More</text>\n", y + CELL - 1));
        svg.push_str("</g>\n");
        for (i, colour) in palette.levels.iter().enumerate() {
            svg.push_str(&format!(
                "<rect x=\"{}\" y=\"{y}\" width=\"{CELL}\" height=\"{CELL}\" rx=\"2\" fill=\"{colour}\"/>\n",
                first_swatch + i as u32 * STEP
            ));
        }
    }
}

/// Render one theme. Identical inputs give byte-identical output.
pub fn render(series: &ContributionSeries, stats: &SummaryStats, theme: Theme) -> HeatmapArtifact {
    let geometry = CalendarGeometry::new(series, stats);
    paint_artifact(&geometry, theme)
}

/// Render every theme from one shared layout, one thread per theme.
pub fn render_all(series: &ContributionSeries, stats: &SummaryStats) -> Vec<HeatmapArtifact> {
    let geometry = CalendarGeometry::new(series, stats);
    std::thread::scope(|scope| {
        let handles: Vec<_> = Theme::ALL
            .iter()
            .map(|&theme| {
                let geometry = &geometry;
                scope.spawn(move || paint_artifact(geometry, theme))
            })
            .collect();
        handles
            .into_iter()
            .zip(Theme::ALL)
            .map(|(handle, theme)| {
                handle
                    .join()
                    .unwrap_or_else(|_| paint_artifact(&geometry, theme))
            })
            .collect()
    })
}

fn paint_artifact(geometry: &CalendarGeometry, theme: Theme) -> HeatmapArtifact {
    let svg = geometry.paint(&Palette::for_theme(theme));
    debug!(theme = theme.tag(), bytes = svg.len(), "Rendered heatmap");
    HeatmapArtifact {
        theme,
        bytes: svg.into_bytes(),
    }
}
