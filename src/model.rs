use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const SCHEMA_VERSION: u32 = 1;

/// Activity categories. Declaration order is the tie-break order for "top category".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Commit,
    PullRequest,
    Issue,
    Review,
    Other,
    /// Restricted entries land here and nowhere else.
    Private,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Commit,
        Category::PullRequest,
        Category::Issue,
        Category::Review,
        Category::Other,
        Category::Private,
    ];

    /// Resolve a public event tag. Unknown non-empty tags count as `Other`.
    /// `private` is reserved for restricted entries and is never resolved from a tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_ascii_lowercase();
        if tag.is_empty() {
            return None;
        }
        Some(match tag.as_str() {
            "commit" | "commits" => Category::Commit,
            "pull-request" | "pull_request" | "pullrequest" | "pr" => Category::PullRequest,
            "issue" | "issues" => Category::Issue,
            "review" | "reviews" | "pull-request-review" => Category::Review,
            _ => Category::Other,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Commit => "commits",
            Category::PullRequest => "pull requests",
            Category::Issue => "issues",
            Category::Review => "reviews",
            Category::Other => "other",
            Category::Private => "private",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive range of calendar days, `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub const MAX_DAYS: u32 = 366;

    /// The trailing `days` ending on `today`, both ends included.
    pub fn trailing(today: NaiveDate, days: u32) -> Option<Self> {
        if days == 0 || days > Self::MAX_DAYS {
            return None;
        }
        let start = today.checked_sub_days(Days::new(u64::from(days) - 1))?;
        Some(Self { start, end: today })
    }

    pub fn len(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Zero-based position of `date` in the window, if inside it.
    pub fn offset(&self, date: NaiveDate) -> Option<usize> {
        self.contains(date)
            .then(|| (date - self.start).num_days() as usize)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.len())
    }

    /// Consecutive sub-windows of at most `max_days` days covering this window.
    pub fn slices(&self, max_days: u32) -> Vec<Window> {
        let step = u64::from(max_days.max(1));
        let mut slices = Vec::new();
        let mut start = self.start;
        while start <= self.end {
            let end = start
                .checked_add_days(Days::new(step - 1))
                .map_or(self.end, |end| end.min(self.end));
            slices.push(Window { start, end });
            match end.succ_opt() {
                Some(next) => start = next,
                None => break,
            }
        }
        slices
    }
}

/// As delivered by the fetcher (or loaded from a fixture). Discarded after aggregation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawActivityRecord {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub restricted_periods: Vec<RestrictedPeriod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub restricted: bool,
    #[serde(default)]
    pub repository: Option<String>,
}

/// Aggregate count for a span of days with no per-day detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictedPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: i64,
}

impl RawActivityRecord {
    /// Public event counts plus every restricted aggregate, as reported.
    /// `None` when the sum does not fit.
    pub fn reported_total(&self) -> Option<i64> {
        self.events
            .iter()
            .map(|e| e.count.unwrap_or(1))
            .chain(self.restricted_periods.iter().map(|p| p.count))
            .try_fold(0i64, |acc, count| acc.checked_add(count))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub counts: BTreeMap<Category, u64>,
    pub total: u64,
}

impl DailyCount {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            counts: BTreeMap::new(),
            total: 0,
        }
    }

    /// Add `amount` under `category`. `None` on overflow, leaving the day unchanged.
    pub fn checked_add(&mut self, category: Category, amount: u64) -> Option<()> {
        if amount == 0 {
            return Some(());
        }
        let total = self.total.checked_add(amount)?;
        let count = self.count(category).checked_add(amount)?;
        self.counts.insert(category, count);
        self.total = total;
        Some(())
    }

    pub fn count(&self, category: Category) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }
}

/// Public per-repository totals, keyed by category then repository name.
pub type RepositoryTotals = BTreeMap<Category, BTreeMap<String, u64>>;

/// Dense, strictly increasing daily series over a window. Only built by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionSeries {
    window: Window,
    days: Vec<DailyCount>,
    repositories: RepositoryTotals,
}

impl ContributionSeries {
    pub(crate) fn from_parts(window: Window, days: Vec<DailyCount>, repositories: RepositoryTotals) -> Self {
        Self {
            window,
            days,
            repositories,
        }
    }

    /// Never contains restricted entries.
    pub fn repositories(&self) -> &RepositoryTotals {
        &self.repositories
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn days(&self) -> &[DailyCount] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.days.iter().map(|d| d.total).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub total: u64,
    pub active_days: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub max_day_total: u64,
    pub busiest_day: Option<NaiveDate>,
    pub category_totals: BTreeMap<Category, u64>,
    pub top_category: Option<Category>,
    /// Busiest public repositories per category, most active first.
    pub top_repositories: BTreeMap<Category, Vec<RepositoryCount>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryCount {
    pub name: String,
    pub count: u64,
}

impl SummaryStats {
    pub fn category_total(&self, category: Category) -> u64 {
        self.category_totals.get(&category).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Light, Theme::Dark];

    pub fn tag(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn file_name(&self) -> String {
        format!("contributions-{}.svg", self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapArtifact {
    pub theme: Theme,
    pub bytes: Vec<u8>,
}

/// Persisted audit copy of one run's series. No wall-clock fields.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSnapshot<'a> {
    pub version: u32,
    pub login: &'a str,
    pub window: Window,
    pub stats: &'a SummaryStats,
    pub days: &'a [DailyCount],
}
