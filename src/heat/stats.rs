use crate::model::{Category, ContributionSeries, RepositoryCount, SummaryStats};
use std::collections::BTreeMap;

/// Repositories listed per category.
pub const TOP_REPOSITORIES: usize = 10;

/// Single pass over the series.
///
/// The current streak is the run of active days ending on the last day. When
/// the last day has no activity yet, the run ending the day before counts.
pub fn compute_stats(series: &ContributionSeries) -> SummaryStats {
    let mut category_totals: BTreeMap<Category, u64> =
        Category::ALL.iter().map(|&c| (c, 0)).collect();

    let mut total = 0u64;
    let mut active_days = 0u32;
    let mut run = 0u32;
    let mut previous_run = 0u32;
    let mut longest_streak = 0u32;
    let mut max_day_total = 0u64;
    let mut busiest_day = None;

    for day in series.days() {
        total += day.total;
        for (category, count) in &day.counts {
            *category_totals.entry(*category).or_insert(0) += count;
        }

        if day.total > 0 {
            active_days += 1;
            run += 1;
            longest_streak = longest_streak.max(run);
        } else {
            previous_run = run;
            run = 0;
        }

        if day.total > max_day_total {
            max_day_total = day.total;
            busiest_day = Some(day.date);
        }
    }

    // `previous_run` is the run that ended right before the last zero day.
    let current_streak = if run > 0 { run } else { previous_run };

    let top_category = category_totals
        .iter()
        .filter(|(_, &count)| count > 0)
        .fold(None::<(Category, u64)>, |best, (&category, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((category, count)),
        })
        .map(|(category, _)| category);

    let top_repositories = series
        .repositories()
        .iter()
        .map(|(&category, totals)| {
            let mut ranked: Vec<RepositoryCount> = totals
                .iter()
                .map(|(name, &count)| RepositoryCount {
                    name: name.clone(),
                    count,
                })
                .collect();
            // Names are already sorted, so the stable sort breaks ties by name.
            ranked.sort_by(|a, b| b.count.cmp(&a.count));
            ranked.truncate(TOP_REPOSITORIES);
            (category, ranked)
        })
        .collect();

    SummaryStats {
        total,
        active_days,
        current_streak,
        longest_streak,
        max_day_total,
        busiest_day,
        category_totals,
        top_category,
        top_repositories,
    }
}
