use crate::error::{ContribError, Result};
use crate::model::{Category, ContributionSeries, DailyCount, RawActivityRecord, RepositoryTotals, Window};
use tracing::debug;

/// Turn a raw record into a dense daily series over `window`.
///
/// Public events are counted under their category. Restricted events that
/// carry a day are counted under `Category::Private`; restricted periods are
/// spread over their days with [`distribute`]. Nothing but the numeric count
/// of a restricted entry is read. Repository names of public events are
/// rolled up per category.
pub fn normalize(raw: &RawActivityRecord, window: Window) -> Result<ContributionSeries> {
    let mut days: Vec<DailyCount> = window.days().map(DailyCount::empty).collect();
    let mut repositories = RepositoryTotals::new();
    // Bounds every day, category and series sum below it.
    let mut grand_total = 0u64;

    for (i, event) in raw.events.iter().enumerate() {
        let count = non_negative(event.count.unwrap_or(1), || format!("events[{i}].count"))?;

        let date = event
            .date
            .ok_or_else(|| ContribError::data_shape(format!("events[{i}].date"), "missing date"))?;
        let slot = window.offset(date).ok_or_else(|| {
            ContribError::data_shape(
                format!("events[{i}].date"),
                format!("{date} is outside {}..={}", window.start, window.end),
            )
        })?;

        let category = if event.restricted {
            Category::Private
        } else {
            event
                .category
                .as_deref()
                .and_then(Category::from_tag)
                .ok_or_else(|| {
                    ContribError::data_shape(format!("events[{i}].category"), "missing category")
                })?
        };

        let field = || format!("events[{i}].count");
        grand_total = grand_total.checked_add(count).ok_or_else(|| overflow(field()))?;
        days[slot]
            .checked_add(category, count)
            .ok_or_else(|| overflow(field()))?;

        let repository = event.repository.as_deref().map(str::trim);
        if let Some(name) = repository.filter(|name| !event.restricted && count > 0 && !name.is_empty()) {
            let entry = repositories
                .entry(category)
                .or_default()
                .entry(name.to_string())
                .or_insert(0);
            *entry = entry.checked_add(count).ok_or_else(|| overflow(field()))?;
        }
    }

    for (i, period) in raw.restricted_periods.iter().enumerate() {
        let count = non_negative(period.count, || format!("restricted_periods[{i}].count"))?;
        if period.start > period.end {
            return Err(ContribError::data_shape(
                format!("restricted_periods[{i}].start"),
                format!("start {} is after end {}", period.start, period.end),
            ));
        }
        let first = window.offset(period.start).ok_or_else(|| {
            ContribError::data_shape(
                format!("restricted_periods[{i}].start"),
                format!("{} is outside the window", period.start),
            )
        })?;
        let last = window.offset(period.end).ok_or_else(|| {
            ContribError::data_shape(
                format!("restricted_periods[{i}].end"),
                format!("{} is outside the window", period.end),
            )
        })?;

        let field = || format!("restricted_periods[{i}].count");
        grand_total = grand_total.checked_add(count).ok_or_else(|| overflow(field()))?;
        let shares = distribute(count, last - first + 1);
        for (day, share) in days[first..=last].iter_mut().zip(shares) {
            day.checked_add(Category::Private, share)
                .ok_or_else(|| overflow(field()))?;
        }
    }

    let series = ContributionSeries::from_parts(window, days, repositories);
    validate(&series)?;

    debug!(
        events = raw.events.len(),
        periods = raw.restricted_periods.len(),
        days = series.len(),
        total = series.total(),
        "Normalized contribution series"
    );
    Ok(series)
}

/// Split `total` over `days` slots: every slot gets `total / days` and the
/// last `total % days` slots get one more, so the remainder sits at the end of
/// the period and no slot is more than one away from the floor. The split is a
/// reproducible convention; the true per-day attribution of an aggregate
/// cannot be recovered.
pub fn distribute(total: u64, days: usize) -> Vec<u64> {
    if days == 0 {
        return Vec::new();
    }
    let base = total / days as u64;
    let remainder = (total % days as u64) as usize;
    let mut shares = vec![base; days];
    for share in shares.iter_mut().skip(days - remainder) {
        *share += 1;
    }
    shares
}

/// Check that a series is dense over its window, strictly increasing, and that
/// every day's category counts add up to its total.
pub fn validate(series: &ContributionSeries) -> Result<()> {
    let window = series.window();
    let days = series.days();

    if days.len() != window.len() {
        return Err(ContribError::data_shape(
            "series",
            format!("expected {} days, found {}", window.len(), days.len()),
        ));
    }

    for (i, (day, expected)) in days.iter().zip(window.days()).enumerate() {
        if day.date != expected {
            return Err(ContribError::data_shape(
                format!("series[{i}].date"),
                format!("expected {expected}, found {}", day.date),
            ));
        }
        let by_category: u64 = day.counts.values().sum();
        if by_category != day.total {
            return Err(ContribError::data_shape(
                format!("series[{i}].total"),
                format!("total {} does not match category sum {by_category}", day.total),
            ));
        }
    }

    Ok(())
}

fn overflow(field: String) -> ContribError {
    ContribError::data_shape(field, "count overflows the running total")
}

fn non_negative(value: i64, field: impl FnOnce() -> String) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| ContribError::data_shape(field(), format!("negative count {value}")))
}
