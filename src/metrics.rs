use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveDate};

use crate::config::{AggregationConfig, WindowIndexing};
use crate::error::AggregateError;
use crate::models::{RawDailyRecord, RegionDayMetric, Status};
use crate::regions::RegionTable;
use crate::sampling;

/// Date layout used by the daily feed, e.g. `14-Mar-20`.
pub const FEED_DATE_FORMAT: &str = "%d-%b-%y";

#[derive(Debug, Default)]
struct DayCounts {
    confirmed: Option<u64>,
    resolved: u64,
}

pub fn parse_feed_date(value: &str, region: &str) -> Result<NaiveDate, AggregateError> {
    NaiveDate::parse_from_str(value.trim(), FEED_DATE_FORMAT).map_err(|_| {
        AggregateError::DateParse {
            value: value.to_string(),
            region: region.to_string(),
        }
    })
}

/// Parses a daily count; the feed leaves missing values empty, which count as zero.
pub fn parse_count(value: &str, region: &str, date: &str) -> Result<u64, AggregateError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    trimmed.parse::<u64>().map_err(|_| AggregateError::CountParse {
        value: value.to_string(),
        region: region.to_string(),
        date: date.to_string(),
    })
}

pub fn format_feed_date(date: NaiveDate) -> String {
    date.format(FEED_DATE_FORMAT).to_string()
}

/// Turns the flat feed into per-region daily metrics, ordered by region code then date.
///
/// Dates without a Confirmed record are dropped for that region, even when recovered or
/// deceased counts exist for them. When sampling is configured the result only keeps rows
/// whose date survives [`sampling::retain_dates`] over all regions' distinct dates.
pub fn aggregate(
    records: &[RawDailyRecord],
    regions: &RegionTable,
    config: &AggregationConfig,
) -> Result<Vec<RegionDayMetric>, AggregateError> {
    let mut by_region: BTreeMap<String, BTreeMap<NaiveDate, DayCounts>> = BTreeMap::new();
    let mut seen: HashSet<(NaiveDate, Status, String)> = HashSet::new();

    for record in records {
        let code = record.region.trim().to_lowercase();
        let date = parse_feed_date(&record.date, &code)?;
        let count = parse_count(&record.count, &code, &record.date)?;

        if !seen.insert((date, record.status, code.clone())) {
            return Err(AggregateError::DuplicateRecord {
                date: record.date.clone(),
                status: record.status.to_string(),
                region: code,
            });
        }

        if config.excluded_regions.contains(&code) {
            continue;
        }

        let day = by_region.entry(code).or_default().entry(date).or_default();
        match record.status {
            Status::Confirmed => day.confirmed = Some(count),
            Status::Recovered | Status::Deceased => {
                day.resolved = day.resolved.checked_add(count).ok_or_else(|| {
                    AggregateError::CountOverflow {
                        region: record.region.trim().to_lowercase(),
                        date: record.date.clone(),
                    }
                })?;
            }
        }
    }

    tracing::debug!(
        records = records.len(),
        regions = by_region.len(),
        "partitioned feed records"
    );

    let mut rows = Vec::new();

    for (code, days) in by_region {
        let name = regions.name(&code)?.to_string();
        let series: Vec<(NaiveDate, u64, u64)> = days
            .into_iter()
            .filter_map(|(date, counts)| counts.confirmed.map(|c| (date, c, counts.resolved)))
            .collect();

        if series.is_empty() {
            tracing::debug!(region = %code, "region has no confirmed series");
            continue;
        }

        let mut region_rows = Vec::with_capacity(series.len());
        let mut total_cases = 0u64;
        let mut total_resolved = 0u64;

        for &(date, confirmed, resolved) in &series {
            let overflow = || AggregateError::CountOverflow {
                region: code.clone(),
                date: format_feed_date(date),
            };
            total_cases = total_cases.checked_add(confirmed).ok_or_else(&overflow)?;
            total_resolved = total_resolved.checked_add(resolved).ok_or_else(&overflow)?;
            let active_cases =
                i64::try_from(i128::from(total_cases) - i128::from(total_resolved))
                    .map_err(|_| overflow())?;

            if active_cases < 0 {
                tracing::warn!(
                    region = %code,
                    %date,
                    active_cases,
                    "resolved cases exceed confirmed cases"
                );
            }

            region_rows.push(RegionDayMetric {
                date: format_feed_date(date),
                date_ordinal: date,
                region_code: code.clone(),
                region_name: name.clone(),
                new_cases: confirmed,
                resolved_new: resolved,
                total_cases,
                total_resolved,
                weekly_cases: None,
                active_cases,
            });
        }

        let dates: Vec<NaiveDate> = series.iter().map(|(date, _, _)| *date).collect();
        let new_cases: Vec<u64> = series.iter().map(|(_, confirmed, _)| *confirmed).collect();
        // window sums never exceed the final total, which fit above
        let weekly = trailing_sums(
            &dates,
            &new_cases,
            config.rolling_window,
            config.window_indexing,
        )
        .ok_or_else(|| AggregateError::CountOverflow {
            region: code.clone(),
            date: format_feed_date(dates[dates.len() - 1]),
        })?;

        for (row, weekly_cases) in region_rows.iter_mut().zip(weekly) {
            row.weekly_cases = weekly_cases;
        }
        rows.extend(region_rows);
    }

    if let Some(policy) = config.sampling {
        let kept = sampling::retain_dates(rows.iter().map(|row| row.date_ordinal), policy);
        let before = rows.len();
        rows.retain(|row| kept.contains(&row.date_ordinal));
        tracing::debug!(
            dates = kept.len(),
            dropped_rows = before - rows.len(),
            "applied date retention"
        );
    }

    tracing::info!(rows = rows.len(), "aggregated region metrics");
    Ok(rows)
}

/// Trailing window sums over one region's series; `None` until the window is full.
///
/// `dates` must be sorted ascending and aligned with `values`. Returns `None` when a
/// window sum does not fit in `u64`.
pub fn trailing_sums(
    dates: &[NaiveDate],
    values: &[u64],
    window: usize,
    indexing: WindowIndexing,
) -> Option<Vec<Option<u64>>> {
    let window = window.max(1);
    let mut sums = Vec::with_capacity(values.len());
    let mut running = 0u64;
    let mut start = 0usize;

    match indexing {
        WindowIndexing::Rows => {
            for (index, value) in values.iter().enumerate() {
                running = running.checked_add(*value)?;
                if index >= window {
                    running -= values[index - window];
                }
                sums.push((index + 1 >= window).then_some(running));
            }
        }
        WindowIndexing::CalendarDays => {
            let Some(first) = dates.first().copied() else {
                return Some(sums);
            };
            // wider than any representable date range: the window never fills
            let Some(span) = i64::try_from(window - 1).ok().and_then(Duration::try_days) else {
                return Some(vec![None; values.len()]);
            };

            for (date, value) in dates.iter().zip(values) {
                running = running.checked_add(*value)?;
                let cutoff = date.checked_sub_signed(span);
                while cutoff.is_some_and(|cutoff| dates[start] < cutoff) {
                    running -= values[start];
                    start += 1;
                }
                let full = *date - first >= span;
                sums.push(full.then_some(running));
            }
        }
    }

    Some(sums)
}
