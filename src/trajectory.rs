//! Streakline construction.
//!
//! Every plotted row carries the path its region took up to and including that row's
//! date. [`build`] keeps one running path per region and records, for each row, how
//! long that path was at the row's date; the row's trajectory is that prefix.
//! [`build_naive`] rescans the rows for every row and exists as the reference the
//! incremental form is checked against.

use std::collections::HashMap;

use crate::models::{PlotRow, RegionDayMetric, TrajectoryPoint};

pub fn plot_rows(metrics: &[RegionDayMetric]) -> Vec<PlotRow> {
    metrics
        .iter()
        .filter_map(|metric| {
            metric.weekly_cases.map(|weekly_cases| PlotRow {
                date: metric.date.clone(),
                date_ordinal: metric.date_ordinal,
                region_code: metric.region_code.clone(),
                region_name: metric.region_name.clone(),
                total_cases: metric.total_cases,
                weekly_cases,
                active_cases: metric.active_cases,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrajectorySnapshot {
    rows: Vec<PlotRow>,
    paths: HashMap<String, Vec<TrajectoryPoint>>,
    prefix_lens: Vec<usize>,
    min_total_cases: u64,
}

impl TrajectorySnapshot {
    pub fn rows(&self) -> &[PlotRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn min_total_cases(&self) -> u64 {
        self.min_total_cases
    }

    /// Trajectory of the row at `index`, oldest point first.
    ///
    /// Panics when `index` is out of range; see [`TrajectorySnapshot::get`].
    pub fn trajectory(&self, index: usize) -> &[TrajectoryPoint] {
        match self.get(index) {
            Some((_, path)) => path,
            None => panic!("row {index} out of range for {} rows", self.rows.len()),
        }
    }

    pub fn get(&self, index: usize) -> Option<(&PlotRow, &[TrajectoryPoint])> {
        let row = self.rows.get(index)?;
        let path: &[TrajectoryPoint] = match self.paths.get(&row.region_code) {
            Some(path) => &path[..self.prefix_lens[index]],
            None => &[],
        };
        Some((row, path))
    }

    pub fn region_path(&self, region_code: &str) -> &[TrajectoryPoint] {
        self.paths
            .get(region_code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlotRow, &[TrajectoryPoint])> + '_ {
        (0..self.rows.len()).map(move |index| (&self.rows[index], self.trajectory(index)))
    }
}

/// Builds every row's trajectory in one pass per region.
///
/// Points with `total_cases` below `min_total_cases` never join a path. Rows keep the
/// order they were given in; at most one row per (region, date) is expected.
pub fn build(rows: Vec<PlotRow>, min_total_cases: u64) -> TrajectorySnapshot {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        rows[a]
            .region_code
            .cmp(&rows[b].region_code)
            .then(rows[a].date_ordinal.cmp(&rows[b].date_ordinal))
    });

    let mut paths: HashMap<String, Vec<TrajectoryPoint>> = HashMap::new();
    let mut prefix_lens = vec![0; rows.len()];

    for index in order {
        let row = &rows[index];
        let path = paths.entry(row.region_code.clone()).or_default();
        if row.total_cases >= min_total_cases {
            path.push(row.point());
        }
        prefix_lens[index] = path.len();
    }

    tracing::debug!(
        rows = rows.len(),
        regions = paths.len(),
        min_total_cases,
        "built trajectories"
    );

    TrajectorySnapshot {
        rows,
        paths,
        prefix_lens,
        min_total_cases,
    }
}

/// Per-row rescan of all rows; quadratic in rows per region.
pub fn build_naive(rows: &[PlotRow], min_total_cases: u64) -> Vec<Vec<TrajectoryPoint>> {
    rows.iter()
        .map(|row| {
            let mut history: Vec<&PlotRow> = rows
                .iter()
                .filter(|other| {
                    other.region_code == row.region_code
                        && other.date_ordinal <= row.date_ordinal
                        && other.total_cases >= min_total_cases
                })
                .collect();
            history.sort_by_key(|other| other.date_ordinal);
            history.into_iter().map(PlotRow::point).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    fn plot_row(region: &str, offset: i64, total_cases: u64, weekly_cases: u64) -> PlotRow {
        let date = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap() + Duration::days(offset);
        PlotRow {
            date: date.format("%d-%b-%y").to_string(),
            date_ordinal: date,
            region_code: region.to_string(),
            region_name: region.to_uppercase(),
            total_cases,
            weekly_cases,
            active_cases: total_cases as i64,
        }
    }

    fn point(total_cases: u64, weekly_cases: u64) -> TrajectoryPoint {
        TrajectoryPoint {
            total_cases,
            weekly_cases,
        }
    }

    #[test]
    fn trajectories_are_prefixes_of_region_path() {
        let rows = vec![
            plot_row("a", 0, 100, 50),
            plot_row("b", 0, 300, 90),
            plot_row("a", 1, 150, 60),
            plot_row("a", 2, 240, 70),
        ];

        let snapshot = build(rows, 100);

        assert_eq!(snapshot.trajectory(0), &[point(100, 50)]);
        assert_eq!(snapshot.trajectory(1), &[point(300, 90)]);
        assert_eq!(snapshot.trajectory(2), &[point(100, 50), point(150, 60)]);
        assert_eq!(
            snapshot.trajectory(3),
            &[point(100, 50), point(150, 60), point(240, 70)]
        );
        assert_eq!(snapshot.region_path("a").len(), 3);
        assert!(snapshot.region_path("zz").is_empty());
    }

    #[test]
    fn get_returns_none_past_the_last_row() {
        let snapshot = build(vec![plot_row("sk", 0, 120, 20)], 100);

        let (row, path) = snapshot.get(0).unwrap();
        assert_eq!(row.region_code, "sk");
        assert_eq!(path, &[point(120, 20)]);
        assert!(snapshot.get(1).is_none());
        assert!(build(Vec::new(), 100).get(0).is_none());
    }

    #[test]
    fn rows_below_threshold_have_empty_trajectories() {
        let rows: Vec<PlotRow> = (0..5).map(|i| plot_row("kl", i, 10 + i as u64, 3)).collect();
        let snapshot = build(rows, 100);

        assert_eq!(snapshot.len(), 5);
        assert!(snapshot.iter().all(|(_, path)| path.is_empty()));
    }

    #[test]
    fn threshold_zero_keeps_every_point() {
        let rows = vec![plot_row("kl", 0, 0, 0), plot_row("kl", 1, 4, 4)];
        let snapshot = build(rows, 0);
        assert_eq!(snapshot.trajectory(1), &[point(0, 0), point(4, 4)]);
    }

    #[test]
    fn singleton_region_gets_one_point() {
        let snapshot = build(vec![plot_row("sk", 3, 120, 20)], 100);
        assert_eq!(snapshot.trajectory(0), &[point(120, 20)]);
    }

    #[test]
    fn plot_rows_drop_incomplete_windows() {
        let date = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        let metric = |weekly_cases| RegionDayMetric {
            date: "01-May-20".to_string(),
            date_ordinal: date,
            region_code: "kl".to_string(),
            region_name: "Kerala".to_string(),
            new_cases: 1,
            resolved_new: 0,
            total_cases: 1,
            total_resolved: 0,
            weekly_cases,
            active_cases: 1,
        };

        let rows = plot_rows(&[metric(None), metric(Some(0))]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].weekly_cases, 0);
    }

    fn region_series() -> impl Strategy<Value = Vec<(i64, u64, u64)>> {
        proptest::collection::vec((1i64..4, 0u64..400, 0u64..200), 1..25)
    }

    fn rows_from(series: Vec<Vec<(i64, u64, u64)>>) -> Vec<PlotRow> {
        let mut rows = Vec::new();
        for (region, steps) in series.into_iter().enumerate() {
            let code = format!("r{region}");
            let mut offset = 0;
            let mut total = 0;
            for (gap, new_cases, weekly) in steps {
                offset += gap;
                total += new_cases;
                rows.push(plot_row(&code, offset, total, weekly));
            }
        }
        rows
    }

    proptest! {
        #[test]
        fn incremental_matches_rescan(
            series in proptest::collection::vec(region_series(), 1..4),
            min_total_cases in 0u64..1500,
            seed in any::<u64>(),
        ) {
            let mut rows = rows_from(series);
            // deterministic shuffle so input order differs from date order
            let len = rows.len();
            for i in (1..len).rev() {
                let j = (seed.wrapping_mul(i as u64 + 31).rotate_left(i as u32 % 64) % (i as u64 + 1)) as usize;
                rows.swap(i, j);
            }

            let expected = build_naive(&rows, min_total_cases);
            let snapshot = build(rows, min_total_cases);

            for (index, path) in expected.iter().enumerate() {
                prop_assert_eq!(snapshot.trajectory(index), path.as_slice());
            }
        }

        #[test]
        fn trajectory_totals_never_decrease(
            series in proptest::collection::vec(region_series(), 1..4),
            min_total_cases in 0u64..1500,
        ) {
            let snapshot = build(rows_from(series), min_total_cases);
            for (_, path) in snapshot.iter() {
                prop_assert!(path.windows(2).all(|pair| pair[0].total_cases <= pair[1].total_cases));
                prop_assert!(path.iter().all(|p| p.total_cases >= min_total_cases));
            }
        }
    }
}
