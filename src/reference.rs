//! Closed-form doubling-time overlays and axis bounds for the log-log chart.

use serde::Serialize;

pub const DEFAULT_DOUBLING_PERIODS: [u32; 3] = [2, 7, 21];

pub const X_MIN: f64 = 100.0;

pub const Y_MIN: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub doubling_days: u32,
    pub label: String,
    pub points: [(f64, f64); 2],
}

/// Share of the cumulative total that arrived in the last week under steady
/// doubling every `doubling_days` days.
pub fn weekly_ratio(doubling_days: u32) -> f64 {
    1.0 - 2f64.powf(-7.0 / f64::from(doubling_days.max(1)))
}

pub fn doubling_line(doubling_days: u32, x_min: f64, x_max: f64) -> ReferenceLine {
    let ratio = weekly_ratio(doubling_days);
    ReferenceLine {
        doubling_days,
        label: format!("{doubling_days}-Day Doubling"),
        points: [(x_min, ratio * x_min), (x_max, ratio * x_max)],
    }
}

pub fn doubling_lines(periods: &[u32], x_max: f64) -> Vec<ReferenceLine> {
    periods
        .iter()
        .map(|&days| doubling_line(days, X_MIN, x_max))
        .collect()
}

/// Doubling period implied by a weekly/total ratio; `None` when the ratio
/// gives no finite positive period.
pub fn implied_doubling_days(weekly_cases: u64, total_cases: u64) -> Option<f64> {
    if total_cases == 0 || weekly_cases == 0 || weekly_cases >= total_cases {
        return None;
    }
    let ratio = weekly_cases as f64 / total_cases as f64;
    Some(-7.0 / (1.0 - ratio).log2())
}

/// Two decades above the largest value's decade, e.g. 45_000 -> 1_000_000.
pub fn axis_upper(max_value: u64) -> f64 {
    if max_value == 0 {
        return 100.0;
    }
    let decade = (max_value as f64).log10().floor() as i32;
    10f64.powi(decade + 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_doubling_halves_the_total() {
        assert!((weekly_ratio(7) - 0.5).abs() < 1e-12);
        assert!((weekly_ratio(2) - (1.0 - 2f64.powf(-3.5))).abs() < 1e-12);
    }

    #[test]
    fn line_spans_requested_range() {
        let line = doubling_line(21, 100.0, 1_000_000.0);
        let ratio = 1.0 - 2f64.powf(-1.0 / 3.0);
        assert_eq!(line.label, "21-Day Doubling");
        assert_eq!(line.points[0].0, 100.0);
        assert!((line.points[1].1 - ratio * 1_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn implied_doubling_inverts_weekly_ratio() {
        let days = implied_doubling_days(500, 1000).unwrap();
        assert!((days - 7.0).abs() < 1e-9);
        assert_eq!(implied_doubling_days(0, 1000), None);
        assert_eq!(implied_doubling_days(1000, 1000), None);
    }

    #[test]
    fn axis_upper_adds_two_decades() {
        assert_eq!(axis_upper(45_000), 1_000_000.0);
        assert_eq!(axis_upper(100), 10_000.0);
        assert_eq!(axis_upper(9), 1_000.0);
        assert_eq!(axis_upper(0), 100.0);
    }

    #[test]
    fn default_lines_in_order() {
        let lines = doubling_lines(&DEFAULT_DOUBLING_PERIODS, 1e6);
        let days: Vec<u32> = lines.iter().map(|l| l.doubling_days).collect();
        assert_eq!(days, vec![2, 7, 21]);
    }
}
