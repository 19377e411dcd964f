use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::TrajectoryPoint;
use crate::reference::{self, ReferenceLine, X_MIN, Y_MIN};
use crate::trajectory::TrajectorySnapshot;

/// One region's marker in an animation frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bubble {
    pub region: String,
    pub date: String,
    pub total_cases: u64,
    pub weekly_cases: u64,
    pub active_cases: i64,
    /// False when the total is under the chart threshold; the streakline is still emitted.
    pub plotted: bool,
    pub trajectory: Vec<TrajectoryPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub date: String,
    pub date_ordinal: NaiveDate,
    pub bubbles: Vec<Bubble>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

/// Everything the chart needs, serialized as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameExport {
    pub x_axis: AxisRange,
    pub y_axis: AxisRange,
    pub reference_lines: Vec<ReferenceLine>,
    pub frames: Vec<Frame>,
}

/// Groups plot rows into one frame per date, oldest first, bubbles sorted by region name.
pub fn build_frames(snapshot: &TrajectorySnapshot) -> Vec<Frame> {
    let threshold = snapshot.min_total_cases();
    let mut by_date: BTreeMap<NaiveDate, Frame> = BTreeMap::new();

    for (row, path) in snapshot.iter() {
        let frame = by_date.entry(row.date_ordinal).or_insert_with(|| Frame {
            date: row.date.clone(),
            date_ordinal: row.date_ordinal,
            bubbles: Vec::new(),
        });
        frame.bubbles.push(Bubble {
            region: row.region_name.clone(),
            date: row.date.clone(),
            total_cases: row.total_cases,
            weekly_cases: row.weekly_cases,
            active_cases: row.active_cases,
            plotted: row.total_cases >= threshold,
            trajectory: path.to_vec(),
        });
    }

    let mut frames: Vec<Frame> = by_date.into_values().collect();
    for frame in &mut frames {
        frame.bubbles.sort_by(|a, b| a.region.cmp(&b.region));
    }
    frames
}

pub fn build_export(snapshot: &TrajectorySnapshot, doubling_periods: &[u32]) -> FrameExport {
    let threshold = snapshot.min_total_cases();
    let plotted = || snapshot.rows().iter().filter(move |r| r.total_cases >= threshold);
    let max_total = plotted().map(|r| r.total_cases).max().unwrap_or(0);
    let max_weekly = plotted().map(|r| r.weekly_cases).max().unwrap_or(0);
    let x_max = reference::axis_upper(max_total);

    FrameExport {
        x_axis: AxisRange { min: X_MIN, max: x_max },
        y_axis: AxisRange {
            min: Y_MIN,
            max: reference::axis_upper(max_weekly),
        },
        reference_lines: reference::doubling_lines(doubling_periods, x_max),
        frames: build_frames(snapshot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlotRow;
    use crate::trajectory;
    use chrono::Duration;

    fn row(region: &str, name: &str, offset: i64, total_cases: u64) -> PlotRow {
        let date = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap() + Duration::days(offset);
        PlotRow {
            date: date.format("%d-%b-%y").to_string(),
            date_ordinal: date,
            region_code: region.to_string(),
            region_name: name.to_string(),
            total_cases,
            weekly_cases: total_cases / 2,
            active_cases: total_cases as i64,
        }
    }

    #[test]
    fn frames_follow_dates_with_sorted_bubbles() {
        let rows = vec![
            row("wb", "West Bengal", 1, 400),
            row("as", "Assam", 0, 50),
            row("wb", "West Bengal", 0, 300),
            row("as", "Assam", 1, 150),
        ];
        let snapshot = trajectory::build(rows, 100);

        let frames = build_frames(&snapshot);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].date, "01-Jun-20");
        let names: Vec<&str> = frames[1].bubbles.iter().map(|b| b.region.as_str()).collect();
        assert_eq!(names, vec!["Assam", "West Bengal"]);

        let assam_first = &frames[0].bubbles[0];
        assert!(!assam_first.plotted);
        assert!(assam_first.trajectory.is_empty());
        assert_eq!(frames[1].bubbles[1].trajectory.len(), 2);
    }

    #[test]
    fn export_serializes_axes_and_lines() {
        let snapshot = trajectory::build(vec![row("dl", "Delhi", 0, 45_000)], 100);
        let export = build_export(&snapshot, &reference::DEFAULT_DOUBLING_PERIODS);

        assert_eq!(export.x_axis.max, 1_000_000.0);
        assert_eq!(export.y_axis.max, 1_000_000.0);
        assert_eq!(export.reference_lines.len(), 3);

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["frames"][0]["bubbles"][0]["region"], "Delhi");
        assert_eq!(json["frames"][0]["bubbles"][0]["trajectory"][0]["total_cases"], 45_000);
    }

    #[test]
    fn axes_ignore_rows_below_threshold() {
        let mut small = row("sk", "Sikkim", 0, 90);
        small.weekly_cases = 80;
        let mut large = row("dl", "Delhi", 0, 200);
        large.weekly_cases = 5;

        let snapshot = trajectory::build(vec![large, small.clone()], 100);
        let export = build_export(&snapshot, &reference::DEFAULT_DOUBLING_PERIODS);
        assert_eq!(export.x_axis.max, 10_000.0);
        assert_eq!(export.y_axis.max, 100.0);

        let snapshot = trajectory::build(vec![small], 100);
        let export = build_export(&snapshot, &reference::DEFAULT_DOUBLING_PERIODS);
        assert_eq!(export.x_axis.max, 100.0);
        assert_eq!(export.y_axis.max, 100.0);
    }
}
