use crate::config::AggregationConfig;
use crate::error::AggregateError;
use crate::metrics;
use crate::models::{RawDailyRecord, RegionDayMetric};
use crate::regions::RegionTable;
use crate::trajectory::{self, TrajectorySnapshot};

/// Result of one aggregation run over a complete feed snapshot.
///
/// Nothing is cached between runs; a caller that refreshes on a timer keeps the
/// previous `GrowthSnapshot` itself if it needs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthSnapshot {
    pub metrics: Vec<RegionDayMetric>,
    pub trajectories: TrajectorySnapshot,
}

pub fn run(
    records: &[RawDailyRecord],
    regions: &RegionTable,
    config: &AggregationConfig,
) -> Result<GrowthSnapshot, AggregateError> {
    let span = tracing::info_span!("growth_snapshot", records = records.len());
    let _guard = span.enter();

    let metrics = metrics::aggregate(records, regions, config)?;
    let rows = trajectory::plot_rows(&metrics);
    let trajectories = trajectory::build(rows, config.min_total_cases);

    tracing::info!(
        metric_rows = metrics.len(),
        plot_rows = trajectories.len(),
        "growth snapshot ready"
    );

    Ok(GrowthSnapshot {
        metrics,
        trajectories,
    })
}
