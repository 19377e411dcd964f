//! Metric aggregation and streakline construction for growth-trend charts.
//!
//! A daily per-region, per-status case feed goes through [`metrics::aggregate`] into
//! per-region daily metrics, then through [`trajectory::build`] into plot rows that each
//! carry their region's path so far. [`pipeline::run`] chains both.

pub mod config;
pub mod error;
pub mod feed;
pub mod frames;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod reference;
pub mod regions;
pub mod report;
pub mod sampling;
pub mod trajectory;

pub use config::{AggregationConfig, SamplingPolicy, WindowIndexing};
pub use error::{AggregateError, FeedError, RegionTableError};
pub use models::{PlotRow, RawDailyRecord, RegionDayMetric, Status, TrajectoryPoint};
pub use pipeline::{run, GrowthSnapshot};
pub use regions::RegionTable;
