use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Case status carried by each feed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Confirmed,
    Recovered,
    Deceased,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Recovered => "Recovered",
            Self::Deceased => "Deceased",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Confirmed" => Ok(Self::Confirmed),
            "Recovered" => Ok(Self::Recovered),
            "Deceased" => Ok(Self::Deceased),
            other => Err(other.to_string()),
        }
    }
}

/// One (date, status, region) entry of the daily feed, still in feed form.
///
/// `date` is `DD-Mon-YY` and `count` is the raw string the feed delivered; both are
/// validated by the aggregator, not at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDailyRecord {
    pub date: String,
    pub status: Status,
    pub region: String,
    pub count: String,
}

impl RawDailyRecord {
    pub fn new(
        date: impl Into<String>,
        status: Status,
        region: impl Into<String>,
        count: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            status,
            region: region.into(),
            count: count.into(),
        }
    }
}

/// Derived metrics for one region on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionDayMetric {
    pub date: String,
    pub date_ordinal: NaiveDate,
    pub region_code: String,
    pub region_name: String,
    pub new_cases: u64,
    pub resolved_new: u64,
    pub total_cases: u64,
    pub total_resolved: u64,
    pub weekly_cases: Option<u64>,
    pub active_cases: i64,
}

/// A metric row that has a full trailing window and can be placed on the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlotRow {
    pub date: String,
    pub date_ordinal: NaiveDate,
    pub region_code: String,
    pub region_name: String,
    pub total_cases: u64,
    pub weekly_cases: u64,
    pub active_cases: i64,
}

impl PlotRow {
    pub fn point(&self) -> TrajectoryPoint {
        TrajectoryPoint {
            total_cases: self.total_cases,
            weekly_cases: self.weekly_cases,
        }
    }
}

/// One vertex of a streakline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrajectoryPoint {
    pub total_cases: u64,
    pub weekly_cases: u64,
}
