use std::collections::BTreeSet;

use crate::regions::UNASSIGNED;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowIndexing {
    /// The last `n` rows of the region's own series, whatever their dates.
    #[default]
    Rows,
    /// The `n` calendar days ending on the row's date; gaps count as zero.
    CalendarDays,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPolicy {
    pub recent_window: usize,
    /// Outside the recent window, keep every `stride`-th date by position.
    pub stride: usize,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            recent_window: 21,
            stride: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationConfig {
    pub rolling_window: usize,
    pub window_indexing: WindowIndexing,
    /// `None` keeps every date.
    pub sampling: Option<SamplingPolicy>,
    pub excluded_regions: BTreeSet<String>,
    /// Minimum cumulative count for a point to join a trajectory; 0 disables it.
    pub min_total_cases: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            rolling_window: 7,
            window_indexing: WindowIndexing::Rows,
            sampling: Some(SamplingPolicy::default()),
            excluded_regions: BTreeSet::from([UNASSIGNED.to_string()]),
            min_total_cases: 100,
        }
    }
}

impl AggregationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rolling_window(mut self, rolling_window: usize) -> Self {
        self.rolling_window = rolling_window.max(1);
        self
    }

    pub fn with_window_indexing(mut self, window_indexing: WindowIndexing) -> Self {
        self.window_indexing = window_indexing;
        self
    }

    pub fn with_sampling(mut self, sampling: Option<SamplingPolicy>) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_excluded_regions<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_regions = codes
            .into_iter()
            .map(|code| code.into().trim().to_lowercase())
            .collect();
        self
    }

    pub fn with_min_total_cases(mut self, min_total_cases: u64) -> Self {
        self.min_total_cases = min_total_cases;
        self
    }
}
