use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::config::SamplingPolicy;

/// Positions kept out of `len` distinct dates sorted ascending.
///
/// An index is kept when it falls in the last `recent_window` positions or is a
/// multiple of `stride`. Index 0 is therefore always kept.
pub fn retained_indices(len: usize, policy: SamplingPolicy) -> Vec<usize> {
    let stride = policy.stride.max(1);
    let window_start = len.saturating_sub(policy.recent_window);

    (0..len)
        .filter(|&index| index >= window_start || index % stride == 0)
        .collect()
}

pub fn retain_dates<I>(dates: I, policy: SamplingPolicy) -> BTreeSet<NaiveDate>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let distinct: Vec<NaiveDate> = dates
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    retained_indices(distinct.len(), policy)
        .into_iter()
        .map(|index| distinct[index])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, 14).unwrap() + Duration::days(offset)
    }

    #[test]
    fn thirty_dates_keep_stride_and_recent_window() {
        let kept = retained_indices(30, SamplingPolicy::default());
        let mut expected = vec![0, 7];
        expected.extend(9..30);
        assert_eq!(kept, expected);
    }

    #[test]
    fn short_series_is_kept_whole() {
        assert_eq!(retained_indices(5, SamplingPolicy::default()), vec![0, 1, 2, 3, 4]);
        assert!(retained_indices(0, SamplingPolicy::default()).is_empty());
    }

    #[test]
    fn matches_membership_formula() {
        let policy = SamplingPolicy {
            recent_window: 4,
            stride: 3,
        };
        for len in 0..40 {
            let kept: BTreeSet<usize> = retained_indices(len, policy).into_iter().collect();
            for index in 0..len {
                let expected = index + 4 >= len || index % 3 == 0;
                assert_eq!(kept.contains(&index), expected, "len {len} index {index}");
            }
        }
    }

    #[test]
    fn retains_dates_from_unsorted_duplicates() {
        let mut dates: Vec<NaiveDate> = (0..30).rev().map(day).collect();
        dates.extend((0..30).map(day));

        let kept = retain_dates(dates, SamplingPolicy::default());
        let mut expected: BTreeSet<NaiveDate> = (9..30).map(day).collect();
        expected.insert(day(0));
        expected.insert(day(7));
        assert_eq!(kept, expected);
    }

    #[test]
    fn zero_stride_keeps_everything() {
        let policy = SamplingPolicy {
            recent_window: 0,
            stride: 0,
        };
        assert_eq!(retained_indices(3, policy), vec![0, 1, 2]);
    }
}
