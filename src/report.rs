use std::fmt::Write;

use crate::frames::{Bubble, Frame};
use crate::reference;

/// Latest-frame standing of one region.
#[derive(Debug, Clone)]
pub struct RegionStanding {
    pub region: String,
    pub total_cases: u64,
    pub weekly_cases: u64,
    pub active_cases: i64,
    pub doubling_days: Option<f64>,
}

/// Regions in the latest frame, most new cases in the past week first.
pub fn latest_standings(frames: &[Frame]) -> Vec<RegionStanding> {
    let Some(latest) = frames.last() else {
        return Vec::new();
    };

    let mut standings: Vec<RegionStanding> = latest
        .bubbles
        .iter()
        .filter(|bubble| bubble.plotted)
        .map(standing)
        .collect();

    standings.sort_by(|a, b| {
        b.weekly_cases
            .cmp(&a.weekly_cases)
            .then_with(|| a.region.cmp(&b.region))
    });
    standings
}

fn standing(bubble: &Bubble) -> RegionStanding {
    RegionStanding {
        region: bubble.region.clone(),
        total_cases: bubble.total_cases,
        weekly_cases: bubble.weekly_cases,
        active_cases: bubble.active_cases,
        doubling_days: reference::implied_doubling_days(bubble.weekly_cases, bubble.total_cases),
    }
}

pub fn format_doubling(days: Option<f64>) -> String {
    match days {
        Some(days) => format!("doubling every {days:.1} days"),
        None => "no finite doubling time".to_string(),
    }
}

pub fn build_report(frames: &[Frame], min_total_cases: u64, limit: usize) -> String {
    let standings = latest_standings(frames);
    let mut output = String::new();

    let _ = writeln!(output, "# Growth Trend Report");

    match (frames.first(), frames.last()) {
        (Some(first), Some(last)) => {
            let _ = writeln!(
                output,
                "Covering {} frames from {} to {} (regions plotted from {} total cases)",
                frames.len(),
                first.date,
                last.date,
                min_total_cases
            );
        }
        _ => {
            let _ = writeln!(output, "No frames available for this feed.");
            return output;
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Most New Cases in the Past Week");

    if standings.is_empty() {
        let _ = writeln!(output, "No region has reached the plotting threshold yet.");
    } else {
        for standing in standings.iter().take(limit) {
            let _ = writeln!(
                output,
                "- {}: {} new this week, {} total, {} active ({})",
                standing.region,
                standing.weekly_cases,
                standing.total_cases,
                standing.active_cases,
                format_doubling(standing.doubling_days)
            );
        }
    }

    let mut fastest: Vec<&RegionStanding> = standings
        .iter()
        .filter(|standing| standing.doubling_days.is_some())
        .collect();
    fastest.sort_by(|a, b| {
        a.doubling_days
            .partial_cmp(&b.doubling_days)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let _ = writeln!(output);
    let _ = writeln!(output, "## Fastest Doubling");

    if fastest.is_empty() {
        let _ = writeln!(output, "No region has a finite doubling time.");
    } else {
        for standing in fastest.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} ({})",
                standing.region,
                format_doubling(standing.doubling_days)
            );
        }
    }

    output
}
