pub mod reliability;
pub mod timeline;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AnalyticsConfig;
use crate::models::{Goal, Project, Report};

use self::reliability::{submission_reliability, Reliability};
use self::timeline::{goal_alignment, time_bucketed, GoalAlignment, Granularity, TimeBucket};

/// Inclusive date-window check shared by every aggregate.
pub fn in_window(report: &Report, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    report.submission_date >= start && report.submission_date <= end
}

/// Arithmetic mean of evaluation scores. Empty input is 0, never NaN.
pub fn average(reports: &[Report]) -> f64 {
    if reports.is_empty() {
        return 0.0;
    }
    let sum: f64 = reports.iter().map(|r| r.evaluation_score).sum();
    sum / reports.len() as f64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consistency {
    pub value: f64,
    pub std_dev: f64,
    pub cv: f64,
}

/// Consistency as 100 minus ten times the coefficient of variation, clamped
/// to 0..100. The x10 scaling spreads typical CVs (0-10%) across the whole
/// display range. Needs at least two reports.
pub fn consistency(reports: &[Report]) -> Option<Consistency> {
    if reports.len() < 2 {
        return None;
    }

    let mean = average(reports);
    let variance = reports
        .iter()
        .map(|r| {
            let d = r.evaluation_score - mean;
            d * d
        })
        .sum::<f64>()
        / reports.len() as f64;
    let std_dev = variance.sqrt();

    let cv = if mean == 0.0 { 0.0 } else { std_dev / mean * 100.0 };
    let value = (100.0 - cv * 10.0).clamp(0.0, 100.0);

    Some(Consistency { value, std_dev, cv })
}

/// Reports scoring below the threshold, worst-and-most-recent first.
pub fn red_flags(reports: &[Report], threshold: f64, limit: usize) -> Vec<Report> {
    let mut flagged: Vec<Report> = reports
        .iter()
        .filter(|r| r.evaluation_score < threshold)
        .cloned()
        .collect();
    flagged.sort_by(|a, b| {
        a.evaluation_score
            .total_cmp(&b.evaluation_score)
            .then(b.submission_date.cmp(&a.submission_date))
    });
    flagged.truncate(limit);
    flagged
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorStanding {
    pub employee_id: Uuid,
    pub total_score: f64,
    pub report_count: usize,
    pub average_score: f64,
}

fn rank_contributors(reports: &[Report]) -> Vec<ContributorStanding> {
    let mut by_employee: HashMap<Uuid, (f64, usize)> = HashMap::new();
    for report in reports {
        let entry = by_employee.entry(report.employee_id).or_insert((0.0, 0));
        entry.0 += report.evaluation_score;
        entry.1 += 1;
    }

    let mut standings: Vec<ContributorStanding> = by_employee
        .into_iter()
        .map(|(employee_id, (total_score, report_count))| ContributorStanding {
            employee_id,
            total_score,
            report_count,
            average_score: total_score / report_count as f64,
        })
        .collect();

    // Average desc, then volume desc; equal contributors order by id so
    // repeated runs rank identically.
    standings.sort_by(|a, b| {
        b.average_score
            .total_cmp(&a.average_score)
            .then(b.report_count.cmp(&a.report_count))
            .then(a.employee_id.cmp(&b.employee_id))
    });
    standings
}

pub fn top_contributors(reports: &[Report], limit: usize) -> Vec<ContributorStanding> {
    let mut standings = rank_contributors(reports);
    standings.truncate(limit);
    standings
}

/// 1-based rank of an employee over the whole windowed report set, under
/// the same ordering as `top_contributors`. The input is deliberately
/// unscoped: the leaderboard compares against everyone.
pub fn leaderboard_position(
    reports: &[Report],
    employee_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<usize> {
    let windowed: Vec<Report> = reports
        .iter()
        .filter(|r| in_window(r, start, end))
        .cloned()
        .collect();
    rank_contributors(&windowed)
        .iter()
        .position(|s| s.employee_id == employee_id)
        .map(|p| p + 1)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionAverage {
    pub name: String,
    pub average_score: f64,
    pub frequency: usize,
}

/// Per-criterion averages across the report set, most-used criteria first.
/// Feeds both the skills radar and the summarization oracle.
pub fn criteria_averages(reports: &[Report]) -> Vec<CriterionAverage> {
    let mut by_name: HashMap<String, (f64, usize)> = HashMap::new();
    for report in reports {
        for cs in &report.criterion_scores {
            let entry = by_name.entry(cs.criterion_name.clone()).or_insert((0.0, 0));
            entry.0 += cs.score;
            entry.1 += 1;
        }
    }

    let mut averages: Vec<CriterionAverage> = by_name
        .into_iter()
        .map(|(name, (total, frequency))| CriterionAverage {
            name,
            average_score: total / frequency as f64,
            frequency,
        })
        .collect();
    averages.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.name.cmp(&b.name)));
    averages
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionTrend {
    pub name: String,
    pub current: f64,
    pub previous: Option<f64>,
    pub change_pct: Option<f64>,
    pub direction: TrendDirection,
}

const STABLE_BAND_PCT: f64 = 2.0;

/// Current-period criterion averages against the prior period. A criterion
/// absent from the prior period carries no change and reads Stable.
pub fn criteria_comparison(
    current: &[CriterionAverage],
    prior: &[CriterionAverage],
) -> Vec<CriterionTrend> {
    current
        .iter()
        .map(|c| {
            let previous = prior
                .iter()
                .find(|p| p.name == c.name)
                .map(|p| p.average_score);
            let change_pct = previous.and_then(|prev| {
                if prev == 0.0 {
                    None
                } else {
                    Some((c.average_score - prev) / prev * 100.0)
                }
            });
            let direction = match change_pct {
                Some(pct) if pct > STABLE_BAND_PCT => TrendDirection::Up,
                Some(pct) if pct < -STABLE_BAND_PCT => TrendDirection::Down,
                _ => TrendDirection::Stable,
            };
            CriterionTrend {
                name: c.name.clone(),
                current: c.average_score,
                previous,
                change_pct,
                direction,
            }
        })
        .collect()
}

/// The full aggregate output for one (scope, window) pair. Recomputed from
/// scratch whenever any input changes; no incremental state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub report_count: usize,
    pub average_score: f64,
    pub consistency: Option<Consistency>,
    pub reliability: Option<Reliability>,
    pub red_flags: Vec<Report>,
    pub top_contributors: Vec<ContributorStanding>,
    pub weekly_series: Vec<TimeBucket>,
    pub goal_alignment: Vec<GoalAlignment>,
    pub criteria_averages: Vec<CriterionAverage>,
}

/// Assemble every aggregate for an already-scoped report set. Reports
/// outside the window are dropped here so callers can hand over the scoped
/// set as-is.
pub fn snapshot(
    reports: &[Report],
    projects: &[Project],
    goals_in_scope: &[Goal],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> MetricsSnapshot {
    let windowed: Vec<Report> = reports
        .iter()
        .filter(|r| in_window(r, start, end))
        .cloned()
        .collect();

    MetricsSnapshot {
        report_count: windowed.len(),
        average_score: average(&windowed),
        consistency: consistency(&windowed),
        reliability: submission_reliability(&windowed, projects, goals_in_scope, start, end),
        red_flags: red_flags(&windowed, config.red_flag_threshold, config.red_flag_limit),
        top_contributors: top_contributors(&windowed, config.top_contributor_limit),
        weekly_series: time_bucketed(
            &windowed,
            start,
            end,
            Granularity::Weekly,
            config.red_flag_threshold,
        ),
        goal_alignment: goal_alignment(
            &windowed,
            goals_in_scope,
            projects,
            &config.bands,
            config.alignment_goal_limit,
        ),
        criteria_averages: criteria_averages(&windowed),
    }
}
