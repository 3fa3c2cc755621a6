use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Goal, Project, Report};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn from_str(s: &str) -> Self {
        match s {
            "monthly" => Self::Monthly,
            _ => Self::Weekly,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeBucket {
    pub period: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: u64,
    pub red_flag: u64,
}

pub fn sunday_on_or_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Gapless calendar-aligned series over the window. Weekly buckets start on
/// the Sunday on/before the window start; monthly buckets on the first of
/// the month. Empty buckets are emitted so charts keep a continuous axis.
pub fn time_bucketed(
    reports: &[Report],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    granularity: Granularity,
    red_flag_threshold: f64,
) -> Vec<TimeBucket> {
    let start_date = start.date_naive();
    let end_date = end.date_naive();
    if end_date < start_date {
        return Vec::new();
    }

    let mut buckets = Vec::new();
    let mut cursor = match granularity {
        Granularity::Weekly => sunday_on_or_before(start_date),
        Granularity::Monthly => first_of_month(start_date),
    };

    while cursor <= end_date {
        let (bucket_end, period, next) = match granularity {
            Granularity::Weekly => (
                cursor + Duration::days(6),
                cursor.format("%Y-%m-%d").to_string(),
                cursor + Duration::days(7),
            ),
            Granularity::Monthly => {
                let next = cursor + Months::new(1);
                (next - Duration::days(1), cursor.format("%Y-%m").to_string(), next)
            }
        };

        let mut total = 0u64;
        let mut red_flag = 0u64;
        for report in reports {
            let date = report.submission_date.date_naive();
            if date >= cursor && date <= bucket_end {
                total += 1;
                if report.evaluation_score < red_flag_threshold {
                    red_flag += 1;
                }
            }
        }

        buckets.push(TimeBucket {
            period,
            start_date: cursor,
            end_date: bucket_end,
            total,
            red_flag,
        });
        cursor = next;
    }

    buckets
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BandBounds {
    pub high: f64,
    pub mid: f64,
}

impl Default for BandBounds {
    fn default() -> Self {
        Self {
            high: 8.0,
            mid: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalAlignment {
    pub goal_id: Uuid,
    pub project_id: Uuid,
    pub project_name: Option<String>,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub total: u64,
}

/// Stacked score-band counts per goal, busiest goals first. Reports against
/// unknown goals are skipped rather than invented.
pub fn goal_alignment(
    reports: &[Report],
    goals: &[Goal],
    projects: &[Project],
    bands: &BandBounds,
    limit: usize,
) -> Vec<GoalAlignment> {
    let goals_by_id: HashMap<Uuid, &Goal> = goals.iter().map(|g| (g.id, g)).collect();
    let project_names: HashMap<Uuid, &str> =
        projects.iter().map(|p| (p.id, p.name.as_str())).collect();

    let mut by_goal: HashMap<Uuid, GoalAlignment> = HashMap::new();
    for report in reports {
        let Some(goal) = goals_by_id.get(&report.goal_id) else {
            continue;
        };
        let entry = by_goal
            .entry(goal.id)
            .or_insert_with(|| GoalAlignment {
                goal_id: goal.id,
                project_id: goal.project_id,
                project_name: project_names
                    .get(&goal.project_id)
                    .map(|n| n.to_string()),
                high: 0,
                medium: 0,
                low: 0,
                total: 0,
            });

        if report.evaluation_score >= bands.high {
            entry.high += 1;
        } else if report.evaluation_score >= bands.mid {
            entry.medium += 1;
        } else {
            entry.low += 1;
        }
        entry.total += 1;
    }

    let mut alignment: Vec<GoalAlignment> = by_goal.into_values().collect();
    alignment.sort_by(|a, b| b.total.cmp(&a.total).then(a.goal_id.cmp(&b.goal_id)));
    alignment.truncate(limit);
    alignment
}
