use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Goal, Project, Report};

use super::timeline::sunday_on_or_before;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reliability {
    pub rate: f64,
    pub expected: u64,
    pub actual: u64,
    /// Same ratio over the last 4 Sunday-aligned calendar weeks ending at
    /// the window end, oldest first. Weeks with zero expected read 0.
    pub trend: Vec<f64>,
}

fn days_in_window(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let days = ((end - start).num_seconds() as f64 / 86_400.0).ceil();
    days.max(1.0)
}

fn expected_for_project(project: &Project, goal_count: usize, days: f64) -> u64 {
    (days * project.report_frequency.multiplier() * goal_count as f64).ceil() as u64
}

/// Actual vs. expected submissions over the window, given each project's
/// configured cadence and its in-scope goals. Returns None when nothing is
/// expected: a rate over zero submissions means nothing.
pub fn submission_reliability(
    reports: &[Report],
    projects: &[Project],
    goals_in_scope: &[Goal],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Option<Reliability> {
    let mut goals_by_project: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
    for goal in goals_in_scope {
        goals_by_project
            .entry(goal.project_id)
            .or_default()
            .insert(goal.id);
    }

    let days = days_in_window(start, end);
    let mut expected = 0u64;
    let mut actual = 0u64;

    for project in projects {
        let Some(goal_ids) = goals_by_project.get(&project.id) else {
            continue;
        };
        expected += expected_for_project(project, goal_ids.len(), days);
        actual += reports
            .iter()
            .filter(|r| {
                goal_ids.contains(&r.goal_id)
                    && r.submission_date >= start
                    && r.submission_date <= end
            })
            .count() as u64;
    }

    if expected == 0 {
        return None;
    }

    let rate = (actual as f64 / expected as f64 * 100.0).clamp(0.0, 100.0);
    let trend = weekly_trend(reports, projects, &goals_by_project, end);

    Some(Reliability {
        rate,
        expected,
        actual,
        trend,
    })
}

fn weekly_trend(
    reports: &[Report],
    projects: &[Project],
    goals_by_project: &HashMap<Uuid, HashSet<Uuid>>,
    end: DateTime<Utc>,
) -> Vec<f64> {
    let anchor = sunday_on_or_before(end.date_naive());

    (0..4)
        .rev()
        .map(|weeks_back| {
            let week_start = anchor - Duration::days(7 * weeks_back);
            let week_end = week_start + Duration::days(6);

            let mut expected = 0u64;
            let mut actual = 0u64;
            for project in projects {
                let Some(goal_ids) = goals_by_project.get(&project.id) else {
                    continue;
                };
                expected += expected_for_project(project, goal_ids.len(), 7.0);
                actual += reports
                    .iter()
                    .filter(|r| {
                        let date = r.submission_date.date_naive();
                        goal_ids.contains(&r.goal_id) && date >= week_start && date <= week_end
                    })
                    .count() as u64;
            }

            if expected == 0 {
                0.0
            } else {
                (actual as f64 / expected as f64 * 100.0).clamp(0.0, 100.0)
            }
        })
        .collect()
}
