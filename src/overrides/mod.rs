use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hierarchy::is_direct_manager;
use crate::models::{Employee, Report};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverrideState {
    NoOverride,
    Overridden,
}

#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    #[error("Override score must be between 0 and 10, got {0}")]
    ScoreOutOfRange(f64),
    #[error("Override reasoning must not be empty")]
    EmptyReasoning,
}

pub fn override_state(report: &Report) -> OverrideState {
    if report.manager_overall_score.is_some() {
        OverrideState::Overridden
    } else {
        OverrideState::NoOverride
    }
}

/// Only the report owner's direct manager may override; skip-level and
/// scope-based access do not qualify.
pub fn can_override(report: &Report, employees: &[Employee], manager_id: Uuid) -> bool {
    is_direct_manager(employees, report.employee_id, manager_id)
}

/// Set the manual score and its justification together. Validation failures
/// reject without touching the report; on success both fields change
/// atomically.
pub fn apply_override(
    report: &mut Report,
    score: f64,
    reasoning: &str,
) -> Result<(), OverrideError> {
    if !(0.0..=10.0).contains(&score) {
        return Err(OverrideError::ScoreOutOfRange(score));
    }
    let trimmed = reasoning.trim();
    if trimmed.is_empty() {
        return Err(OverrideError::EmptyReasoning);
    }

    report.manager_overall_score = Some(score);
    report.manager_override_reasoning = Some(trimmed.to_string());
    log::info!("Applied override {score} on report {}", report.id);
    Ok(())
}

/// Drop the override, restoring the oracle-assigned score. A report without
/// an override is left as-is.
pub fn clear_override(report: &mut Report) {
    if report.manager_overall_score.take().is_some() {
        log::info!("Cleared override on report {}", report.id);
    }
    report.manager_override_reasoning = None;
}

/// The score a consumer should display: the manager override when present,
/// the oracle evaluation otherwise.
pub fn effective_score(report: &Report) -> f64 {
    report.manager_overall_score.unwrap_or(report.evaluation_score)
}
