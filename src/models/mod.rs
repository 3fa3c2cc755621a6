use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Employee,
}

impl Role {
    pub fn from_str(s: &str) -> Self {
        match s {
            "manager" => Self::Manager,
            _ => Self::Employee,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionFlags {
    #[serde(default)]
    pub can_view_organization_wide: bool,
    #[serde(default)]
    pub can_manage_settings: bool,
    #[serde(default)]
    pub can_set_global_frequency: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub role: Role,
    pub manager_id: Option<Uuid>,
    pub is_account_owner: Option<bool>,
    pub permissions: Option<PermissionFlags>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssigneeType {
    Employee,
    Manager,
}

impl AssigneeType {
    pub fn from_str(s: &str) -> Self {
        match s {
            "manager" => Self::Manager,
            _ => Self::Employee,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignee {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AssigneeType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportFrequency {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
}

impl ReportFrequency {
    pub fn from_str(s: &str) -> Self {
        match s {
            "daily" => Self::Daily,
            "bi_weekly" | "bi-weekly" | "biweekly" => Self::BiWeekly,
            "monthly" => Self::Monthly,
            _ => Self::Weekly,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::BiWeekly => "bi_weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Expected submissions per goal per day at this cadence.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Daily => 1.0,
            Self::Weekly => 1.0 / 7.0,
            Self::BiWeekly => 1.0 / 14.0,
            Self::Monthly => 1.0 / 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub category: String,
    pub assignees: Vec<Assignee>,
    pub report_frequency: ReportFrequency,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub id: Uuid,
    pub name: String,
    pub weight: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub project_id: Uuid,
    pub criteria: Vec<Criterion>,
    pub created_by: Option<Uuid>,
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion_name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub employee_id: Uuid,
    pub submission_date: DateTime<Utc>,
    pub evaluation_score: f64,
    pub evaluation_reasoning: String,
    pub criterion_scores: Vec<CriterionScore>,
    pub manager_overall_score: Option<f64>,
    pub manager_override_reasoning: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Criteria weights must sum to 100, got {0}")]
    WeightSum(i32),
    #[error("Criteria weight must be positive: {name} has {weight}")]
    NonPositiveWeight { name: String, weight: i32 },
    #[error("Duplicate assignee: {0}")]
    DuplicateAssignee(Uuid),
}

/// Commit-time check for a goal's criteria edit. Transient edits may
/// violate the sum while uncommitted.
pub fn validate_criteria(criteria: &[Criterion]) -> Result<(), ValidationError> {
    for c in criteria {
        if c.weight <= 0 {
            return Err(ValidationError::NonPositiveWeight {
                name: c.name.clone(),
                weight: c.weight,
            });
        }
    }
    let sum: i32 = criteria.iter().map(|c| c.weight).sum();
    if sum != 100 {
        return Err(ValidationError::WeightSum(sum));
    }
    Ok(())
}

pub fn validate_assignees(assignees: &[Assignee]) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::new();
    for a in assignees {
        if !seen.insert(a.id) {
            return Err(ValidationError::DuplicateAssignee(a.id));
        }
    }
    Ok(())
}

impl Goal {
    /// Authorship may be recorded in either creator field.
    pub fn authored_by(&self, actor_id: Uuid) -> bool {
        self.created_by == Some(actor_id) || self.manager_id == Some(actor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criterion(name: &str, weight: i32) -> Criterion {
        Criterion {
            id: Uuid::new_v4(),
            name: name.to_string(),
            weight,
        }
    }

    #[test]
    fn criteria_weights_must_sum_to_100() {
        let ok = vec![criterion("quality", 60), criterion("timeliness", 40)];
        assert!(validate_criteria(&ok).is_ok());

        let short = vec![criterion("quality", 60), criterion("timeliness", 30)];
        assert!(matches!(
            validate_criteria(&short),
            Err(ValidationError::WeightSum(90))
        ));
    }

    #[test]
    fn criteria_weights_must_be_positive() {
        let bad = vec![criterion("quality", 100), criterion("padding", 0)];
        assert!(matches!(
            validate_criteria(&bad),
            Err(ValidationError::NonPositiveWeight { .. })
        ));
    }

    #[test]
    fn duplicate_assignees_rejected() {
        let id = Uuid::new_v4();
        let assignees = vec![
            Assignee {
                id,
                kind: AssigneeType::Employee,
            },
            Assignee {
                id,
                kind: AssigneeType::Manager,
            },
        ];
        assert!(matches!(
            validate_assignees(&assignees),
            Err(ValidationError::DuplicateAssignee(d)) if d == id
        ));
    }

    #[test]
    fn frequency_codec_is_lenient() {
        assert_eq!(ReportFrequency::from_str("bi-weekly"), ReportFrequency::BiWeekly);
        assert_eq!(ReportFrequency::from_str("unknown"), ReportFrequency::Weekly);
        assert_eq!(ReportFrequency::Daily.to_str(), "daily");
    }

    #[test]
    fn frequency_multipliers() {
        assert_eq!(ReportFrequency::Daily.multiplier(), 1.0);
        assert!((ReportFrequency::Weekly.multiplier() - 1.0 / 7.0).abs() < 1e-12);
        assert!((ReportFrequency::Monthly.multiplier() - 1.0 / 30.0).abs() < 1e-12);
    }
}
