use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hierarchy::HierarchyIndex;
use crate::models::Employee;
use crate::permissions::capabilities_of;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScopeMode {
    DirectReports,
    ReportingChain,
    Organization,
}

impl ScopeMode {
    pub fn from_str(s: &str) -> Self {
        match s {
            "reporting_chain" | "reporting-chain" => Self::ReportingChain,
            "organization" => Self::Organization,
            _ => Self::DirectReports,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Self::DirectReports => "direct_reports",
            Self::ReportingChain => "reporting_chain",
            Self::Organization => "organization",
        }
    }
}

/// The employee ids a manager may act upon, together with the mode that
/// actually produced them. `mode` is the effective mode: a denied
/// organization request comes back as `DirectReports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    pub manager_id: Uuid,
    pub mode: ScopeMode,
    pub employee_ids: HashSet<Uuid>,
}

impl Scope {
    pub fn contains(&self, employee_id: Uuid) -> bool {
        self.employee_ids.contains(&employee_id)
    }
}

pub fn resolve(
    manager_id: Uuid,
    mode: ScopeMode,
    employees: &[Employee],
    index: &HierarchyIndex,
) -> Scope {
    match mode {
        ScopeMode::DirectReports => Scope {
            manager_id,
            mode,
            employee_ids: index.direct_reports(manager_id),
        },
        ScopeMode::ReportingChain => Scope {
            manager_id,
            mode,
            employee_ids: index.all_descendants(manager_id),
        },
        ScopeMode::Organization => {
            let can_view_org = employees
                .iter()
                .find(|e| e.id == manager_id)
                .map(|e| capabilities_of(e).view_org_wide)
                .unwrap_or(false);

            if can_view_org {
                let employee_ids = employees
                    .iter()
                    .map(|e| e.id)
                    .filter(|&id| id != manager_id)
                    .collect();
                Scope {
                    manager_id,
                    mode,
                    employee_ids,
                }
            } else {
                // Permission-denial fallback, not an error. Callers must
                // read the returned mode, not the requested one.
                log::debug!(
                    "org-wide scope denied for {manager_id}, falling back to direct reports"
                );
                Scope {
                    manager_id,
                    mode: ScopeMode::DirectReports,
                    employee_ids: index.direct_reports(manager_id),
                }
            }
        }
    }
}
