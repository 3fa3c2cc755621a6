use std::collections::HashMap;

use uuid::Uuid;

use crate::hierarchy::HierarchyIndex;
use crate::models::{Employee, Goal, Project};
use crate::permissions::capabilities_of;
use crate::scope::Scope;

/// Goals a manager may see: authored by them, or attached to a project with
/// at least one assignee among their direct reports. Viewing is anchored to
/// direct reports regardless of the caller's scope mode; the wider
/// reporting chain never widens goal visibility.
pub fn visible_goals(
    goals: &[Goal],
    projects: &[Project],
    index: &HierarchyIndex,
    manager_id: Uuid,
) -> Vec<Goal> {
    let reports = index.direct_reports(manager_id);
    let projects_by_id: HashMap<Uuid, &Project> = projects.iter().map(|p| (p.id, p)).collect();

    goals
        .iter()
        .filter(|goal| {
            if goal.authored_by(manager_id) {
                return true;
            }
            // Dangling project reference: nothing to anchor on, not visible.
            projects_by_id
                .get(&goal.project_id)
                .map(|project| project.assignees.iter().any(|a| reports.contains(&a.id)))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Editing stays narrower than viewing: authorship only, independent of
/// scope or hierarchy.
pub fn can_edit_goal(goal: &Goal, manager_id: Uuid) -> bool {
    goal.authored_by(manager_id)
}

/// Projects a manager may see: created by them, assigned to them, or
/// assigned to anyone in the resolved scope. Settings managers and account
/// owners see every project.
pub fn visible_projects(projects: &[Project], scope: &Scope, actor: &Employee) -> Vec<Project> {
    let caps = capabilities_of(actor);
    if caps.manage_settings || caps.is_owner {
        return projects.to_vec();
    }

    projects
        .iter()
        .filter(|project| {
            project.created_by == actor.id
                || project
                    .assignees
                    .iter()
                    .any(|a| a.id == actor.id || scope.contains(a.id))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignee, AssigneeType, ReportFrequency, Role};
    use crate::scope::{resolve, ScopeMode};

    struct Fixture {
        m: Uuid,
        a: Uuid,
        e: Uuid,
        employees: Vec<Employee>,
        index: HierarchyIndex,
    }

    fn fixture() -> Fixture {
        let m = Uuid::new_v4();
        let a = Uuid::new_v4();
        let e = Uuid::new_v4();
        let employees = vec![
            employee(m, Role::Manager, None),
            employee(a, Role::Manager, Some(m)),
            employee(e, Role::Employee, Some(a)),
        ];
        let index = HierarchyIndex::build(&employees);
        Fixture {
            m,
            a,
            e,
            employees,
            index,
        }
    }

    fn employee(id: Uuid, role: Role, manager_id: Option<Uuid>) -> Employee {
        Employee {
            id,
            organization_id: Uuid::nil(),
            name: "x".to_string(),
            role,
            manager_id,
            is_account_owner: None,
            permissions: None,
        }
    }

    fn project(created_by: Uuid, assignee_ids: &[Uuid]) -> Project {
        Project {
            id: Uuid::new_v4(),
            organization_id: Uuid::nil(),
            name: "project".to_string(),
            category: "general".to_string(),
            assignees: assignee_ids
                .iter()
                .map(|&id| Assignee {
                    id,
                    kind: AssigneeType::Employee,
                })
                .collect(),
            report_frequency: ReportFrequency::Weekly,
            created_by,
        }
    }

    fn goal(project_id: Uuid, created_by: Option<Uuid>) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            project_id,
            criteria: vec![],
            created_by,
            manager_id: None,
        }
    }

    #[test]
    fn authored_goals_are_visible_without_assignment() {
        let f = fixture();
        let p = project(f.m, &[]);
        let goals = vec![goal(p.id, Some(f.a))];
        let visible = visible_goals(&goals, &[p], &f.index, f.a);
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn assignment_visibility_is_direct_reports_only() {
        let f = fixture();
        // E is A's report, not M's. M sees nothing through assignment.
        let p = project(f.e, &[f.e]);
        let goals = vec![goal(p.id, Some(f.e))];
        assert!(visible_goals(&goals, std::slice::from_ref(&p), &f.index, f.m).is_empty());
        assert_eq!(visible_goals(&goals, &[p], &f.index, f.a).len(), 1);
    }

    #[test]
    fn goal_with_dangling_project_is_hidden() {
        let f = fixture();
        let goals = vec![goal(Uuid::new_v4(), Some(f.e))];
        assert!(visible_goals(&goals, &[], &f.index, f.a).is_empty());
    }

    #[test]
    fn editing_is_authorship_only() {
        let f = fixture();
        let p = project(f.m, &[f.e]);
        let mut g = goal(p.id, Some(f.m));
        assert!(can_edit_goal(&g, f.m));
        assert!(!can_edit_goal(&g, f.a));

        g.created_by = None;
        g.manager_id = Some(f.a);
        assert!(can_edit_goal(&g, f.a));
    }

    #[test]
    fn projects_visible_through_scope_assignment() {
        let f = fixture();
        let scope = resolve(f.a, ScopeMode::DirectReports, &f.employees, &f.index);
        let mine = project(f.a, &[]);
        let assigned_to_report = project(f.m, &[f.e]);
        let unrelated = project(f.m, &[f.m]);

        let actor = f.employees[1].clone();
        let visible = visible_projects(
            &[mine.clone(), assigned_to_report.clone(), unrelated],
            &scope,
            &actor,
        );
        let ids: Vec<Uuid> = visible.iter().map(|p| p.id).collect();
        assert!(ids.contains(&mine.id));
        assert!(ids.contains(&assigned_to_report.id));
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn owner_sees_every_project() {
        let f = fixture();
        let mut owner = f.employees[0].clone();
        owner.is_account_owner = Some(true);
        let scope = resolve(f.m, ScopeMode::DirectReports, &f.employees, &f.index);
        let projects = vec![project(f.e, &[f.e]), project(f.a, &[])];
        assert_eq!(visible_projects(&projects, &scope, &owner).len(), 2);
    }
}
