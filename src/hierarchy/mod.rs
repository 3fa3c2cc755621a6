use std::collections::{HashMap, HashSet, VecDeque};

use uuid::Uuid;

use crate::models::Employee;

/// Child-lookup index over the flat employee set. Ids are interned into a
/// flat arena with a children adjacency list so traversal never chases
/// pointers or recurses.
#[derive(Debug, Clone)]
pub struct HierarchyIndex {
    ids: Vec<Uuid>,
    index_of: HashMap<Uuid, usize>,
    children: Vec<Vec<usize>>,
}

impl HierarchyIndex {
    pub fn build(employees: &[Employee]) -> Self {
        let mut ids = Vec::with_capacity(employees.len());
        let mut index_of = HashMap::with_capacity(employees.len());
        for e in employees {
            if !index_of.contains_key(&e.id) {
                index_of.insert(e.id, ids.len());
                ids.push(e.id);
            }
        }

        let mut children = vec![Vec::new(); ids.len()];
        for e in employees {
            let Some(child_idx) = index_of.get(&e.id).copied() else {
                continue;
            };
            // Dangling manager references leave the employee a root.
            if let Some(parent_idx) = e.manager_id.and_then(|m| index_of.get(&m).copied()) {
                if parent_idx != child_idx {
                    children[parent_idx].push(child_idx);
                }
            }
        }

        Self {
            ids,
            index_of,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.index_of.contains_key(&id)
    }

    /// Employees whose `manager_id` equals `manager_id`. Unknown ids yield
    /// the empty set rather than an error.
    pub fn direct_reports(&self, manager_id: Uuid) -> HashSet<Uuid> {
        match self.index_of.get(&manager_id) {
            Some(&idx) => self.children[idx].iter().map(|&c| self.ids[c]).collect(),
            None => HashSet::new(),
        }
    }

    /// Full downward closure of `manager_id`, excluding the manager itself.
    /// The visited bitmap makes cyclic input terminate with a partial
    /// result instead of looping.
    pub fn all_descendants(&self, manager_id: Uuid) -> HashSet<Uuid> {
        let Some(&root) = self.index_of.get(&manager_id) else {
            return HashSet::new();
        };

        let mut visited = vec![false; self.ids.len()];
        visited[root] = true;

        let mut result = HashSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(idx) = queue.pop_front() {
            for &child in &self.children[idx] {
                if !visited[child] {
                    visited[child] = true;
                    result.insert(self.ids[child]);
                    queue.push_back(child);
                }
            }
        }
        result
    }
}

pub fn manager_of(employees: &[Employee], employee_id: Uuid) -> Option<Uuid> {
    employees
        .iter()
        .find(|e| e.id == employee_id)
        .and_then(|e| e.manager_id)
}

/// Authorization primitive for report overrides: true only for the
/// employee's direct manager, never skip-level.
pub fn is_direct_manager(employees: &[Employee], employee_id: Uuid, manager_id: Uuid) -> bool {
    manager_of(employees, employee_id) == Some(manager_id)
}
