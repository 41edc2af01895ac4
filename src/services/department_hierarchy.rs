use std::collections::{HashMap, HashSet, VecDeque};

use tracing::warn;

use crate::models::department::Department;

/// Parent links of the department tree, keyed by department id.
///
/// Departments only know their parent; children are derived on demand.
#[derive(Debug, Clone, Default)]
pub struct DepartmentTree {
    parents: HashMap<i64, Option<i64>>,
}

impl DepartmentTree {
    pub fn from_departments<'a>(departments: impl IntoIterator<Item = &'a Department>) -> Self {
        let parents = departments
            .into_iter()
            .map(|department| (department.id, department.parent_department_id))
            .collect();
        Self { parents }
    }

    /// True when walking up from `id` revisits a department.
    pub fn is_cyclic(&self, id: i64) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if !seen.insert(node) {
                return true;
            }
            current = self.parents.get(&node).copied().flatten();
        }
        false
    }

    /// True when re-parenting `id` under `new_parent` would make `id` its own
    /// ancestor.
    pub fn would_create_cycle(&self, id: i64, new_parent: i64) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(new_parent);
        while let Some(node) = current {
            if node == id || !seen.insert(node) {
                return true;
            }
            current = self.parents.get(&node).copied().flatten();
        }
        false
    }

    /// `root` plus every department below it, found breadth-first.
    ///
    /// Departments whose ancestor chain loops are skipped (and logged); the
    /// root itself is always included.
    pub fn descendants_of(&self, root: i64) -> HashSet<i64> {
        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
        for (&id, parent) in &self.parents {
            if let Some(parent) = parent {
                children.entry(*parent).or_default().push(id);
            }
        }

        let mut included = HashSet::new();
        included.insert(root);
        let mut queue = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            let Some(kids) = children.get(&current) else {
                continue;
            };
            for &child in kids {
                if included.contains(&child) {
                    continue;
                }
                if self.is_cyclic(child) {
                    warn!(
                        target: "app::report",
                        department_id = child,
                        "department hierarchy loops back on itself; skipping"
                    );
                    continue;
                }
                included.insert(child);
                queue.push_back(child);
            }
        }

        included
    }
}
