//! Rule violation groups and the marks they put on elementary dependencies.

use crate::domain::elementary::ElementaryDependency;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub origin: String,
    pub target: String,
}

impl Violation {
    /// Origin and target are code unit qualified, e.g. `com.A.run()-com.B.field`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.origin, self.target)
    }
}

/// All violations of one architecture rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationGroup {
    pub rule: String,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

/// The violation groups currently shown, keyed by rule.
#[derive(Debug, Clone, Default)]
pub struct Violations {
    groups: IndexMap<String, ViolationGroup>,
    keys: HashSet<String>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a group, replacing a shown group of the same rule. Returns false on replacement.
    pub fn add_group(&mut self, group: ViolationGroup) -> bool {
        let added = self.groups.insert(group.rule.clone(), group).is_none();
        self.recompute_keys();
        added
    }

    pub fn remove_group(&mut self, rule: &str) -> bool {
        let removed = self.groups.shift_remove(rule).is_some();
        self.recompute_keys();
        removed
    }

    fn recompute_keys(&mut self) {
        self.keys = self
            .groups
            .values()
            .flat_map(|group| group.violations.iter().map(Violation::key))
            .collect();
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn contains(&self, dependency: &ElementaryDependency) -> bool {
        self.keys.contains(&dependency.identifying_string())
    }

    /// Unmarks every dependency, then marks those belonging to a shown group.
    pub fn refresh_marks(&self, dependencies: &mut [ElementaryDependency]) {
        for dependency in dependencies.iter_mut() {
            dependency.unmark_as_violation();
        }
        for dependency in dependencies.iter_mut().filter(|d| self.contains(d)) {
            dependency.mark_as_violation();
        }
    }

    /// Predicate of the `violations` filter: everything passes while no group is shown.
    pub fn passes_filter(&self, dependency: &ElementaryDependency) -> bool {
        self.is_empty() || self.contains(dependency)
    }
}
