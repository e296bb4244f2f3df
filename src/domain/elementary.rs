use crate::domain::description::DependencyDescription;
use crate::domain::filter::DependencyFilterKey;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A single class-level dependency as found in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementaryDependency {
    pub from: String,
    pub to: String,
    pub description: DependencyDescription,
    pub is_violation: bool,
    matches_filter: HashMap<DependencyFilterKey, bool>,
}

/// Entry of a detail listing, e.g. `startMethod()->targetMethod()` with class `dependency methodCall`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedDependency {
    pub description: String,
    pub css_class: String,
}

/// Joins a class path and an optional code unit with a dot.
pub fn combine_path_and_code_unit(path: &str, code_unit: Option<&str>) -> String {
    match code_unit {
        Some(code_unit) if !path.is_empty() && !code_unit.is_empty() => {
            format!("{}.{}", path, code_unit)
        }
        Some(code_unit) => format!("{}{}", path, code_unit),
        None => path.to_string(),
    }
}

impl ElementaryDependency {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        description: DependencyDescription,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            description,
            is_violation: false,
            matches_filter: HashMap::new(),
        }
    }

    pub fn with_violation(mut self, is_violation: bool) -> Self {
        self.is_violation = is_violation;
        self
    }

    pub fn set_matches_filter(&mut self, key: DependencyFilterKey, matches: bool) {
        self.matches_filter.insert(key, matches);
    }

    pub fn matches_filter(&self, key: DependencyFilterKey) -> Option<bool> {
        self.matches_filter.get(&key).copied()
    }

    /// A dependency passes unless some filter flag is explicitly false.
    pub fn matches_all_filters(&self) -> bool {
        self.matches_filter.values().all(|matches| *matches)
    }

    pub fn mark_as_violation(&mut self) {
        self.is_violation = true;
    }

    pub fn unmark_as_violation(&mut self) {
        self.is_violation = false;
    }

    /// Space separated type names prefixed by `dependency`, used as a css class.
    pub fn type_names(&self) -> String {
        match self.description.type_names() {
            names if names.is_empty() => "dependency".to_string(),
            names => format!("dependency {}", names),
        }
    }

    /// `from.startCodeUnit-to.targetElement`, the key violations are matched against.
    pub fn identifying_string(&self) -> String {
        format!(
            "{}-{}",
            combine_path_and_code_unit(&self.from, self.description.start_code_unit()),
            combine_path_and_code_unit(&self.to, self.description.target_element())
        )
    }

    /// Renders this dependency relative to the endpoints of the grouped dependency it belongs to.
    pub fn to_short_string(&self, grouped_from: &str, grouped_to: &str) -> String {
        let relative_from = self.from.get(grouped_from.len() + 1..).unwrap_or("");
        let relative_to = self.to.get(grouped_to.len() + 1..).unwrap_or("");
        format!(
            "{}->{}",
            combine_path_and_code_unit(relative_from, self.description.start_code_unit()),
            combine_path_and_code_unit(relative_to, self.description.target_element())
        )
    }

    pub fn to_detailed(&self, grouped_from: &str, grouped_to: &str) -> DetailedDependency {
        DetailedDependency {
            description: self.to_short_string(grouped_from, grouped_to),
            css_class: self.type_names(),
        }
    }
}

impl fmt::Display for ElementaryDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}({})", self.from, self.to, self.description)
    }
}
