//! The "dependencies" filter group: keys, preconditions and the type filter configuration.

use crate::domain::description::DependencyType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const FILTER_GROUP_NAME: &str = "dependencies";

/// Keys of the per-dependency filter flags, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyFilterKey {
    Type,
    NodeTypeAndName,
    Violations,
    VisibleNodes,
}

impl DependencyFilterKey {
    pub const ALL: [DependencyFilterKey; 4] = [
        DependencyFilterKey::Type,
        DependencyFilterKey::NodeTypeAndName,
        DependencyFilterKey::Violations,
        DependencyFilterKey::VisibleNodes,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            DependencyFilterKey::Type => "type",
            DependencyFilterKey::NodeTypeAndName => "nodeTypeAndName",
            DependencyFilterKey::Violations => "violations",
            DependencyFilterKey::VisibleNodes => "visibleNodes",
        }
    }

    /// Name of the filter within the cross-cutting filter collection, e.g. `dependencies.type`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", FILTER_GROUP_NAME, self.as_str())
    }
}

impl fmt::Display for DependencyFilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyFilterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s
            .strip_prefix(FILTER_GROUP_NAME)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(s);
        DependencyFilterKey::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| format!("unknown dependency filter: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter {
    pub key: DependencyFilterKey,
    /// A filter whose precondition does not hold lets every dependency pass.
    pub precondition: bool,
}

/// The ordered filters the engine registers under [`FILTER_GROUP_NAME`].
#[derive(Debug, Clone)]
pub struct FilterGroup {
    filters: Vec<Filter>,
}

impl Default for FilterGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterGroup {
    pub fn new() -> Self {
        let filters = DependencyFilterKey::ALL
            .into_iter()
            .map(|key| Filter {
                key,
                // violation isolation is opt-in
                precondition: key != DependencyFilterKey::Violations,
            })
            .collect();
        Self { filters }
    }

    pub fn name(&self) -> &'static str {
        FILTER_GROUP_NAME
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn get(&self, key: DependencyFilterKey) -> Option<&Filter> {
        self.filters.iter().find(|f| f.key == key)
    }

    pub fn get_by_name(&self, qualified_name: &str) -> Option<&Filter> {
        let key = qualified_name.parse::<DependencyFilterKey>().ok()?;
        self.get(key)
    }

    pub fn is_enabled(&self, key: DependencyFilterKey) -> bool {
        self.get(key).is_some_and(|f| f.precondition)
    }

    /// Returns whether the precondition changed.
    pub fn set_precondition(&mut self, key: DependencyFilterKey, precondition: bool) -> bool {
        match self.filters.iter_mut().find(|f| f.key == key) {
            Some(filter) if filter.precondition != precondition => {
                filter.precondition = precondition;
                true
            }
            _ => false,
        }
    }
}

/// Which dependency kinds the type filter lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeFilterConfig {
    pub show_implementing: bool,
    pub show_extending: bool,
    pub show_constructor_call: bool,
    pub show_method_call: bool,
    pub show_field_access: bool,
    pub show_anonymous_implementation: bool,
    pub show_dependencies_between_class_and_its_inner_classes: bool,
}

impl Default for TypeFilterConfig {
    fn default() -> Self {
        Self {
            show_implementing: true,
            show_extending: true,
            show_constructor_call: true,
            show_method_call: true,
            show_field_access: true,
            show_anonymous_implementation: true,
            show_dependencies_between_class_and_its_inner_classes: true,
        }
    }
}

impl TypeFilterConfig {
    pub fn shows(&self, dependency_type: DependencyType) -> bool {
        match dependency_type {
            DependencyType::Implements => self.show_implementing,
            DependencyType::Extends => self.show_extending,
            DependencyType::ConstructorCall => self.show_constructor_call,
            DependencyType::MethodCall => self.show_method_call,
            DependencyType::FieldAccess => self.show_field_access,
            DependencyType::ImplementsAnonymous => self.show_anonymous_implementation,
            DependencyType::ChildrenAccess => true,
        }
    }

    /// Turns off the kind with the given camel case name. Returns false for unknown names.
    pub fn hide(&mut self, type_name: &str) -> bool {
        let flag = match type_name {
            "implements" => &mut self.show_implementing,
            "extends" => &mut self.show_extending,
            "constructorCall" => &mut self.show_constructor_call,
            "methodCall" => &mut self.show_method_call,
            "fieldAccess" => &mut self.show_field_access,
            "implementsAnonymous" => &mut self.show_anonymous_implementation,
            "innerClasses" => &mut self.show_dependencies_between_class_and_its_inner_classes,
            _ => return false,
        };
        *flag = false;
        true
    }
}
