//! Dependency kinds and the descriptions attached to elementary and grouped dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an elementary dependency between two classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyType {
    MethodCall,
    FieldAccess,
    ConstructorCall,
    Extends,
    Implements,
    ImplementsAnonymous,
    /// Access of a nested class, re-rooted onto its folded outer class.
    ChildrenAccess,
}

/// The two merge categories of dependency kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Access,
    Inheritance,
}

impl DependencyType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DependencyType::MethodCall => "methodCall",
            DependencyType::FieldAccess => "fieldAccess",
            DependencyType::ConstructorCall => "constructorCall",
            DependencyType::Extends => "extends",
            DependencyType::Implements => "implements",
            DependencyType::ImplementsAnonymous => "implementsAnonymous",
            DependencyType::ChildrenAccess => "childrenAccess",
        }
    }

    pub const fn category(&self) -> TypeCategory {
        match self {
            DependencyType::Extends
            | DependencyType::Implements
            | DependencyType::ImplementsAnonymous => TypeCategory::Inheritance,
            DependencyType::MethodCall
            | DependencyType::FieldAccess
            | DependencyType::ConstructorCall
            | DependencyType::ChildrenAccess => TypeCategory::Access,
        }
    }

    /// Parses the type of a flat dependency record.
    ///
    /// Accepts the upper snake case names of the flat report format (`METHOD_CALL`,
    /// `INHERITANCE`, ...) as well as the camel case names used in the UI.
    pub fn from_record_type(value: &str) -> Option<Self> {
        match value {
            "METHOD_CALL" | "methodCall" => Some(DependencyType::MethodCall),
            "FIELD_ACCESS" | "fieldAccess" => Some(DependencyType::FieldAccess),
            "CONSTRUCTOR_CALL" | "constructorCall" => Some(DependencyType::ConstructorCall),
            "INHERITANCE" | "EXTENDS" | "extends" => Some(DependencyType::Extends),
            "IMPLEMENTS" | "implements" => Some(DependencyType::Implements),
            "IMPLEMENTS_ANONYMOUS" | "implementsAnonymous" => {
                Some(DependencyType::ImplementsAnonymous)
            }
            _ => None,
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type name of a category after merging several descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergedTypeName {
    Single(DependencyType),
    Several,
}

impl MergedTypeName {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MergedTypeName::Single(dependency_type) => dependency_type.as_str(),
            MergedTypeName::Several => "several",
        }
    }

    fn merge(own: Option<Self>, other: Option<Self>) -> Option<Self> {
        match (own, other) {
            (None, other) => other,
            (own, None) => own,
            (Some(own), Some(other)) if own == other => Some(own),
            _ => Some(MergedTypeName::Several),
        }
    }
}

/// Merged description of a grouped dependency, one type name per category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedDescription {
    pub access: Option<MergedTypeName>,
    pub inheritance: Option<MergedTypeName>,
    pub has_detailed_description: bool,
}

impl GroupedDescription {
    /// Merges one more member description into this one.
    pub fn add(&mut self, description: &DependencyDescription) {
        self.access = MergedTypeName::merge(self.access, description.type_of(TypeCategory::Access));
        self.inheritance = MergedTypeName::merge(
            self.inheritance,
            description.type_of(TypeCategory::Inheritance),
        );
        self.has_detailed_description |= description.has_detailed_description();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DependencyDescription {
    /// A method call, field access or constructor call.
    Access {
        dependency_type: DependencyType,
        start_code_unit: Option<String>,
        target_element: Option<String>,
    },
    Inheritance {
        dependency_type: DependencyType,
    },
    ChildAccess {
        has_detailed_description: bool,
    },
    /// Used whenever one endpoint is a package.
    Empty,
    Grouped(GroupedDescription),
}

impl DependencyDescription {
    pub fn new(
        dependency_type: DependencyType,
        start_code_unit: Option<String>,
        target_element: Option<String>,
    ) -> Self {
        match (dependency_type, dependency_type.category()) {
            (DependencyType::ChildrenAccess, _) => DependencyDescription::ChildAccess {
                has_detailed_description: false,
            },
            (_, TypeCategory::Access) => DependencyDescription::Access {
                dependency_type,
                start_code_unit: start_code_unit.filter(|s| !s.is_empty()),
                target_element: target_element.filter(|s| !s.is_empty()),
            },
            (_, TypeCategory::Inheritance) => {
                DependencyDescription::Inheritance { dependency_type }
            }
        }
    }

    /// Merges the descriptions of all members of a grouped dependency.
    pub fn grouped<'a>(members: impl IntoIterator<Item = &'a DependencyDescription>) -> Self {
        let mut grouped = GroupedDescription::default();
        for description in members {
            grouped.add(description);
        }
        DependencyDescription::Grouped(grouped)
    }

    /// Kind of a single-kind description.
    pub fn dependency_type(&self) -> Option<DependencyType> {
        match self {
            DependencyDescription::Access {
                dependency_type, ..
            }
            | DependencyDescription::Inheritance { dependency_type } => Some(*dependency_type),
            DependencyDescription::ChildAccess { .. } => Some(DependencyType::ChildrenAccess),
            DependencyDescription::Empty | DependencyDescription::Grouped(_) => None,
        }
    }

    fn type_of(&self, category: TypeCategory) -> Option<MergedTypeName> {
        match self {
            DependencyDescription::Grouped(grouped) => match category {
                TypeCategory::Access => grouped.access,
                TypeCategory::Inheritance => grouped.inheritance,
            },
            _ => self
                .dependency_type()
                .filter(|t| t.category() == category)
                .map(MergedTypeName::Single),
        }
    }

    pub fn has_detailed_description(&self) -> bool {
        match self {
            DependencyDescription::Access { .. } => true,
            DependencyDescription::ChildAccess {
                has_detailed_description,
            } => *has_detailed_description,
            DependencyDescription::Grouped(grouped) => grouped.has_detailed_description,
            DependencyDescription::Inheritance { .. } | DependencyDescription::Empty => false,
        }
    }

    /// Only code-level accesses contribute entries to a detail listing.
    pub fn has_title(&self) -> bool {
        matches!(self, DependencyDescription::Access { .. })
    }

    pub fn start_code_unit(&self) -> Option<&str> {
        match self {
            DependencyDescription::Access {
                start_code_unit, ..
            } => start_code_unit.as_deref(),
            _ => None,
        }
    }

    pub fn target_element(&self) -> Option<&str> {
        match self {
            DependencyDescription::Access { target_element, .. } => target_element.as_deref(),
            _ => None,
        }
    }

    /// Space separated type names, e.g. `extends methodCall`.
    pub fn type_names(&self) -> String {
        match self {
            DependencyDescription::Grouped(grouped) => [grouped.inheritance, grouped.access]
                .iter()
                .flatten()
                .map(MergedTypeName::as_str)
                .collect::<Vec<_>>()
                .join(" "),
            _ => self
                .dependency_type()
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for DependencyDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyDescription::Access {
                dependency_type,
                start_code_unit,
                target_element,
            } => {
                let parts: Vec<&str> = [
                    start_code_unit.as_deref(),
                    Some(dependency_type.as_str()),
                    target_element.as_deref(),
                ]
                .into_iter()
                .flatten()
                .collect();
                f.write_str(&parts.join(" "))
            }
            DependencyDescription::Empty => Ok(()),
            _ => f.write_str(&self.type_names()),
        }
    }
}
