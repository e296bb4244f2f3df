//! Serde model of the report consumed by the engine.
//!
//! A report is either a bare hierarchy of code elements carrying their dependencies
//! (`superclass`, `interfaces`, `methodCalls`, ...) or an object holding the hierarchy
//! under `root` next to a flat list of dependency records.

use crate::domain::violations::ViolationGroup;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Package,
    Class,
    Interface,
}

/// A package, class or interface of the report hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonElement {
    #[serde(default)]
    pub name: String,
    pub full_name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub children: Vec<JsonElement>,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<DependencyTarget>,
    #[serde(default)]
    pub anonymous_implementation: Vec<DependencyTarget>,
    #[serde(default)]
    pub method_calls: Vec<DependencyTarget>,
    #[serde(default)]
    pub field_accesses: Vec<DependencyTarget>,
    #[serde(default)]
    pub constructor_calls: Vec<DependencyTarget>,
}

impl JsonElement {
    /// Simple name, falling back to the last segment of the full name.
    pub fn simple_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        self.full_name
            .rsplit(['.', '$'])
            .next()
            .unwrap_or(&self.full_name)
    }
}

/// Target of a typed dependency field: a bare class name or an access with code units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyTarget {
    Name(String),
    #[serde(rename_all = "camelCase")]
    Access {
        target: String,
        #[serde(default)]
        start_code_unit: Option<String>,
        #[serde(default, alias = "targetElement")]
        target_code_element: Option<String>,
    },
}

impl DependencyTarget {
    pub fn target(&self) -> &str {
        match self {
            DependencyTarget::Name(target) | DependencyTarget::Access { target, .. } => target,
        }
    }

    pub fn start_code_unit(&self) -> Option<&str> {
        match self {
            DependencyTarget::Name(_) => None,
            DependencyTarget::Access {
                start_code_unit, ..
            } => start_code_unit.as_deref(),
        }
    }

    pub fn target_element(&self) -> Option<&str> {
        match self {
            DependencyTarget::Name(_) => None,
            DependencyTarget::Access {
                target_code_element,
                ..
            } => target_code_element.as_deref(),
        }
    }
}

/// One record of a flat dependency list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    pub origin_class: String,
    pub target_class: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_code_unit: Option<String>,
    #[serde(default, alias = "targetElement")]
    pub target_code_element: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatReport {
    pub root: JsonElement,
    pub dependencies: Vec<DependencyRecord>,
    #[serde(default)]
    pub violations: Vec<ViolationGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportInput {
    Flat(FlatReport),
    Hierarchical(JsonElement),
}

impl ReportInput {
    pub fn root(&self) -> &JsonElement {
        match self {
            ReportInput::Flat(report) => &report.root,
            ReportInput::Hierarchical(root) => root,
        }
    }

    /// Violation groups shipped with the report.
    pub fn violations(&self) -> &[ViolationGroup] {
        match self {
            ReportInput::Flat(report) => &report.violations,
            ReportInput::Hierarchical(_) => &[],
        }
    }
}
