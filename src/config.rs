//! Configuration file loading.
//!
//! A view configuration is a camelCase JSON object describing the initial state of a
//! session: type filter, folded nodes, shown violation groups and node filters. Layout
//! files map node names to absolute circles.

use crate::domain::filter::TypeFilterConfig;
use crate::domain::vector::Circle;
use crate::domain::violations::ViolationGroup;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewConfig {
    pub type_filter: TypeFilterConfig,
    /// Full names of the nodes to fold.
    pub folded: Vec<String>,
    pub violations: Vec<ViolationGroup>,
    pub isolate_violations: bool,
    pub hide_nodes_without_violations: bool,
    pub node_name_filter: Option<String>,
    pub show_classes: bool,
    pub show_interfaces: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            type_filter: TypeFilterConfig::default(),
            folded: Vec::new(),
            violations: Vec::new(),
            isolate_violations: false,
            hide_nodes_without_violations: false,
            node_name_filter: None,
            show_classes: true,
            show_interfaces: true,
        }
    }
}

/// Absolute circles by node full name.
pub type Layout = HashMap<String, Circle>;

/// Load a view configuration from a specific path.
pub fn load_config_from_path(path: &Path) -> Result<ViewConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn load_layout_from_path(path: &Path) -> Result<Layout> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse layout file: {}", path.display()))
}
