//! Node tree of packages, classes and interfaces, backing the [`NodeLookup`] port.

use crate::domain::ports::{NodeLookup, full_name_starts_with};
use crate::domain::semantic::{JsonElement, NodeKind};
use crate::domain::vector::Circle;
use anyhow::{Context as _, Result};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub full_name: String,
    pub name: String,
    pub kind: NodeKind,
    pub folded: bool,
    /// Absolute circle once a layout has been applied.
    pub circle: Option<Circle>,
}

/// Node name filter: `|` separated patterns, `*` wildcards, `~` excludes.
///
/// A pattern matching a name also matches everything nested below it.
#[derive(Debug, Clone)]
pub struct NameFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl NameFilter {
    pub fn parse(filter: &str) -> Result<Self> {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();
        for pattern in filter.split('|').map(str::trim).filter(|p| !p.is_empty()) {
            match pattern.strip_prefix('~') {
                Some(excluded) => excludes.push(pattern_to_regex(excluded.trim())?),
                None => includes.push(pattern_to_regex(pattern)?),
            }
        }
        Ok(Self { includes, excludes })
    }

    pub fn matches(&self, full_name: &str) -> bool {
        (self.includes.is_empty() || self.includes.iter().any(|r| r.is_match(full_name)))
            && !self.excludes.iter().any(|r| r.is_match(full_name))
    }
}

fn pattern_to_regex(pattern: &str) -> Result<Regex> {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!(r"^{}(?:[.$].*)?$", escaped))
        .with_context(|| format!("Invalid node name pattern: {}", pattern))
}

pub struct NodeTree {
    /// Edges point from parent to child.
    pub graph: DiGraph<TreeNode, ()>,
    name_to_node: HashMap<String, NodeIndex>,
    root: NodeIndex,
    name_filter: Option<NameFilter>,
    show_classes: bool,
    show_interfaces: bool,
    violations_filter: Option<HashSet<String>>,
}

impl NodeTree {
    pub fn from_root(root: &JsonElement) -> Self {
        let mut graph = DiGraph::new();
        let mut name_to_node = HashMap::new();
        let root_idx = add_element(&mut graph, &mut name_to_node, root, None);
        debug!("Built node tree with {} nodes", graph.node_count());
        Self {
            graph,
            name_to_node,
            root: root_idx,
            name_filter: None,
            show_classes: true,
            show_interfaces: true,
            violations_filter: None,
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.graph[self.root]
    }

    pub fn get_node_by_name(&self, full_name: &str) -> Option<NodeIndex> {
        self.name_to_node.get(full_name).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &TreeNode {
        &self.graph[idx]
    }

    /// Children in input order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(idx, Direction::Incoming).next()
    }

    pub fn is_folded(&self, full_name: &str) -> bool {
        self.get_node_by_name(full_name)
            .is_some_and(|idx| self.graph[idx].folded)
    }

    /// Folds or unfolds an inner node. The root and leaves never change. Returns whether the state changed.
    pub fn set_folded(&mut self, full_name: &str, folded: bool) -> bool {
        let Some(idx) = self.get_node_by_name(full_name) else {
            return false;
        };
        if idx == self.root || self.children(idx).is_empty() || self.graph[idx].folded == folded {
            return false;
        }
        self.graph[idx].folded = folded;
        debug!("Node {} folded: {}", full_name, folded);
        true
    }

    pub fn folded_nodes(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|idx| self.graph[*idx].folded)
            .map(|idx| self.graph[idx].full_name.as_str())
            .collect()
    }

    pub fn set_name_filter(&mut self, filter: Option<&str>) -> Result<()> {
        self.name_filter = match filter.map(str::trim).filter(|f| !f.is_empty()) {
            Some(filter) => Some(NameFilter::parse(filter)?),
            None => None,
        };
        Ok(())
    }

    pub fn set_type_filter(&mut self, show_classes: bool, show_interfaces: bool) {
        self.show_classes = show_classes;
        self.show_interfaces = show_interfaces;
    }

    /// Restricts visible nodes to those involved in the given names, or lifts the restriction.
    pub fn set_violations_filter(&mut self, names: Option<HashSet<String>>) {
        self.violations_filter = names;
    }

    pub fn has_violations_filter(&self) -> bool {
        self.violations_filter.is_some()
    }

    pub fn set_absolute_circle(&mut self, full_name: &str, circle: Circle) -> bool {
        match self.get_node_by_name(full_name) {
            Some(idx) => {
                self.graph[idx].circle = Some(circle);
                true
            }
            None => false,
        }
    }

    /// Applies absolute circles by node name. Returns the names unknown to the tree.
    pub fn apply_layout(&mut self, layout: &HashMap<String, Circle>) -> Vec<String> {
        let mut unknown: Vec<String> = layout
            .iter()
            .filter(|(name, circle)| !self.set_absolute_circle(name, **circle))
            .map(|(name, _)| name.clone())
            .collect();
        unknown.sort();
        unknown
    }

    fn has_active_type_or_name_filter(&self) -> bool {
        self.name_filter.is_some() || !self.show_classes || !self.show_interfaces
    }

    fn passes_type_and_name_filter(&self, idx: NodeIndex) -> bool {
        if idx == self.root || !self.has_active_type_or_name_filter() {
            return true;
        }
        let node = &self.graph[idx];
        let name_matches = || {
            self.name_filter
                .as_ref()
                .is_none_or(|f| f.matches(&node.full_name))
        };
        let own = match node.kind {
            NodeKind::Package => false,
            NodeKind::Class => self.show_classes && name_matches(),
            NodeKind::Interface => self.show_interfaces && name_matches(),
        };
        own || self
            .children(idx)
            .into_iter()
            .any(|child| self.passes_type_and_name_filter(child))
    }

    fn passes_violations_filter(&self, idx: NodeIndex) -> bool {
        match &self.violations_filter {
            None => true,
            Some(names) => {
                idx == self.root
                    || names
                        .iter()
                        .any(|name| full_name_starts_with(name, &self.graph[idx].full_name))
            }
        }
    }

    fn is_visible_node(&self, idx: NodeIndex) -> bool {
        self.passes_type_and_name_filter(idx) && self.passes_violations_filter(idx)
    }
}

fn add_element(
    graph: &mut DiGraph<TreeNode, ()>,
    name_to_node: &mut HashMap<String, NodeIndex>,
    element: &JsonElement,
    parent: Option<NodeIndex>,
) -> NodeIndex {
    let idx = graph.add_node(TreeNode {
        full_name: element.full_name.clone(),
        name: element.simple_name().to_string(),
        kind: element.kind,
        folded: false,
        circle: None,
    });
    name_to_node.insert(element.full_name.clone(), idx);
    if let Some(parent) = parent {
        graph.add_edge(parent, idx, ());
    }
    for child in &element.children {
        add_element(graph, name_to_node, child, Some(idx));
    }
    idx
}

impl NodeLookup for NodeTree {
    fn resolve(&self, full_name: &str) -> Option<&str> {
        self.get_node_by_name(full_name)
            .map(|idx| self.graph[idx].full_name.as_str())
    }

    fn parent_of(&self, full_name: &str) -> Option<&str> {
        let idx = self.get_node_by_name(full_name)?;
        self.parent(idx)
            .map(|parent| self.graph[parent].full_name.as_str())
    }

    fn is_package(&self, full_name: &str) -> bool {
        self.get_node_by_name(full_name)
            .is_some_and(|idx| self.graph[idx].kind == NodeKind::Package)
    }

    fn is_currently_leaf(&self, full_name: &str) -> bool {
        let Some(idx) = self.get_node_by_name(full_name) else {
            return true;
        };
        self.graph[idx].folded
            || !self
                .children(idx)
                .into_iter()
                .any(|child| self.is_visible_node(child))
    }

    fn matches_type_and_name_filter(&self, full_name: &str) -> bool {
        self.get_node_by_name(full_name)
            .is_none_or(|idx| self.passes_type_and_name_filter(idx))
    }

    fn is_visible(&self, full_name: &str) -> bool {
        self.get_node_by_name(full_name)
            .is_none_or(|idx| self.is_visible_node(idx))
    }

    fn absolute_circle(&self, full_name: &str) -> Option<Circle> {
        self.get_node_by_name(full_name)
            .and_then(|idx| self.graph[idx].circle)
    }
}
