//! The dependency engine.
//!
//! Owns the elementary dependencies of a report and keeps the set of visible grouped
//! dependencies in sync with filters, folded nodes and shown violations. Node state is
//! read through the [`NodeLookup`] port passed into every operation.

use crate::domain::builder::DependencyBuilder;
use crate::domain::elementary::{DetailedDependency, ElementaryDependency};
use crate::domain::filter::{DependencyFilterKey, FilterGroup, TypeFilterConfig};
use crate::domain::grouped::{
    DependencyId, DependencyRegistry, GroupedDependency, ViewHandle, VisibleViews,
};
use crate::domain::ports::{NodeLookup, ViewFactory, full_name_starts_with};
use crate::domain::queue::{UpdateHandle, UpdateQueue};
use crate::domain::semantic::ReportInput;
use crate::domain::transform::{FoldTransformers, apply_transformers};
use crate::domain::vector::Circle;
use crate::domain::violations::{ViolationGroup, Violations};
use futures::future::join_all;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Source/target pair driving the node layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Events of the node tree the engine reacts to.
#[derive(Debug, Clone, Copy)]
pub enum NodeEvent<'a> {
    Drag { node: &'a str },
    Fold { node: &'a str, folded: bool },
    /// Fold state known before the first recomputation, no recomputation happens.
    InitialFold { node: &'a str, folded: bool },
    NodeFiltersChanged,
    LayoutChanged,
    NodesOverlapping { overlapped: &'a str, overlapping: Circle },
    ResetNodesOverlapping,
    FinishNodesOverlapping,
}

pub struct Dependencies {
    elementary: Vec<ElementaryDependency>,
    /// Indices into `elementary` passing all filters, in flattening order.
    filtered: Vec<usize>,
    transformers: FoldTransformers,
    registry: DependencyRegistry,
    visible: Vec<DependencyId>,
    /// Views of `visible`, read by queued updates when they run.
    visible_views: VisibleViews,
    violations: Violations,
    filter_group: FilterGroup,
    type_filter: TypeFilterConfig,
    hide_nodes_without_violations: bool,
    update_queue: UpdateQueue,
}

impl Dependencies {
    pub fn new(elementary: Vec<ElementaryDependency>, view_factory: Box<dyn ViewFactory>) -> Self {
        let filtered = (0..elementary.len()).collect();
        Self {
            elementary,
            filtered,
            transformers: FoldTransformers::new(),
            registry: DependencyRegistry::new(view_factory),
            visible: Vec::new(),
            visible_views: VisibleViews::default(),
            violations: Violations::new(),
            filter_group: FilterGroup::new(),
            type_filter: TypeFilterConfig::default(),
            hide_nodes_without_violations: false,
            update_queue: UpdateQueue::new(),
        }
    }

    pub fn from_report(report: &ReportInput, view_factory: Box<dyn ViewFactory>) -> Self {
        Self::new(DependencyBuilder::new().build(report), view_factory)
    }

    pub fn elementary(&self) -> &[ElementaryDependency] {
        &self.elementary
    }

    pub fn filtered(&self) -> impl Iterator<Item = &ElementaryDependency> {
        self.filtered.iter().map(|&i| &self.elementary[i])
    }

    pub fn filter_group(&self) -> &FilterGroup {
        &self.filter_group
    }

    pub fn type_filter(&self) -> &TypeFilterConfig {
        &self.type_filter
    }

    pub fn violations(&self) -> &Violations {
        &self.violations
    }

    pub fn is_folded(&self, full_name: &str) -> bool {
        self.transformers.is_folded(full_name)
    }

    /// Visible grouped dependencies in grouping order.
    pub fn visible(&self) -> impl Iterator<Item = &GroupedDependency> {
        self.visible.iter().filter_map(|id| self.registry.get(*id))
    }

    pub fn visible_ids(&self) -> &[DependencyId] {
        &self.visible
    }

    pub fn dependency(&self, id: DependencyId) -> Option<&GroupedDependency> {
        self.registry.get(id)
    }

    pub fn find_visible(&self, from: &str, to: &str) -> Option<&GroupedDependency> {
        self.visible().find(|d| d.from() == from && d.to() == to)
    }

    /// Get-or-create the unique grouped dependency of a pair, regrouping it from `members`.
    pub fn get_unique_dependency(
        &mut self,
        nodes: &dyn NodeLookup,
        from: &str,
        to: &str,
        members: &[&ElementaryDependency],
    ) -> DependencyId {
        self.registry.group(nodes, from, to, members)
    }

    /// Recomputes the visible set from the filtered dependencies and the topmost folded nodes.
    pub fn recreate_visible(&mut self, nodes: &dyn NodeLookup) {
        let Self {
            elementary,
            filtered,
            transformers,
            registry,
            visible,
            visible_views,
            ..
        } = self;
        let visible_before = std::mem::take(visible);

        let folded = transformers.topmost(nodes);
        let transformed = apply_transformers(
            nodes,
            &folded,
            filtered.iter().map(|&i| Cow::Borrowed(&elementary[i])).collect(),
        );

        let mut groups: IndexMap<(&str, &str), Vec<&ElementaryDependency>> = IndexMap::new();
        for dependency in &transformed {
            groups
                .entry((dependency.from.as_str(), dependency.to.as_str()))
                .or_default()
                .push(dependency.as_ref());
        }
        *visible = groups
            .iter()
            .map(|((from, to), members)| registry.group(nodes, from, to, members))
            .collect();

        let pairs: HashSet<(String, String)> = visible
            .iter()
            .filter_map(|id| registry.get(*id))
            .map(|d| (d.from().to_string(), d.to().to_string()))
            .collect();
        for id in visible.iter() {
            if let Some(dependency) = registry.get_mut(*id) {
                let reversed = (dependency.to().to_string(), dependency.from().to_string());
                dependency.visual_data.must_share_nodes = pairs.contains(&reversed);
                dependency.set_visible(true);
            }
        }

        let now_visible: HashSet<DependencyId> = visible.iter().copied().collect();
        for id in visible_before.into_iter().filter(|id| !now_visible.contains(id)) {
            if let Some(dependency) = registry.get_mut(id) {
                dependency.hide();
            }
        }
        visible_views.replace(
            visible
                .iter()
                .filter_map(|id| registry.get(*id))
                .map(|d| d.view().clone())
                .collect(),
        );

        debug!(
            "Recreated {} visible dependencies from {} filtered ({} folded)",
            visible.len(),
            filtered.len(),
            folded.len()
        );
    }

    /// Links for the layout: dependencies between nodes of different branches are replaced
    /// by links between the ancestors on both sides below their first common predecessor.
    pub fn all_links(&self, nodes: &dyn NodeLookup) -> Vec<Link> {
        let mut links: IndexMap<(String, String), Link> = IndexMap::new();
        for dependency in self.visible() {
            for link in transferred_links(nodes, dependency.from(), dependency.to()) {
                links.insert((link.source.clone(), link.target.clone()), link);
            }
        }
        links.into_values().collect()
    }

    /// Elementary accesses behind the displayed pair, unique by their rendered string.
    pub fn detailed_dependencies_of(
        &self,
        nodes: &dyn NodeLookup,
        from: &str,
        to: &str,
    ) -> Vec<DetailedDependency> {
        let from_matcher = EndpointMatcher::new(nodes, from);
        let to_matcher = EndpointMatcher::new(nodes, to);

        let mut unique: IndexMap<String, DetailedDependency> = IndexMap::new();
        for dependency in self
            .filtered()
            .filter(|d| d.description.has_title())
            .filter(|d| from_matcher.matches(&d.from) && to_matcher.matches(&d.to))
        {
            let detailed = dependency.to_detailed(from, to);
            unique.insert(detailed.description.clone(), detailed);
        }
        unique.into_values().collect()
    }

    fn violation_dependencies(&self) -> impl Iterator<Item = &ElementaryDependency> {
        self.filtered().filter(|d| self.violations.contains(d))
    }

    /// First common predecessors of the endpoints of every filtered violation, distinct.
    pub fn nodes_containing_violations(&self, nodes: &dyn NodeLookup) -> Vec<String> {
        let mut containing: IndexSet<String> = IndexSet::new();
        for dependency in self.violation_dependencies() {
            let common = nodes.get_by_name(&dependency.from).and_then(|from| {
                from.self_or_first_predecessor_matching(|n| n.is_predecessor_of(&dependency.to))
            });
            if let Some(common) = common {
                containing.insert(common.full_name().to_string());
            }
        }
        containing.into_iter().collect()
    }

    pub fn nodes_involved_in_visible_violations(&self) -> IndexSet<String> {
        let violations: Vec<&ElementaryDependency> = self.violation_dependencies().collect();
        violations
            .iter()
            .map(|d| d.from.clone())
            .chain(violations.iter().map(|d| d.to.clone()))
            .collect()
    }

    /// Names of all endpoints of visible dependencies.
    pub fn distinct_nodes_having_dependencies(&self) -> IndexSet<String> {
        self.visible()
            .map(|d| d.from().to_string())
            .chain(self.visible().map(|d| d.to().to_string()))
            .collect()
    }

    pub fn show_violations(&mut self, nodes: &dyn NodeLookup, group: ViolationGroup) {
        let rule = group.rule.clone();
        if self.violations.add_group(group) {
            info!("Showing violations of rule {}", rule);
        }
        self.refresh_violation_dependencies(nodes);
    }

    pub fn hide_violations(&mut self, nodes: &dyn NodeLookup, group: &ViolationGroup) {
        if self.violations.remove_group(&group.rule) {
            info!("Hiding violations of rule {}", group.rule);
        }
        self.refresh_violation_dependencies(nodes);
    }

    fn refresh_violation_dependencies(&mut self, nodes: &dyn NodeLookup) {
        self.violations.refresh_marks(&mut self.elementary);
        self.update_filter(nodes, DependencyFilterKey::Violations);
    }

    /// Turns violation isolation on or off: when on, only violations pass while a group is shown.
    pub fn set_isolate_violations(&mut self, nodes: &dyn NodeLookup, isolate: bool) {
        self.filter_group
            .set_precondition(DependencyFilterKey::Violations, isolate);
        self.refresh_violation_dependencies(nodes);
    }

    pub fn set_hide_nodes_without_violations(&mut self, hide: bool) {
        self.hide_nodes_without_violations = hide;
    }

    /// Node filter for the tree: the nodes involved in visible violations, or `None` to lift it.
    pub fn violations_node_filter(&self) -> Option<HashSet<String>> {
        if self.hide_nodes_without_violations && !self.violations.is_empty() {
            Some(self.nodes_involved_in_visible_violations().into_iter().collect())
        } else {
            None
        }
    }

    pub fn filter_by_type(&mut self, nodes: &dyn NodeLookup, config: TypeFilterConfig) {
        self.type_filter = config;
        self.update_filter(nodes, DependencyFilterKey::Type);
    }

    /// Re-stamps one filter flag on every elementary dependency and recomputes the visible set.
    pub fn update_filter(&mut self, nodes: &dyn NodeLookup, key: DependencyFilterKey) {
        self.update_filters(nodes, &[key]);
    }

    /// Same as [`Self::update_filter`] for a qualified name like `dependencies.type`.
    pub fn update_filter_by_name(&mut self, nodes: &dyn NodeLookup, qualified_name: &str) -> bool {
        match qualified_name.parse::<DependencyFilterKey>() {
            Ok(key) => {
                self.update_filter(nodes, key);
                true
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    pub fn update_all_filters(&mut self, nodes: &dyn NodeLookup) {
        self.update_filters(nodes, &DependencyFilterKey::ALL);
    }

    fn update_filters(&mut self, nodes: &dyn NodeLookup, keys: &[DependencyFilterKey]) {
        let Self {
            elementary,
            violations,
            type_filter,
            filter_group,
            ..
        } = self;
        for key in keys {
            let enabled = filter_group.is_enabled(*key);
            for dependency in elementary.iter_mut() {
                let matches =
                    !enabled || matches_filter(*key, dependency, nodes, violations, type_filter);
                dependency.set_matches_filter(*key, matches);
            }
        }
        self.apply_filters_and_reposition(nodes);
    }

    fn apply_filters_and_reposition(&mut self, nodes: &dyn NodeLookup) {
        self.filtered = (0..self.elementary.len())
            .filter(|&i| self.elementary[i].matches_all_filters())
            .collect();
        self.recreate_visible(nodes);
        let _jumping = self.jump_all_to_their_positions(nodes);
    }

    /// Registers a fold without recomputing, for the fold state present before the first recomputation.
    pub fn note_that_node_folded(&mut self, full_name: &str, folded: bool) {
        self.transformers.set_folded(full_name, folded);
    }

    pub fn update_on_node_folded(&mut self, nodes: &dyn NodeLookup, full_name: &str, folded: bool) {
        if self.transformers.set_folded(full_name, folded) {
            debug!("Node {} folded: {}", full_name, folded);
        }
        self.recreate_visible(nodes);
    }

    /// Dispatches a node tree event. Jumps after filter changes and moves caused by
    /// [`NodeEvent::LayoutChanged`] are queued, [`Self::pending_updates`] resolves once they
    /// have completed.
    pub fn handle_node_event(&mut self, nodes: &dyn NodeLookup, event: NodeEvent<'_>) {
        match event {
            NodeEvent::Drag { node } => self.jump_specific_dependencies_to_their_positions(nodes, node),
            NodeEvent::Fold { node, folded } => self.update_on_node_folded(nodes, node, folded),
            NodeEvent::InitialFold { node, folded } => self.note_that_node_folded(node, folded),
            NodeEvent::NodeFiltersChanged => self.update_filters(
                nodes,
                &[
                    DependencyFilterKey::NodeTypeAndName,
                    DependencyFilterKey::VisibleNodes,
                ],
            ),
            NodeEvent::LayoutChanged => {
                let _moving = self.move_all_to_their_positions(nodes);
            }
            NodeEvent::NodesOverlapping {
                overlapped,
                overlapping,
            } => self.hide_dependencies_on_nodes_overlapping(overlapped, overlapping),
            NodeEvent::ResetNodesOverlapping => self.reset_visibility(),
            NodeEvent::FinishNodesOverlapping => self.finish_on_nodes_overlapping(),
        }
    }

    fn endpoints(nodes: &dyn NodeLookup, dependency: &GroupedDependency) -> Option<(Circle, Circle)> {
        let start = nodes.absolute_circle(dependency.from());
        let end = nodes.absolute_circle(dependency.to());
        match (start, end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => {
                debug!("No layout for {}, keeping its position", dependency.identifying_string());
                None
            }
        }
    }

    /// Places the endpoints of every visible dependency on the current circles.
    fn recalc_all(&mut self, nodes: &dyn NodeLookup) {
        for id in &self.visible {
            if let Some(dependency) = self.registry.get_mut(*id)
                && let Some((start, end)) = Self::endpoints(nodes, dependency)
            {
                dependency.recalc(start, end);
            }
        }
    }

    /// Recalculates the endpoints now and queues the jump of every visible dependency behind
    /// any update still running.
    pub fn jump_all_to_their_positions(&mut self, nodes: &dyn NodeLookup) -> UpdateHandle {
        self.recalc_all(nodes);
        let views = self.visible_views.clone();
        self.update_queue.do_next(async move {
            for view in views.current() {
                view.jump_to_position();
            }
        })
    }

    /// Jumps the visible dependencies with an endpoint at or below `node`.
    pub fn jump_specific_dependencies_to_their_positions(&mut self, nodes: &dyn NodeLookup, node: &str) {
        let touches = |name: &str| match nodes.get_by_name(node) {
            Some(node) => node.is_predecessor_of_or_node_itself(name),
            None => full_name_starts_with(name, node),
        };
        for id in &self.visible {
            if let Some(dependency) = self.registry.get_mut(*id)
                && (touches(dependency.from()) || touches(dependency.to()))
                && let Some((start, end)) = Self::endpoints(nodes, dependency)
            {
                dependency.jump_to_position(start, end);
            }
        }
    }

    /// Queues an animated move of every visible dependency behind any update still running.
    ///
    /// Endpoints are recalculated right away. The batch moves the dependencies visible when it
    /// starts, to their latest endpoints. The returned handle has to be awaited (or spawned)
    /// to drive the animations.
    pub fn move_all_to_their_positions(&mut self, nodes: &dyn NodeLookup) -> UpdateHandle {
        self.recalc_all(nodes);
        debug!("Queueing move of {} dependencies", self.visible.len());
        let views = self.visible_views.clone();
        self.update_queue.do_next(async move {
            join_all(views.current().into_iter().map(ViewHandle::move_to_position)).await;
        })
    }

    /// Resolves once every queued jump and move has completed.
    pub fn pending_updates(&self) -> UpdateHandle {
        self.update_queue.tail()
    }

    fn hide_dependencies_on_nodes_overlapping(&mut self, overlapped: &str, overlapping: Circle) {
        for id in &self.visible {
            let Some(dependency) = self.registry.get_mut(*id) else {
                continue;
            };
            if dependency.from() == overlapped {
                dependency.hide_on_start_overlapping(overlapping);
            }
            if dependency.to() == overlapped {
                dependency.hide_on_target_overlapping(overlapping);
            }
        }
    }

    fn reset_visibility(&mut self) {
        for id in &self.visible {
            if let Some(dependency) = self.registry.get_mut(*id) {
                dependency.set_visible(true);
            }
        }
    }

    fn finish_on_nodes_overlapping(&mut self) {
        for id in &self.visible {
            if let Some(dependency) = self.registry.get_mut(*id) {
                dependency.show_view_if_visible();
            }
        }
    }
}

fn matches_filter(
    key: DependencyFilterKey,
    dependency: &ElementaryDependency,
    nodes: &dyn NodeLookup,
    violations: &Violations,
    type_filter: &TypeFilterConfig,
) -> bool {
    match key {
        DependencyFilterKey::Type => passes_type_filter(type_filter, nodes, dependency),
        DependencyFilterKey::NodeTypeAndName => {
            nodes.matches_type_and_name_filter(&dependency.from)
                && nodes.matches_type_and_name_filter(&dependency.to)
        }
        DependencyFilterKey::Violations => violations.passes_filter(dependency),
        DependencyFilterKey::VisibleNodes => {
            nodes.is_visible(&dependency.from) && nodes.is_visible(&dependency.to)
        }
    }
}

fn passes_type_filter(
    config: &TypeFilterConfig,
    nodes: &dyn NodeLookup,
    dependency: &ElementaryDependency,
) -> bool {
    let type_shown = dependency
        .description
        .dependency_type()
        .is_none_or(|t| config.shows(t));
    let contains = |outer: &str, inner: &str| match nodes.get_by_name(outer) {
        Some(outer) => outer.is_predecessor_of_or_node_itself(inner),
        None => full_name_starts_with(inner, outer),
    };
    let between_class_and_inner_class =
        contains(&dependency.from, &dependency.to) || contains(&dependency.to, &dependency.from);
    type_shown
        && (!between_class_and_inner_class
            || config.show_dependencies_between_class_and_its_inner_classes)
}

/// Packages and nodes currently drawn as leaves cover everything nested in them.
struct EndpointMatcher<'a> {
    endpoint: &'a str,
    by_prefix: bool,
}

impl<'a> EndpointMatcher<'a> {
    fn new(nodes: &dyn NodeLookup, endpoint: &'a str) -> Self {
        let by_prefix = nodes
            .get_by_name(endpoint)
            .is_some_and(|node| node.is_package() || node.is_currently_leaf());
        Self {
            endpoint,
            by_prefix,
        }
    }

    fn matches(&self, name: &str) -> bool {
        if self.by_prefix {
            full_name_starts_with(name, self.endpoint)
        } else {
            name == self.endpoint
        }
    }
}

fn transferred_links(nodes: &dyn NodeLookup, from: &str, to: &str) -> Vec<Link> {
    let direct = || vec![Link::new(from, to)];
    let (Some(source), Some(target)) = (nodes.get_by_name(from), nodes.get_by_name(to)) else {
        return direct();
    };
    if source.is_predecessor_of(to) || target.is_predecessor_of(from) {
        return direct();
    }
    let Some(common) = source.self_or_first_predecessor_matching(|n| n.is_predecessor_of(to)) else {
        return direct();
    };

    let source_predecessors = source.self_and_predecessors_until_exclusively(common.full_name());
    let target_predecessors = target.self_and_predecessors_until_exclusively(common.full_name());
    let (short, long) = if target_predecessors.len() < source_predecessors.len() {
        (target_predecessors, source_predecessors)
    } else {
        (source_predecessors, target_predecessors)
    };

    let mut links: Vec<Link> = short
        .iter()
        .zip(long.iter())
        .map(|(a, b)| Link::new(a.full_name(), b.full_name()))
        .collect();
    if let Some(last) = short.last() {
        links.extend(
            long[short.len()..]
                .iter()
                .map(|node| Link::new(last.full_name(), node.full_name())),
        );
    }
    links
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependencies")
            .field("elementary", &self.elementary.len())
            .field("filtered", &self.filtered.len())
            .field("visible", &self.visible.len())
            .field("registered", &self.registry.len())
            .finish()
    }
}
