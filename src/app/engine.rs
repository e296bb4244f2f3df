use crate::adapters::view::{HeadlessViewFactory, ViewLog};
use crate::app::dto::*;
use crate::config::{Layout, ViewConfig};
use crate::domain::dependencies::{Dependencies, NodeEvent};
use crate::domain::semantic::ReportInput;
use crate::domain::tree::NodeTree;
use crate::domain::violations::ViolationGroup;
use anyhow::{Context as _, Result, anyhow};
use std::path::Path;
use tracing::{info, warn};

/// One loaded report: the node tree and the dependency engine kept in sync.
///
/// Every change to the tree (folds, node filters) is forwarded to the engine as a node event.
pub struct ReportSession {
    tree: NodeTree,
    dependencies: Dependencies,
    available_violations: Vec<ViolationGroup>,
    view_log: ViewLog,
}

impl ReportSession {
    pub fn load_from_json(json_path: &Path) -> Result<Self> {
        let json_content = std::fs::read_to_string(json_path)
            .with_context(|| format!("Failed to read report JSON: {}", json_path.display()))?;
        let report: ReportInput =
            serde_json::from_str(&json_content).context("Failed to parse report JSON")?;
        Ok(Self::from_report(&report))
    }

    pub fn from_report(report: &ReportInput) -> Self {
        Self::with_views(report, HeadlessViewFactory::new(ViewLog::new()))
    }

    /// Builds the session and computes the initial visible dependencies.
    pub fn with_views(report: &ReportInput, view_factory: HeadlessViewFactory) -> Self {
        let view_log = view_factory.log().clone();
        let tree = NodeTree::from_root(report.root());
        let mut dependencies = Dependencies::from_report(report, Box::new(view_factory));
        dependencies.update_all_filters(&tree);
        info!(
            "Loaded report with {} nodes and {} dependencies",
            tree.graph.node_count(),
            dependencies.elementary().len()
        );
        Self {
            tree,
            dependencies,
            available_violations: report.violations().to_vec(),
            view_log,
        }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    pub fn view_log(&self) -> &ViewLog {
        &self.view_log
    }

    /// Violation groups shipped with the report.
    pub fn available_violations(&self) -> &[ViolationGroup] {
        &self.available_violations
    }

    pub fn apply_config(&mut self, config: &ViewConfig) -> Result<()> {
        self.tree
            .set_type_filter(config.show_classes, config.show_interfaces);
        self.tree
            .set_name_filter(config.node_name_filter.as_deref())?;
        self.dependencies
            .filter_by_type(&self.tree, config.type_filter);
        self.dependencies
            .handle_node_event(&self.tree, NodeEvent::NodeFiltersChanged);

        for name in &config.folded {
            if self.tree.set_folded(name, true) {
                self.dependencies.handle_node_event(
                    &self.tree,
                    NodeEvent::InitialFold {
                        node: name,
                        folded: true,
                    },
                );
            } else {
                warn!("Cannot fold {}: unknown node or nothing to fold", name);
            }
        }
        self.dependencies.recreate_visible(&self.tree);
        let _jumping = self.dependencies.jump_all_to_their_positions(&self.tree);

        self.dependencies
            .set_isolate_violations(&self.tree, config.isolate_violations);
        for group in &config.violations {
            self.dependencies
                .show_violations(&self.tree, group.clone());
        }
        self.set_hide_nodes_without_violations(config.hide_nodes_without_violations);
        Ok(())
    }

    pub fn fold(&mut self, full_name: &str) -> bool {
        self.set_folded(full_name, true)
    }

    pub fn unfold(&mut self, full_name: &str) -> bool {
        self.set_folded(full_name, false)
    }

    fn set_folded(&mut self, full_name: &str, folded: bool) -> bool {
        if !self.tree.set_folded(full_name, folded) {
            return false;
        }
        self.dependencies.handle_node_event(
            &self.tree,
            NodeEvent::Fold {
                node: full_name,
                folded,
            },
        );
        true
    }

    pub fn set_name_filter(&mut self, filter: Option<&str>) -> Result<()> {
        self.tree.set_name_filter(filter)?;
        self.dependencies
            .handle_node_event(&self.tree, NodeEvent::NodeFiltersChanged);
        self.refresh_violations_node_filter();
        Ok(())
    }

    pub fn set_node_type_filter(&mut self, show_classes: bool, show_interfaces: bool) {
        self.tree.set_type_filter(show_classes, show_interfaces);
        self.dependencies
            .handle_node_event(&self.tree, NodeEvent::NodeFiltersChanged);
        self.refresh_violations_node_filter();
    }

    pub fn show_violations(&mut self, group: ViolationGroup) {
        self.dependencies.show_violations(&self.tree, group);
        self.refresh_violations_node_filter();
    }

    pub fn hide_violations(&mut self, group: &ViolationGroup) {
        self.dependencies.hide_violations(&self.tree, group);
        self.refresh_violations_node_filter();
    }

    /// Shows the report's violation group of the given rule.
    pub fn show_violations_of_rule(&mut self, rule: &str) -> Result<()> {
        let group = self
            .available_violations
            .iter()
            .find(|group| group.rule == rule)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown violation rule: {}", rule))?;
        self.show_violations(group);
        Ok(())
    }

    pub fn set_isolate_violations(&mut self, isolate: bool) {
        self.dependencies
            .set_isolate_violations(&self.tree, isolate);
        self.refresh_violations_node_filter();
    }

    pub fn set_hide_nodes_without_violations(&mut self, hide: bool) {
        self.dependencies.set_hide_nodes_without_violations(hide);
        self.refresh_violations_node_filter();
    }

    /// Recomputes the tree's violations node filter. The previous restriction is lifted first,
    /// the involved nodes are taken from an unrestricted tree.
    fn refresh_violations_node_filter(&mut self) {
        let had_filter = self.tree.has_violations_filter();
        if had_filter {
            self.tree.set_violations_filter(None);
            self.dependencies
                .handle_node_event(&self.tree, NodeEvent::NodeFiltersChanged);
        }
        let node_filter = self.dependencies.violations_node_filter();
        if node_filter.is_some() {
            self.tree.set_violations_filter(node_filter);
            self.dependencies
                .handle_node_event(&self.tree, NodeEvent::NodeFiltersChanged);
        }
    }

    pub fn drag(&mut self, full_name: &str) {
        self.dependencies
            .handle_node_event(&self.tree, NodeEvent::Drag { node: full_name });
    }

    /// Applies absolute node circles and moves every visible dependency into place.
    /// Returns the layout entries unknown to the report.
    pub async fn apply_layout(&mut self, layout: &Layout) -> Vec<String> {
        let unknown = self.tree.apply_layout(layout);
        if !unknown.is_empty() {
            warn!("Layout names {} nodes missing from the report", unknown.len());
        }
        self.dependencies
            .handle_node_event(&self.tree, NodeEvent::LayoutChanged);
        self.dependencies.pending_updates().await;
        unknown
    }

    /// Resolves once the views have caught up with every change made so far.
    pub async fn settle(&self) {
        self.dependencies.pending_updates().await;
    }

    pub fn visible(&self) -> VisibleResponse {
        VisibleResponse {
            elementary_count: self.dependencies.elementary().len(),
            filtered_count: self.dependencies.filtered().count(),
            dependencies: self
                .dependencies
                .visible()
                .map(VisibleDependencyDto::from)
                .collect(),
        }
    }

    pub fn links(&self) -> LinksResponse {
        LinksResponse {
            links: self.dependencies.all_links(&self.tree),
        }
    }

    pub fn details(&self, from: &str, to: &str) -> DetailsResponse {
        DetailsResponse {
            from: from.to_string(),
            to: to.to_string(),
            details: self
                .dependencies
                .detailed_dependencies_of(&self.tree, from, to),
        }
    }

    pub fn violations(&self) -> ViolationsResponse {
        ViolationsResponse {
            rules: self
                .dependencies
                .violations()
                .rules()
                .map(str::to_string)
                .collect(),
            nodes_containing_violations: self
                .dependencies
                .nodes_containing_violations(&self.tree),
            nodes_involved_in_visible_violations: self
                .dependencies
                .nodes_involved_in_visible_violations()
                .into_iter()
                .collect(),
        }
    }

    pub fn positions(&self, unknown_nodes: Vec<String>) -> PositionsResponse {
        PositionsResponse {
            unknown_nodes,
            positions: self
                .dependencies
                .visible()
                .map(|dependency| PositionDto {
                    from: dependency.from().to_string(),
                    to: dependency.to().to_string(),
                    start_point: dependency.visual_data.start_point,
                    end_point: dependency.visual_data.end_point,
                    is_visible: dependency.is_visible(),
                })
                .collect(),
        }
    }
}

impl std::fmt::Debug for ReportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportSession")
            .field("nodes", &self.tree.graph.node_count())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
