use crate::domain::vector::{Circle, Vector};
use futures::future::BoxFuture;
use serde::Serialize;

/// Node tree port consumed by the dependency engine (implemented by the node tree).
///
/// All methods are keyed by full names. Names the tree does not know are answered
/// by the implementation, the engine never assumes they exist.
pub trait NodeLookup {
    /// The canonical full name of a known node.
    fn resolve(&self, full_name: &str) -> Option<&str>;

    /// Full name of the parent, `None` for the root and unknown nodes.
    fn parent_of(&self, full_name: &str) -> Option<&str>;

    fn is_package(&self, full_name: &str) -> bool;

    /// True if the node is folded or has no children passing the node filters.
    fn is_currently_leaf(&self, full_name: &str) -> bool;

    fn matches_type_and_name_filter(&self, full_name: &str) -> bool;

    fn is_visible(&self, full_name: &str) -> bool;

    fn absolute_circle(&self, full_name: &str) -> Option<Circle>;
}

impl<'a> dyn NodeLookup + 'a {
    pub fn get_by_name(&self, full_name: &str) -> Option<NodeRef<'_>> {
        let full_name = self.resolve(full_name)?;
        Some(NodeRef {
            nodes: self,
            full_name,
        })
    }
}

/// True if `full_name` equals `prefix` or names something nested below it.
pub fn full_name_starts_with(full_name: &str, prefix: &str) -> bool {
    match full_name.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('.') || rest.starts_with('$'),
        None => false,
    }
}

/// Handle on a node of a [`NodeLookup`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    nodes: &'a dyn NodeLookup,
    full_name: &'a str,
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NodeRef").field(&self.full_name).finish()
    }
}

impl<'a> NodeRef<'a> {
    pub fn full_name(&self) -> &'a str {
        self.full_name
    }

    pub fn is_package(&self) -> bool {
        self.nodes.is_package(self.full_name)
    }

    pub fn is_currently_leaf(&self) -> bool {
        self.nodes.is_currently_leaf(self.full_name)
    }

    pub fn absolute_circle(&self) -> Option<Circle> {
        self.nodes.absolute_circle(self.full_name)
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        let full_name = self.nodes.parent_of(self.full_name)?;
        Some(NodeRef {
            nodes: self.nodes,
            full_name,
        })
    }

    /// True if this node is a strict ancestor of `other`.
    pub fn is_predecessor_of(&self, other: &str) -> bool {
        let mut current = self.nodes.parent_of(other);
        while let Some(parent) = current {
            if parent == self.full_name {
                return true;
            }
            current = self.nodes.parent_of(parent);
        }
        false
    }

    pub fn is_predecessor_of_or_node_itself(&self, other: &str) -> bool {
        self.full_name == other || self.is_predecessor_of(other)
    }

    /// This node followed by its ancestors up to the root.
    pub fn self_and_predecessors(&self) -> Vec<NodeRef<'a>> {
        let mut result = vec![*self];
        let mut current = self.parent();
        while let Some(node) = current {
            result.push(node);
            current = node.parent();
        }
        result
    }

    /// Ancestors below `ancestor` and this node, topmost first.
    pub fn self_and_predecessors_until_exclusively(&self, ancestor: &str) -> Vec<NodeRef<'a>> {
        let mut result: Vec<NodeRef<'a>> = self
            .self_and_predecessors()
            .into_iter()
            .take_while(|node| node.full_name != ancestor)
            .collect();
        result.reverse();
        result
    }

    pub fn self_or_first_predecessor_matching(
        &self,
        predicate: impl Fn(&NodeRef<'a>) -> bool,
    ) -> Option<NodeRef<'a>> {
        self.self_and_predecessors()
            .into_iter()
            .find(|node| predicate(node))
    }
}

/// What a dependency view is told to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub from: String,
    pub to: String,
    pub start_point: Vector,
    pub end_point: Vector,
    pub is_visible: bool,
    pub is_violation: bool,
    pub properties: String,
}

/// Rendering port of a single grouped dependency.
pub trait DependencyView: Send {
    fn jump_to_position_and_show_if_visible(&mut self, state: &ViewState);

    /// Animates the line towards the endpoints of `state`. The future completes when the
    /// animation has finished. Visibility is left unchanged.
    fn move_to_position(&mut self, state: &ViewState) -> BoxFuture<'static, ()>;

    fn show_if_visible(&mut self, state: &ViewState);

    fn hide(&mut self);
}

/// Creates one view per grouped dependency.
pub trait ViewFactory: Send {
    fn create_view(&self, from: &str, to: &str) -> Box<dyn DependencyView>;
}
