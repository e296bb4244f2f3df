//! Grouped (visible) dependencies, their endpoint geometry and the registry keeping them unique.

use crate::domain::description::DependencyDescription;
use crate::domain::elementary::ElementaryDependency;
use crate::domain::ports::{DependencyView, NodeLookup, ViewFactory, ViewState};
use crate::domain::vector::{Circle, Vector};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Distance between the two lines of a pair of opposite dependencies.
const LINE_DIFF: f64 = 20.0;
/// Slack added to the radius of an overlapping node.
const OVERLAP_DELTA: f64 = 0.1;

/// Endpoints of a drawn dependency.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisualData {
    pub start_point: Vector,
    pub end_point: Vector,
    /// Set when the opposite dependency is visible too, so both lines get offset.
    pub must_share_nodes: bool,
}

impl VisualData {
    /// Places the endpoints on the rims of the start and end circles.
    pub fn recalc(&mut self, start: Circle, end: Circle) {
        let one_is_in_other = start.one_is_completely_within_the_other(&end);
        let start_is_smaller = start.r <= end.r;

        let start_direction = Vector::between(start.center(), end.center())
            .revert_if(one_is_in_other && start_is_smaller)
            .default_if_null();
        let end_direction = start_direction.revert_if(!one_is_in_other);

        let (start_direction, end_direction) = if self.must_share_nodes {
            let orthogonal = start_direction
                .orthogonal()
                .norm(LINE_DIFF / 2.0)
                .revert_if(one_is_in_other && !start_is_smaller);
            (
                start_direction.norm(start.r) + orthogonal,
                end_direction.norm(end.r) + orthogonal,
            )
        } else {
            (start_direction, end_direction)
        };

        self.start_point = start_direction.norm(start.r) + start.center();
        self.end_point = end_direction.norm(end.r) + end.center();
    }
}

struct ViewSlot {
    state: ViewState,
    view: Box<dyn DependencyView>,
}

/// Shared handle on the view of a grouped dependency and the state last published for it.
///
/// Queued updates draw through the handle when they run, so they always draw the latest
/// published state.
#[derive(Clone)]
pub struct ViewHandle {
    slot: Arc<Mutex<ViewSlot>>,
}

impl ViewHandle {
    fn new(state: ViewState, view: Box<dyn DependencyView>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(ViewSlot { state, view })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: ViewState) {
        self.lock().state = state;
    }

    pub fn jump_to_position(&self) {
        let mut slot = self.lock();
        let ViewSlot { state, view } = &mut *slot;
        view.jump_to_position_and_show_if_visible(state);
    }

    /// Animates towards the published endpoints, then shows the view if the dependency is
    /// still visible once the animation has finished.
    pub async fn move_to_position(self) {
        let moving = {
            let mut slot = self.lock();
            let ViewSlot { state, view } = &mut *slot;
            view.move_to_position(state)
        };
        moving.await;
        self.show_if_visible();
    }

    pub fn show_if_visible(&self) {
        let mut slot = self.lock();
        let ViewSlot { state, view } = &mut *slot;
        view.show_if_visible(state);
    }

    fn hide(&self) {
        self.lock().view.hide();
    }
}

/// Views of the currently visible dependencies, replaced on every recomputation.
#[derive(Clone, Default)]
pub struct VisibleViews {
    views: Arc<Mutex<Vec<ViewHandle>>>,
}

impl VisibleViews {
    pub fn replace(&self, views: Vec<ViewHandle>) {
        *self.views.lock().unwrap_or_else(PoisonError::into_inner) = views;
    }

    pub fn current(&self) -> Vec<ViewHandle> {
        self.views
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Index of a grouped dependency within its registry. Identity of grouped dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyId(pub usize);

/// A drawn dependency aggregating elementary dependencies between two visible nodes.
pub struct GroupedDependency {
    id: DependencyId,
    from: String,
    to: String,
    description: DependencyDescription,
    is_violation: bool,
    is_visible: bool,
    contains_package: bool,
    pub visual_data: VisualData,
    view: ViewHandle,
}

impl fmt::Debug for GroupedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupedDependency")
            .field("id", &self.id)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("description", &self.description)
            .field("is_violation", &self.is_violation)
            .field("is_visible", &self.is_visible)
            .field("visual_data", &self.visual_data)
            .finish()
    }
}

impl GroupedDependency {
    fn new(id: DependencyId, from: &str, to: &str, view: Box<dyn DependencyView>) -> Self {
        let state = ViewState {
            from: from.to_string(),
            to: to.to_string(),
            start_point: Vector::default(),
            end_point: Vector::default(),
            is_visible: false,
            is_violation: false,
            properties: "dependency".to_string(),
        };
        Self {
            id,
            from: from.to_string(),
            to: to.to_string(),
            description: DependencyDescription::Empty,
            is_violation: false,
            is_visible: false,
            contains_package: false,
            visual_data: VisualData::default(),
            view: ViewHandle::new(state, view),
        }
    }

    pub fn id(&self) -> DependencyId {
        self.id
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn description(&self) -> &DependencyDescription {
        &self.description
    }

    pub fn is_violation(&self) -> bool {
        self.is_violation
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub(crate) fn set_visible(&mut self, is_visible: bool) {
        self.is_visible = is_visible;
        self.publish();
    }

    pub fn view(&self) -> &ViewHandle {
        &self.view
    }

    /// Hands the current state to the view handle, for updates queued or running.
    fn publish(&self) {
        self.view.publish(self.view_state());
    }

    /// Packages carry no detail listing.
    pub fn has_detailed_description(&self) -> bool {
        !self.contains_package && self.description.has_detailed_description()
    }

    pub fn type_names(&self) -> String {
        let names = self.description.type_names();
        if names.is_empty() {
            "dependency".to_string()
        } else {
            format!("dependency {}", names)
        }
    }

    /// Css properties, e.g. `dependency methodCall violation`.
    pub fn properties(&self) -> String {
        if self.is_violation {
            format!("{} violation", self.type_names())
        } else {
            self.type_names()
        }
    }

    pub fn identifying_string(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            from: self.from.clone(),
            to: self.to.clone(),
            start_point: self.visual_data.start_point,
            end_point: self.visual_data.end_point,
            is_visible: self.is_visible,
            is_violation: self.is_violation,
            properties: self.properties(),
        }
    }

    pub fn hide(&mut self) {
        self.is_visible = false;
        self.publish();
        self.view.hide();
    }

    /// Places the endpoints on the given circles without drawing.
    pub fn recalc(&mut self, start: Circle, end: Circle) {
        self.visual_data.recalc(start, end);
        self.publish();
    }

    pub fn jump_to_position(&mut self, start: Circle, end: Circle) {
        self.recalc(start, end);
        self.view.jump_to_position();
    }

    pub fn show_view_if_visible(&mut self) {
        self.view.show_if_visible();
    }

    pub fn hide_on_start_overlapping(&mut self, overlapping: Circle) {
        let point = self.visual_data.start_point;
        self.hide_on_overlapping(point, overlapping);
    }

    pub fn hide_on_target_overlapping(&mut self, overlapping: Circle) {
        let point = self.visual_data.end_point;
        self.hide_on_overlapping(point, overlapping);
    }

    fn hide_on_overlapping(&mut self, point: Vector, overlapping: Circle) {
        if point.is_within_circle(overlapping.center(), overlapping.r + OVERLAP_DELTA) {
            self.hide();
        }
    }
}

impl fmt::Display for GroupedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}({})", self.from, self.to, self.description)
    }
}

fn contains_package(nodes: &dyn NodeLookup, from: &str, to: &str) -> bool {
    nodes.is_package(from) || nodes.is_package(to)
}

/// Owns every grouped dependency ever created, one per ordered endpoint pair.
///
/// Entries are never dropped, so a pair keeps its identity and view across recomputations.
pub struct DependencyRegistry {
    entries: Vec<GroupedDependency>,
    by_endpoints: HashMap<(String, String), DependencyId>,
    view_factory: Box<dyn ViewFactory>,
}

impl DependencyRegistry {
    pub fn new(view_factory: Box<dyn ViewFactory>) -> Self {
        Self {
            entries: Vec::new(),
            by_endpoints: HashMap::new(),
            view_factory,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: DependencyId) -> Option<&GroupedDependency> {
        self.entries.get(id.0)
    }

    pub fn get_mut(&mut self, id: DependencyId) -> Option<&mut GroupedDependency> {
        self.entries.get_mut(id.0)
    }

    pub fn find(&self, from: &str, to: &str) -> Option<DependencyId> {
        self.by_endpoints
            .get(&(from.to_string(), to.to_string()))
            .copied()
    }

    fn get_or_create(&mut self, from: &str, to: &str) -> DependencyId {
        if let Some(id) = self.find(from, to) {
            return id;
        }
        let id = DependencyId(self.entries.len());
        let view = self.view_factory.create_view(from, to);
        self.entries.push(GroupedDependency::new(id, from, to, view));
        self.by_endpoints
            .insert((from.to_string(), to.to_string()), id);
        id
    }

    /// Returns the unique grouped dependency of the pair, with description and violation
    /// flag replaced by the aggregate of `members`.
    pub fn group(
        &mut self,
        nodes: &dyn NodeLookup,
        from: &str,
        to: &str,
        members: &[&ElementaryDependency],
    ) -> DependencyId {
        let contains_package = contains_package(nodes, from, to);
        let description = if contains_package {
            DependencyDescription::Empty
        } else {
            DependencyDescription::grouped(members.iter().map(|d| &d.description))
        };
        let is_violation = members.iter().any(|d| d.is_violation);

        let id = self.get_or_create(from, to);
        let entry = &mut self.entries[id.0];
        entry.description = description;
        entry.is_violation = is_violation;
        entry.contains_package = contains_package;
        entry.publish();
        id
    }
}
