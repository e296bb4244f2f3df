//! Fold transformers: rewriting elementary dependencies onto folded nodes.

use crate::domain::description::DependencyDescription;
use crate::domain::elementary::ElementaryDependency;
use crate::domain::ports::{NodeLookup, full_name_starts_with};
use indexmap::IndexSet;
use std::borrow::Cow;
use std::collections::HashSet;

/// The nodes currently folded from the engine's point of view, in fold order.
///
/// Only the folded names are stored. The transformation of a folded node is derived from its
/// name when needed, see [`fold_into`] and [`apply_transformers`].
#[derive(Debug, Clone, Default)]
pub struct FoldTransformers {
    folded: IndexSet<String>,
}

impl FoldTransformers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a node as folded or unfolded. Returns whether anything changed.
    pub fn set_folded(&mut self, full_name: &str, folded: bool) -> bool {
        if folded {
            self.folded.insert(full_name.to_string())
        } else {
            self.folded.shift_remove(full_name)
        }
    }

    pub fn is_folded(&self, full_name: &str) -> bool {
        self.folded.contains(full_name)
    }

    pub fn folded(&self) -> impl Iterator<Item = &str> {
        self.folded.iter().map(String::as_str)
    }

    /// Folded nodes that have no folded ancestor, kept in fold order.
    pub fn topmost(&self, nodes: &dyn NodeLookup) -> Vec<&str> {
        let mut by_length: Vec<&str> = self.folded().collect();
        by_length.sort_by_key(|name| name.len());

        let mut topmost: HashSet<&str> = HashSet::new();
        for name in by_length {
            let covered = match nodes.get_by_name(name) {
                Some(node) => node
                    .self_and_predecessors()
                    .iter()
                    .any(|p| topmost.contains(p.full_name())),
                None => topmost
                    .iter()
                    .any(|folded| full_name_starts_with(name, folded)),
            };
            if !covered {
                topmost.insert(name);
            }
        }

        self.folded().filter(|name| topmost.contains(name)).collect()
    }
}

/// Moves a dependency onto new endpoints.
///
/// Package endpoints get an empty description. An unchanged pair keeps the original
/// dependency, any other pair becomes a `childrenAccess`.
pub fn shift_elementary_dependency<'a>(
    nodes: &dyn NodeLookup,
    dependency: Cow<'a, ElementaryDependency>,
    new_from: &str,
    new_to: &str,
) -> Cow<'a, ElementaryDependency> {
    if nodes.is_package(new_from) || nodes.is_package(new_to) {
        return Cow::Owned(
            ElementaryDependency::new(new_from, new_to, DependencyDescription::Empty)
                .with_violation(dependency.is_violation),
        );
    }
    if dependency.from == new_from && dependency.to == new_to {
        return dependency;
    }
    let description = DependencyDescription::ChildAccess {
        has_detailed_description: dependency.description.has_detailed_description(),
    };
    Cow::Owned(
        ElementaryDependency::new(new_from, new_to, description)
            .with_violation(dependency.is_violation),
    )
}

/// Applies the transformer of `folded` in two stages: targets first, then origins.
///
/// Dependencies that end up starting and ending at the folded node are dropped.
pub fn fold_into<'a>(
    nodes: &dyn NodeLookup,
    folded: &str,
    dependencies: Vec<Cow<'a, ElementaryDependency>>,
) -> Vec<Cow<'a, ElementaryDependency>> {
    let (targets_inside, mut after_targets): (Vec<_>, Vec<_>) = dependencies
        .into_iter()
        .partition(|d| full_name_starts_with(&d.to, folded));
    for dependency in targets_inside {
        let from = dependency.from.clone();
        after_targets.push(shift_elementary_dependency(nodes, dependency, &from, folded));
    }

    let (origins_inside, mut result): (Vec<_>, Vec<_>) = after_targets
        .into_iter()
        .partition(|d| full_name_starts_with(&d.from, folded));
    for dependency in origins_inside {
        let to = dependency.to.clone();
        let shifted = shift_elementary_dependency(nodes, dependency, folded, &to);
        if shifted.from != shifted.to {
            result.push(shifted);
        }
    }
    result
}

pub fn apply_transformers<'a>(
    nodes: &dyn NodeLookup,
    folded: &[&str],
    dependencies: Vec<Cow<'a, ElementaryDependency>>,
) -> Vec<Cow<'a, ElementaryDependency>> {
    folded
        .iter()
        .fold(dependencies, |dependencies, name| fold_into(nodes, name, dependencies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::description::DependencyType;
    use crate::domain::vector::Circle;

    /// Packages end with `pkg`, everything else is a class. Parents follow the dots.
    struct NameOnlyTree;

    impl NodeLookup for NameOnlyTree {
        fn resolve(&self, _full_name: &str) -> Option<&str> {
            None
        }

        fn parent_of(&self, _full_name: &str) -> Option<&str> {
            None
        }

        fn is_package(&self, full_name: &str) -> bool {
            full_name.ends_with("pkg")
        }

        fn is_currently_leaf(&self, _full_name: &str) -> bool {
            true
        }

        fn matches_type_and_name_filter(&self, _full_name: &str) -> bool {
            true
        }

        fn is_visible(&self, _full_name: &str) -> bool {
            true
        }

        fn absolute_circle(&self, _full_name: &str) -> Option<Circle> {
            None
        }
    }

    fn call(from: &str, to: &str) -> ElementaryDependency {
        ElementaryDependency::new(
            from,
            to,
            DependencyDescription::new(
                DependencyType::MethodCall,
                Some("a()".to_string()),
                Some("b()".to_string()),
            ),
        )
    }

    #[test]
    fn test_shift_onto_package_gives_empty_description() {
        let dependency = call("x.pkg.A", "x.B").with_violation(true);
        let shifted = shift_elementary_dependency(&NameOnlyTree, Cow::Borrowed(&dependency), "x.pkg", "x.B");
        assert_eq!(shifted.description, DependencyDescription::Empty);
        assert!(shifted.is_violation);
    }

    #[test]
    fn test_shift_onto_same_pair_keeps_dependency() {
        let dependency = call("x.A", "x.B");
        let shifted = shift_elementary_dependency(&NameOnlyTree, Cow::Borrowed(&dependency), "x.A", "x.B");
        assert!(matches!(shifted, Cow::Borrowed(_)));
    }

    #[test]
    fn test_shift_onto_outer_class_gives_children_access() {
        let dependency = call("x.A$Inner", "x.B");
        let shifted = shift_elementary_dependency(&NameOnlyTree, Cow::Borrowed(&dependency), "x.A", "x.B");
        assert_eq!(
            shifted.description,
            DependencyDescription::ChildAccess {
                has_detailed_description: true
            }
        );
        assert_eq!(shifted.to_string(), "x.A->x.B(childrenAccess)");
    }

    #[test]
    fn test_fold_drops_internal_dependencies_and_keeps_order() {
        let dependencies = [
            call("x.A$Inner", "x.A"),
            call("x.A$Inner", "x.B"),
            call("x.C", "x.A$Inner"),
            call("x.C", "x.B"),
        ];
        let result = fold_into(
            &NameOnlyTree,
            "x.A",
            dependencies.iter().map(Cow::Borrowed).collect(),
        );
        let rendered: Vec<String> = result.iter().map(|d| format!("{}->{}", d.from, d.to)).collect();
        assert_eq!(rendered, vec!["x.C->x.B", "x.C->x.A", "x.A->x.B"]);
    }

    #[test]
    fn test_topmost_ignores_nested_folds() {
        let mut transformers = FoldTransformers::new();
        transformers.set_folded("x.pkg.sub", true);
        transformers.set_folded("x.pkg", true);
        transformers.set_folded("y.pkg", true);
        assert_eq!(transformers.topmost(&NameOnlyTree), vec!["x.pkg", "y.pkg"]);

        transformers.set_folded("x.pkg", false);
        assert_eq!(transformers.topmost(&NameOnlyTree), vec!["x.pkg.sub", "y.pkg"]);
    }
}
