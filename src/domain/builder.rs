use crate::domain::description::{DependencyDescription, DependencyType};
use crate::domain::elementary::ElementaryDependency;
use crate::domain::semantic::{DependencyRecord, DependencyTarget, JsonElement, NodeKind, ReportInput};
use tracing::debug;

/// Dependency builder - flattens a report into the ordered list of elementary dependencies
#[derive(Debug, Default, Clone, Copy)]
pub struct DependencyBuilder;

impl DependencyBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, report: &ReportInput) -> Vec<ElementaryDependency> {
        let dependencies = match report {
            ReportInput::Flat(flat) => self.from_records(&flat.dependencies),
            ReportInput::Hierarchical(root) => self.from_hierarchy(root),
        };
        debug!("Flattened report into {} elementary dependencies", dependencies.len());
        dependencies
    }

    /// Walks the hierarchy depth-first. Packages originate no dependencies.
    pub fn from_hierarchy(&self, root: &JsonElement) -> Vec<ElementaryDependency> {
        let mut dependencies = Vec::new();
        add_dependencies_of(root, &mut dependencies);
        dependencies
    }

    /// Converts flat records, skipping those with an unknown type or missing endpoint.
    pub fn from_records(&self, records: &[DependencyRecord]) -> Vec<ElementaryDependency> {
        records
            .iter()
            .filter_map(|record| {
                let Some(dependency_type) = DependencyType::from_record_type(&record.kind) else {
                    debug!(
                        "Skipping dependency {} -> {} of unknown type {}",
                        record.origin_class, record.target_class, record.kind
                    );
                    return None;
                };
                if record.origin_class.is_empty() || record.target_class.is_empty() {
                    debug!("Skipping dependency record without endpoints: {:?}", record);
                    return None;
                }
                Some(ElementaryDependency::new(
                    record.origin_class.clone(),
                    record.target_class.clone(),
                    DependencyDescription::new(
                        dependency_type,
                        record.start_code_unit.clone(),
                        record.target_code_element.clone(),
                    ),
                ))
            })
            .collect()
    }
}

fn add_dependencies_of(element: &JsonElement, dependencies: &mut Vec<ElementaryDependency>) {
    if element.kind != NodeKind::Package {
        let from = &element.full_name;
        let superclass = element
            .superclass
            .iter()
            .map(|target| DependencyTarget::Name(target.clone()));
        let typed_targets = superclass
            .map(|target| (DependencyType::Extends, target))
            .chain(typed(DependencyType::Implements, &element.interfaces))
            .chain(typed(DependencyType::ImplementsAnonymous, &element.anonymous_implementation))
            .chain(typed(DependencyType::MethodCall, &element.method_calls))
            .chain(typed(DependencyType::FieldAccess, &element.field_accesses))
            .chain(typed(DependencyType::ConstructorCall, &element.constructor_calls));

        for (dependency_type, target) in typed_targets {
            if target.target().is_empty() {
                debug!("Skipping {} of {} without target", dependency_type, from);
                continue;
            }
            dependencies.push(ElementaryDependency::new(
                from.clone(),
                target.target().to_string(),
                DependencyDescription::new(
                    dependency_type,
                    target.start_code_unit().map(str::to_string),
                    target.target_element().map(str::to_string),
                ),
            ));
        }
    }

    for child in &element.children {
        add_dependencies_of(child, dependencies);
    }
}

fn typed(
    dependency_type: DependencyType,
    targets: &[DependencyTarget],
) -> impl Iterator<Item = (DependencyType, DependencyTarget)> + '_ {
    targets.iter().map(move |target| (dependency_type, target.clone()))
}
