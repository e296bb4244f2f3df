use crate::domain::dependencies::Link;
use crate::domain::elementary::DetailedDependency;
use crate::domain::grouped::GroupedDependency;
use crate::domain::vector::Vector;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleDependencyDto {
    pub from: String,
    pub to: String,
    /// Merged type names, e.g. `extends constructorCall` or `several`.
    pub description: String,
    pub properties: String,
    pub is_violation: bool,
    pub must_share_nodes: bool,
    pub has_detailed_description: bool,
}

impl From<&GroupedDependency> for VisibleDependencyDto {
    fn from(dependency: &GroupedDependency) -> Self {
        Self {
            from: dependency.from().to_string(),
            to: dependency.to().to_string(),
            description: dependency.description().to_string(),
            properties: dependency.properties(),
            is_violation: dependency.is_violation(),
            must_share_nodes: dependency.visual_data.must_share_nodes,
            has_detailed_description: dependency.has_detailed_description(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleResponse {
    pub elementary_count: usize,
    pub filtered_count: usize,
    pub dependencies: Vec<VisibleDependencyDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinksResponse {
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailsResponse {
    pub from: String,
    pub to: String,
    pub details: Vec<DetailedDependency>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationsResponse {
    pub rules: Vec<String>,
    pub nodes_containing_violations: Vec<String>,
    pub nodes_involved_in_visible_violations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    pub from: String,
    pub to: String,
    pub start_point: Vector,
    pub end_point: Vector,
    pub is_visible: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsResponse {
    /// Layout entries naming nodes the report does not contain.
    pub unknown_nodes: Vec<String>,
    pub positions: Vec<PositionDto>,
}
