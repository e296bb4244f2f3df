//! depgraph-view library: dependency aggregation, folding and filtering for dependency graph views.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
