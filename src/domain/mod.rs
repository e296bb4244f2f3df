pub mod builder;
pub mod dependencies;
pub mod description;
pub mod elementary;
pub mod filter;
pub mod grouped;
pub mod ports;
pub mod queue;
pub mod semantic;
pub mod transform;
pub mod tree;
pub mod vector;
pub mod violations;
