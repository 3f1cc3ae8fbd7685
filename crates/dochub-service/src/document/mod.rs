//! Documentation tree: path rules, tree assembly, and mutations.

pub mod lock;
pub mod path;
pub mod service;
pub mod tree;

pub use lock::WorkspaceLocks;
pub use path::PathBuilder;
pub use service::{ContentUpdated, CreateItemRequest, DocumentService, UpdateItemRequest};
pub use tree::{build_forest, count_nodes, flatten};
