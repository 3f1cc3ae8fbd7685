//! Documentation tree entities.

pub mod metadata;
pub mod model;
pub mod placement;
pub mod tree;

pub use metadata::DocumentMetadata;
pub use model::{CreateDocumentItem, DocumentItem, ItemType, RelocateItem};
pub use placement::{MAX_ORDER_INDEX, SiblingPlacement};
pub use tree::DocumentNode;
