//! Tree structures for hierarchical display.

use serde::{Deserialize, Serialize};

use super::model::DocumentItem;

/// A documentation item together with its ordered children.
///
/// Serializes as the item's fields plus a `children` array; files always
/// carry an empty array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// The stored row.
    #[serde(flatten)]
    pub item: DocumentItem,
    /// Child nodes sorted by `order_index`.
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// Wrap an item with no children.
    pub fn leaf(item: DocumentItem) -> Self {
        Self {
            item,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(DocumentNode::subtree_size)
            .sum::<usize>()
    }
}
