//! Assembling flat item rows into an ordered forest.
//!
//! The assembler is pure: it never fails and never drops a row. Rows whose
//! parent is missing, or whose parent is a file, surface as roots. Rows
//! caught in a parent cycle are appended after the ordinary roots.

use std::collections::HashMap;

use uuid::Uuid;

use dochub_entity::document::{DocumentItem, DocumentNode};

/// Build the forest for one workspace's rows.
///
/// Siblings (and roots) are ordered by `order_index`; ties keep input order.
pub fn build_forest(items: Vec<DocumentItem>) -> Vec<DocumentNode> {
    let index: HashMap<Uuid, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut roots = Vec::new();
    for (i, item) in items.iter().enumerate() {
        match item.parent_id.and_then(|p| index.get(&p).copied()) {
            Some(p) if p != i && items[p].is_folder() => children[p].push(i),
            _ => roots.push(i),
        }
    }

    let order = |i: &usize| items[*i].order_index;
    roots.sort_by_key(order);
    for siblings in &mut children {
        siblings.sort_by_key(order);
    }

    let mut slots: Vec<Option<DocumentItem>> = items.into_iter().map(Some).collect();
    let mut forest: Vec<DocumentNode> = roots
        .into_iter()
        .filter_map(|r| assemble(r, &mut slots, &children))
        .collect();

    // Anything left was unreachable from a root.
    for i in 0..slots.len() {
        if let Some(node) = assemble(i, &mut slots, &children) {
            forest.push(node);
        }
    }

    forest
}

fn assemble(
    i: usize,
    slots: &mut [Option<DocumentItem>],
    children: &[Vec<usize>],
) -> Option<DocumentNode> {
    let item = slots[i].take()?;
    let kids = children[i]
        .iter()
        .filter_map(|&c| assemble(c, slots, children))
        .collect();
    Some(DocumentNode {
        item,
        children: kids,
    })
}

/// Pre-order traversal back to rows.
pub fn flatten(forest: Vec<DocumentNode>) -> Vec<DocumentItem> {
    fn walk(node: DocumentNode, out: &mut Vec<DocumentItem>) {
        out.push(node.item);
        for child in node.children {
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for node in forest {
        walk(node, &mut out);
    }
    out
}

/// Detach the subtree rooted at `id`.
pub fn take_subtree(forest: Vec<DocumentNode>, id: Uuid) -> Option<DocumentNode> {
    let mut stack = forest;
    while let Some(node) = stack.pop() {
        if node.item.id == id {
            return Some(node);
        }
        stack.extend(node.children);
    }
    None
}

/// Total number of nodes in a forest.
pub fn count_nodes(forest: &[DocumentNode]) -> usize {
    forest.iter().map(DocumentNode::subtree_size).sum()
}
