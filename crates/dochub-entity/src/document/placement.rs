//! Where an item sits in the tree: parent rules, paths, and sibling order.
//!
//! Stores apply these inside the same atomic step as the write they guard,
//! so checks and writes always see the same snapshot.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dochub_core::error::AppError;

use super::model::DocumentItem;

/// Largest `order_index` a client may request.
pub const MAX_ORDER_INDEX: i32 = 1_000_000;

/// Where a relocated item lands among its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiblingPlacement {
    /// Keep the current `order_index`.
    Keep,
    /// Take this index; siblings at or above it move up by one.
    At(i32),
    /// After the last sibling.
    Last,
}

/// Path of an item named `name` under `parent` (root when `None`).
pub fn child_path(parent: Option<&DocumentItem>, name: &str) -> String {
    match parent {
        Some(p) => format!("{}/{}", p.path, name),
        None => format!("/{name}"),
    }
}

/// Rewrite `path` from under `old_prefix` to under `new_prefix`.
///
/// Returns `None` when `path` is neither `old_prefix` nor below it.
pub fn rebase_path(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if path == old_prefix {
        return Some(new_prefix.to_string());
    }
    let rest = path.strip_prefix(old_prefix)?;
    rest.starts_with('/').then(|| format!("{new_prefix}{rest}"))
}

/// Check a prospective parent given its ancestor chain (the parent first,
/// then its ancestors nearest first).
///
/// The parent must exist and be a folder. When `moving` is set, the parent
/// must not be that item or lie below it.
pub fn resolve_parent(
    chain: &[DocumentItem],
    moving: Option<Uuid>,
) -> Result<&DocumentItem, AppError> {
    let parent = chain.first().ok_or_else(|| {
        AppError::not_found("Parent folder not found").with_reason("parent_not_found")
    })?;

    if !parent.is_folder() {
        return Err(AppError::validation(format!(
            "'{}' is a file and cannot contain items",
            parent.path
        ))
        .with_reason("invalid_parent_type"));
    }

    if let Some(id) = moving {
        if chain.iter().any(|a| a.id == id) {
            return Err(
                AppError::validation("Cannot move a folder into itself or one of its descendants")
                    .with_reason("cycle"),
            );
        }
    }

    Ok(parent)
}

fn order_exhausted() -> AppError {
    AppError::validation("No sibling order positions left under this parent")
        .with_reason("order_exhausted")
}

/// Order for a new last sibling, given the current highest.
pub fn next_sibling_order(max: Option<i32>) -> Result<i32, AppError> {
    match max {
        None => Ok(0),
        Some(max) => max.checked_add(1).ok_or_else(order_exhausted),
    }
}

/// Require that every sibling can move up by one, given the current highest.
pub fn ensure_room_to_shift(max: Option<i32>) -> Result<(), AppError> {
    match max {
        Some(i32::MAX) => Err(order_exhausted()),
        _ => Ok(()),
    }
}
