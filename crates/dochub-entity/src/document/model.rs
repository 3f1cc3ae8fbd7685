//! Documentation item entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::placement::SiblingPlacement;

/// Kind of a documentation item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_item_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// May contain other items.
    Folder,
    /// A leaf carrying text content.
    File,
}

impl ItemType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = dochub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "folder" => Ok(Self::Folder),
            "file" => Ok(Self::File),
            _ => Err(dochub_core::AppError::validation(format!(
                "Invalid item type: '{s}'. Expected one of: folder, file"
            ))),
        }
    }
}

/// A node of a workspace's documentation tree, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DocumentItem {
    /// Unique item identifier.
    pub id: Uuid,
    /// Owning workspace.
    pub workspace_id: Uuid,
    /// Parent folder (None at root level).
    pub parent_id: Option<Uuid>,
    /// Display name. File names include the extension.
    pub name: String,
    /// Folder or file.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Materialized path, unique within the workspace (e.g. `/Design/database.md`).
    pub path: String,
    /// Raw text content (files only).
    pub content: Option<String>,
    /// Extension without the dot (files only).
    pub file_extension: Option<String>,
    /// Sibling display order.
    pub order_index: i32,
    /// Free-form attributes, see [`super::DocumentMetadata`].
    pub metadata: serde_json::Value,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl DocumentItem {
    /// Check if this is a root-level item.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this item is a folder.
    pub fn is_folder(&self) -> bool {
        self.item_type == ItemType::Folder
    }

    /// Check if this item is a file.
    pub fn is_file(&self) -> bool {
        self.item_type == ItemType::File
    }

    /// The name without the file extension.
    pub fn base_name(&self) -> &str {
        match &self.file_extension {
            Some(ext) => self
                .name
                .strip_suffix(ext.as_str())
                .and_then(|rest| rest.strip_suffix('.'))
                .unwrap_or(&self.name),
            None => &self.name,
        }
    }

    /// Whether `other_path` lies strictly below this item's path.
    pub fn is_ancestor_path_of(&self, other_path: &str) -> bool {
        other_path.len() > self.path.len()
            && other_path.starts_with(self.path.as_str())
            && other_path.as_bytes()[self.path.len()] == b'/'
    }
}

/// Data required to insert a new item.
///
/// The store derives the path from the parent and appends the item after
/// its last sibling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentItem {
    /// Owning workspace.
    pub workspace_id: Uuid,
    /// Parent folder.
    pub parent_id: Option<Uuid>,
    /// Stored name (files include the extension).
    pub name: String,
    /// Folder or file.
    pub item_type: ItemType,
    /// Seed content (files only).
    pub content: Option<String>,
    /// Extension (files only).
    pub file_extension: Option<String>,
    /// Initial metadata.
    pub metadata: serde_json::Value,
}

/// A rename, move, or reorder of one item.
///
/// In one atomic step the store checks the parent (exists, is a folder, is
/// not the item or below it), places the item among its siblings, and
/// rewrites the path of every descendant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelocateItem {
    /// Owning workspace.
    pub workspace_id: Uuid,
    /// The item being changed.
    pub item_id: Uuid,
    /// New parent (may equal the current one).
    pub parent_id: Option<Uuid>,
    /// New stored name.
    pub name: String,
    /// Position among the siblings under `parent_id`.
    pub placement: SiblingPlacement,
}
