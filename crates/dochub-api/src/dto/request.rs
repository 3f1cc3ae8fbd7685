//! Request DTOs with validation.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use dochub_entity::document::{ItemType, MAX_ORDER_INDEX};
use dochub_service::{
    ChatContext, CreateItemRequest, CreateWorkspaceRequest, SendMessageRequest,
    UpdateItemRequest,
};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Create workspace request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWorkspaceBody {
    /// Display name.
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional `owner/name` repository slug.
    #[serde(default)]
    pub repository: Option<String>,
}

impl From<CreateWorkspaceBody> for CreateWorkspaceRequest {
    fn from(body: CreateWorkspaceBody) -> Self {
        Self {
            name: body.name,
            description: body.description,
            repository: body.repository,
        }
    }
}

/// Create item request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateItemBody {
    /// Folder name, or file base name.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// `folder` or `file`.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Parent folder; omitted or `null` for the root.
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<Uuid>,
    /// Extension for files.
    #[serde(default, alias = "fileExtension")]
    pub file_extension: Option<String>,
}

impl From<CreateItemBody> for CreateItemRequest {
    fn from(body: CreateItemBody) -> Self {
        Self {
            name: body.name,
            item_type: body.item_type,
            parent_id: body.parent_id,
            file_extension: body.file_extension,
        }
    }
}

/// Rename, move, and/or reorder request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateItemBody {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New parent; `null` moves to the root, absent leaves it.
    #[serde(default, alias = "parentId", deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
    /// Requested sibling position.
    #[serde(default, alias = "orderIndex")]
    #[validate(range(
        min = 0,
        max = MAX_ORDER_INDEX,
        message = "order_index is out of range"
    ))]
    pub order_index: Option<i32>,
}

impl From<UpdateItemBody> for UpdateItemRequest {
    fn from(body: UpdateItemBody) -> Self {
        Self {
            name: body.name,
            parent_id: body.parent_id,
            order_index: body.order_index,
        }
    }
}

/// Content replacement body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateContentBody {
    /// New file content.
    pub content: String,
}

/// Create chat session body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateSessionBody {
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
}

/// Chat message body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageBody {
    /// The user's question.
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    /// Editor context.
    #[serde(default)]
    pub context: Option<ChatContext>,
}

impl From<SendMessageBody> for SendMessageRequest {
    fn from(body: SendMessageBody) -> Self {
        Self {
            message: body.message,
            context: body.context,
        }
    }
}
