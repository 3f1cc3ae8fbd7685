//! # dochub-service
//!
//! Business logic service layer for DocHub. Services receive the row
//! stores and the assistant backend at construction time via `Arc`
//! references and enforce workspace ownership on every call.

pub mod chat;
pub mod context;
pub mod document;
pub mod workspace;

pub use chat::{ChatContext, ChatService, SendMessageRequest};
pub use context::RequestContext;
pub use document::{
    ContentUpdated, CreateItemRequest, DocumentService, PathBuilder, UpdateItemRequest,
};
pub use workspace::{CreateWorkspaceRequest, WorkspaceService};
