//! Workspace ownership and lifecycle.

pub mod access;
pub mod service;

pub use access::require_workspace_owner;
pub use service::{CreateWorkspaceRequest, WorkspaceService};
