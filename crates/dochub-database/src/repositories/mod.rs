//! PostgreSQL implementations of the store traits.

pub mod chat;
pub mod document;
pub mod workspace;

pub use chat::ChatRepository;
pub use document::DocumentRepository;
pub use workspace::WorkspaceRepository;
