//! Route handlers organized by domain.

pub mod chat;
pub mod document;
pub mod health;
pub mod workspace;
