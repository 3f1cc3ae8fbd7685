//! Building the assistant request from session history and editor context.

use serde::{Deserialize, Serialize};

use dochub_assistant::{AssistantRequest, PromptMessage};
use dochub_entity::chat::{ChatMessage, MessageRole};
use dochub_entity::document::DocumentItem;
use dochub_entity::workspace::Workspace;

/// What the user was looking at when they asked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContext {
    /// Path of the file open in the editor.
    #[serde(default, alias = "selectedFile", skip_serializing_if = "Option::is_none")]
    pub selected_file: Option<String>,
    /// Folder the user is browsing.
    #[serde(default, alias = "currentDirectory", skip_serializing_if = "Option::is_none")]
    pub current_directory: Option<String>,
}

impl ChatContext {
    /// Whether no context was supplied.
    pub fn is_empty(&self) -> bool {
        self.selected_file.is_none() && self.current_directory.is_none()
    }
}

/// Longest prefix of `text` no longer than `max_bytes` that ends on a
/// character boundary.
pub fn truncate_utf8(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// System prompt: the configured base followed by workspace context.
pub fn system_prompt(
    base: &str,
    workspace: &Workspace,
    context: &ChatContext,
    selected: Option<&DocumentItem>,
    max_context_bytes: usize,
) -> String {
    let mut prompt = base.trim_end().to_string();
    prompt.push_str("\n\n");
    prompt.push_str(&format!("Workspace: {}\n", workspace.name));
    if let Some(repo) = &workspace.repository {
        prompt.push_str(&format!("Repository: {repo}\n"));
    }
    if let Some(dir) = &context.current_directory {
        prompt.push_str(&format!("Current directory: {dir}\n"));
    }

    match (selected, &context.selected_file) {
        (Some(file), _) => {
            let content = file.content.as_deref().unwrap_or_default();
            let excerpt = truncate_utf8(content, max_context_bytes);
            prompt.push_str(&format!("Selected file: {}\n", file.path));
            prompt.push_str("--- BEGIN FILE ---\n");
            prompt.push_str(excerpt);
            if !excerpt.ends_with('\n') {
                prompt.push('\n');
            }
            prompt.push_str("--- END FILE ---\n");
            if excerpt.len() < content.len() {
                prompt.push_str(&format!(
                    "(file truncated to the first {} of {} bytes)\n",
                    excerpt.len(),
                    content.len()
                ));
            }
        }
        (None, Some(path)) => {
            prompt.push_str(&format!("Selected file: {path} (not found in this workspace)\n"));
        }
        (None, None) => {}
    }

    prompt
}

/// History turns followed by the new user message.
///
/// Consecutive turns from the same role are merged, since the upstream API
/// requires alternating roles; history must not start with an assistant turn.
pub fn conversation(history: &[ChatMessage], message: &str) -> Vec<PromptMessage> {
    let mut turns: Vec<PromptMessage> = Vec::with_capacity(history.len() + 1);
    let incoming = history
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .chain(std::iter::once((MessageRole::User, message)));

    for (role, content) in incoming {
        if content.trim().is_empty() {
            continue;
        }
        match turns.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(content);
                continue;
            }
            None if role == MessageRole::Assistant => continue,
            _ => {}
        }
        turns.push(PromptMessage {
            role,
            content: content.to_string(),
        });
    }
    turns
}

/// The complete request.
pub fn build_request(system: String, history: &[ChatMessage], message: &str) -> AssistantRequest {
    AssistantRequest {
        system,
        messages: conversation(history, message),
    }
}
