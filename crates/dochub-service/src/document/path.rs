//! Name and extension validation.
//!
//! A path is `/<name>` at root and `<parent path>/<name>` below. File names
//! carry their extension, so a file's path ends in `<base>.<ext>`. Names are
//! restricted to a conservative character set, which keeps `/` and `.`
//! segments out of paths entirely.

use dochub_core::config::DocumentsConfig;
use dochub_core::error::AppError;

/// Validates names and extensions and builds paths.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    max_name_length: usize,
    allowed_extensions: Vec<String>,
}

impl PathBuilder {
    /// Creates a path builder from the documents configuration.
    pub fn new(config: &DocumentsConfig) -> Self {
        Self {
            max_name_length: config.max_name_length,
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Trim and validate a folder name or file base name.
    pub fn validate_name(&self, raw: &str) -> Result<String, AppError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name cannot be empty").with_reason("invalid_name"));
        }
        if name.chars().count() > self.max_name_length {
            return Err(AppError::validation(format!(
                "Name exceeds {} characters",
                self.max_name_length
            ))
            .with_reason("invalid_name"));
        }
        if let Some(bad) = name.chars().find(|c| !is_name_char(*c)) {
            return Err(AppError::validation(format!(
                "Name contains an invalid character: {bad:?}. Use letters, digits, spaces, '-' or '_'"
            ))
            .with_reason("invalid_name"));
        }
        Ok(name.to_string())
    }

    /// Validate a file extension against the allow-list. Returns it
    /// lowercased without a leading dot.
    pub fn validate_extension(&self, raw: Option<&str>) -> Result<String, AppError> {
        let ext = raw
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                AppError::validation("Files require a file extension")
                    .with_reason("invalid_extension")
            })?;

        if !self.allowed_extensions.contains(&ext) {
            return Err(AppError::validation(format!(
                "Unsupported file extension '{ext}'. Allowed: {}",
                self.allowed_extensions.join(", ")
            ))
            .with_reason("invalid_extension"));
        }
        Ok(ext)
    }
}

/// Letters, digits, space, `-`, `_`, and Latin-1 accented letters.
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, ' ' | '-' | '_')
        || (('\u{C0}'..='\u{FF}').contains(&c) && c != '\u{D7}' && c != '\u{F7}')
}

/// Stored name of a file: `<base>.<ext>`.
pub fn file_name(base: &str, extension: &str) -> String {
    format!("{base}.{extension}")
}

/// Strip a trailing `.<extension>` from a requested file name.
pub fn strip_extension<'a>(name: &'a str, extension: &str) -> &'a str {
    let trimmed = name.trim();
    match trimmed.rsplit_once('.') {
        Some((base, ext)) if ext.eq_ignore_ascii_case(extension) => base,
        _ => trimmed,
    }
}
