//! Caller-side checks that run before anything reaches the store.

use url::Url;

use crate::config::StoreConfig;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteValidator {
    max_text_chars: usize,
}

impl NoteValidator {
    pub fn new(max_text_chars: usize) -> Self {
        NoteValidator { max_text_chars }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.max_text_chars)
    }

    /// Returns the trimmed text, or why it cannot be saved.
    pub fn text(&self, text: &str) -> Result<String, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        let length = trimmed.chars().count();
        if length > self.max_text_chars {
            return Err(ValidationError::TextTooLong {
                length,
                max: self.max_text_chars,
            });
        }
        Ok(trimmed.to_string())
    }

    /// Normalizes an optional link.
    ///
    /// Blank input becomes `Some("")`, which the store reads as "clear the
    /// link" on edits and "no link" on adds.
    pub fn url(&self, url: Option<&str>) -> Result<Option<String>, ValidationError> {
        let Some(url) = url else {
            return Ok(None);
        };
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Ok(Some(String::new()));
        }
        Url::parse(trimmed).map_err(|e| ValidationError::InvalidUrl {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(trimmed.to_string()))
    }
}
