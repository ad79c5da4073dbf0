//! Data model definitions for the persisted note record.
//!
//! The whole collection lives under one storage key as a single
//! [`NoteRecord`] value. [`Note`] is one saved clipping and [`NoteDraft`]
//! is what a caller hands to the store when creating one.

use serde::{Deserialize, Serialize};

/// One saved piece of text with an optional source link.
///
/// `Note` is the element type of the persisted collection and the value
/// returned to UI callers by `read_all`.
///
/// # Structure
///
/// - **id**: UUID v4 generated at creation, never reused
/// - **text**: the clipped content, non-empty after trimming
/// - **url**: page the text was clipped from, `null` when absent
/// - **created_at** / **updated_at**: milliseconds since the Unix epoch
/// - **index**: display position, `0` is the most prominent
///
/// # Serialization
///
/// Fields are written in camelCase so the record stays readable by any
/// consumer of the persisted `{ "notes": [...] }` layout:
///
/// ```rust
/// use clip_notes_core::note_model::Note;
///
/// let note = Note {
///     id: "6f1c0c9e-3f5e-4a59-9a0e-0b7c7a5d2f10".to_string(),
///     text: "Ownership is Rust's most unique feature".to_string(),
///     url: Some("https://doc.rust-lang.org/book/ch04-00-understanding-ownership.html".to_string()),
///     created_at: 1_700_000_000_000,
///     updated_at: 1_700_000_000_000,
///     index: 0,
/// };
///
/// let json = serde_json::to_value(&note)?;
/// assert_eq!(json["createdAt"], 1_700_000_000_000_i64);
/// assert_eq!(json["index"], 0);
/// # Ok::<(), serde_json::Error>(())
/// ```
///
/// # Ordering
///
/// `index` is redundant with the note's position in the persisted array.
/// The store treats position as canonical and rewrites `index` from it on
/// every write, so external readers always see `0..N-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,

    pub text: String,

    /// Source page. Serialized as `null` when absent.
    #[serde(default)]
    pub url: Option<String>,

    pub created_at: i64,

    pub updated_at: i64,

    #[serde(default)]
    pub index: u32,
}

/// Input for creating a note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub text: String,

    #[serde(default)]
    pub url: Option<String>,
}

impl NoteDraft {
    pub fn new(text: impl Into<String>) -> Self {
        NoteDraft { text: text.into(), url: None }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// The single persisted value: `{ "notes": Note[] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    #[serde(default)]
    pub notes: Vec<Note>,
}
