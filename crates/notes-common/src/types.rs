//! Note record types shared between the store and its callers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A stored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Identifier assigned by the store; never reused.
    pub id: i64,
    pub title: String,
    pub content: String,
    pub pinned: bool,
    /// UTC time the row was inserted. `None` if a writer stored NULL.
    pub created_at: Option<NaiveDateTime>,
    /// UTC time of the last modification. `None` if a writer stored NULL.
    pub updated_at: Option<NaiveDateTime>,
}

/// Fields for a note that has not been stored yet.
///
/// Omitted fields fall back to the column defaults: empty content, unpinned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

impl NewNote {
    /// A note with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = Some(pinned);
        self
    }
}

/// A partial modification of an existing note. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

impl NoteUpdate {
    /// Check if the update touches no field.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.pinned.is_none()
    }
}

/// Default page size for note listings.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Listing options for notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteFilter {
    /// Only return pinned notes.
    #[serde(default)]
    pub pinned_only: bool,
    /// Maximum number of notes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Number of notes to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_note_builder() {
        let note = NewNote::titled("Groceries").with_content("milk").with_pinned(true);
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content.as_deref(), Some("milk"));
        assert_eq!(note.pinned, Some(true));

        let bare = NewNote::titled("Groceries");
        assert!(bare.content.is_none());
        assert!(bare.pinned.is_none());
    }

    #[test]
    fn test_new_note_omits_unset_fields() {
        let json = serde_json::to_value(NewNote::titled("Groceries")).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Groceries" }));

        let parsed: NewNote = serde_json::from_str(r#"{"title":"x","pinned":true}"#).unwrap();
        assert_eq!(parsed.pinned, Some(true));
        assert!(parsed.content.is_none());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(NoteUpdate::default().is_empty());
        let update = NoteUpdate {
            pinned: Some(false),
            ..NoteUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
