//! Data model for journal entries.
//!
//! A [`HappinessRecord`] owns its [`Comment`]s outright; comments never move
//! between records and are never edited or removed on their own. Records are
//! only ever built by the store (see [`crate::happiness_store::HappinessStore`]),
//! callers describe a new entry with [`NewRecord`].
//!
//! The serialized form matches the JSON document the journal has always kept in
//! its durable slot: camelCase keys, RFC 3339 timestamps, `imageUrl` omitted
//! when absent.
//!
//! ```rust
//! use happiness_core::happiness_model::{Emotion, NewRecord};
//!
//! let draft: NewRecord = serde_json::from_str(
//!     r#"{"text":"Sunny walk by the river","emotion":"peaceful"}"#,
//! )?;
//! assert_eq!(draft.emotion, Emotion::Peaceful);
//! assert!(draft.image_url.is_none());
//! # Ok::<(), serde_json::Error>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of feelings a record can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Excited,
    Satisfied,
    Peaceful,
    Grateful,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Happy,
        Emotion::Excited,
        Emotion::Satisfied,
        Emotion::Peaceful,
        Emotion::Grateful,
    ];

    /// Icon shown next to the tag in list and calendar views.
    pub fn emoji(self) -> &'static str {
        match self {
            Emotion::Happy => "😊",
            Emotion::Excited => "🎉",
            Emotion::Satisfied => "😌",
            Emotion::Peaceful => "😇",
            Emotion::Grateful => "🙏",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Excited => "excited",
            Emotion::Satisfied => "satisfied",
            Emotion::Peaceful => "peaceful",
            Emotion::Grateful => "grateful",
        }
    }

    pub fn parse(value: &str) -> Option<Emotion> {
        Emotion::ALL.into_iter().find(|e| e.as_str() == value)
    }
}

/// A single journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HappinessRecord {
    /// Opaque lookup key, assigned by the store and never changed.
    pub id: String,
    pub text: String,
    pub emotion: Emotion,
    pub created_at: DateTime<Utc>,
    /// Opaque image reference, usually a data URI. Never inspected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub likes: u64,
    /// Insertion order, never resorted.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied part of a record. Validation of `text` is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub text: String,
    pub emotion: Emotion,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewRecord {
    pub fn new(text: impl Into<String>, emotion: Emotion) -> Self {
        Self {
            text: text.into(),
            emotion,
            image_url: None,
        }
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// Comment request as it arrives over FFI.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub record_id: String,
    pub text: String,
    pub author: String,
}

/// Read-only view handed to every UI surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HappinessSnapshot {
    pub records: Vec<HappinessRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub streak: u32,
}
