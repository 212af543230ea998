//! Complaint status enumeration, text checks and attachment references.
//!
//! Statuses are stored and serialized in their canonical snake_case form
//! (`new`, `pending`, `in_progress`, `resolved`). Parsing is lenient about
//! casing and separators so that `In Progress`, `InProgress` and
//! `inprogress` all resolve to [`ComplaintStatus::InProgress`]; any other
//! literal is rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of an attachment URL.
pub const MAX_ATTACHMENT_URL_LENGTH: usize = 2_048;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ComplaintStatus {
    New,
    Pending,
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::New,
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
    ];

    /// Canonical form used in the database and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }

    /// Parse a status literal, normalising case and separators.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let normalized: String = value
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "new" => Ok(Self::New),
            "pending" => Ok(Self::Pending),
            "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            _ => Err(CoreError::Validation(format!(
                "Invalid complaint status '{value}'. Must be one of: new, pending, in_progress, resolved"
            ))),
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ComplaintStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// Opaque reference to an uploaded file. Fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Validate each attachment reference has a usable URL and a content type.
pub fn validate_attachments(attachments: &[Attachment]) -> Result<(), CoreError> {
    for (i, attachment) in attachments.iter().enumerate() {
        let url = attachment.url.trim();
        if url.is_empty() {
            return Err(CoreError::validation_failed(
                "attachments",
                format!("Attachment {i} has an empty URL"),
            ));
        }
        if url.chars().count() > MAX_ATTACHMENT_URL_LENGTH {
            return Err(CoreError::validation_failed(
                "attachments",
                format!("Attachment {i} URL exceeds {MAX_ATTACHMENT_URL_LENGTH} characters"),
            ));
        }
        if attachment.content_type.trim().is_empty() {
            return Err(CoreError::validation_failed(
                "attachments",
                format!("Attachment {i} is missing its type"),
            ));
        }
    }
    Ok(())
}

/// `validator` custom check: rejects whitespace-only text.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
