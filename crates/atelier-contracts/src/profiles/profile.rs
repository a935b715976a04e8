use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::style::TagSelection;

pub const MAX_NAME_CHARS: usize = 80;

const PREVIEW_TAGS: usize = 3;

/// A named, persisted custom style: a pair of tag selections saved from the
/// builder. The store is the sole owner; sessions hold transient ids only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub id: String,
    pub name: String,
    pub positive: TagSelection,
    pub negative: TagSelection,
    pub preview_text: String,
    pub created_at: String,
}

impl StyleProfile {
    pub fn new(name: impl Into<String>, positive: TagSelection, negative: TagSelection) -> Self {
        let preview_text = preview_text(&positive);
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            positive,
            negative,
            preview_text,
            created_at: now_utc_iso(),
        }
    }
}

/// Trim and validate a profile name before anything touches the service.
pub(crate) fn normalize_name(name: &str) -> Result<String, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation(
            "profile name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(StoreError::Validation(format!(
            "profile name exceeds {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn preview_text(positive: &TagSelection) -> String {
    let texts = positive.texts();
    if texts.is_empty() {
        return String::new();
    }
    let mut preview = texts
        .iter()
        .take(PREVIEW_TAGS)
        .cloned()
        .collect::<Vec<String>>()
        .join(", ");
    if texts.len() > PREVIEW_TAGS {
        preview.push_str(", …");
    }
    preview
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use crate::errors::StoreError;
    use crate::style::TagSelection;

    use super::{normalize_name, StyleProfile, MAX_NAME_CHARS};

    fn selection(texts: &[&str]) -> TagSelection {
        let mut selection = TagSelection::new();
        for text in texts {
            selection.add_free_text(text);
        }
        selection
    }

    #[test]
    fn preview_summarizes_the_leading_positive_tags() {
        let profile = StyleProfile::new(
            "Zen",
            selection(&["soft light", "pastel palette", "film grain", "wide angle"]),
            TagSelection::new(),
        );
        assert_eq!(profile.preview_text, "soft light, pastel palette, film grain, …");

        let bare = StyleProfile::new("Bare", TagSelection::new(), TagSelection::new());
        assert_eq!(bare.preview_text, "");
    }

    #[test]
    fn profiles_get_distinct_ids() {
        let a = StyleProfile::new("A", TagSelection::new(), TagSelection::new());
        let b = StyleProfile::new("B", TagSelection::new(), TagSelection::new());
        assert_ne!(a.id, b.id);
        assert!(!a.created_at.is_empty());
    }

    #[test]
    fn name_normalization_trims_and_validates() {
        assert_eq!(normalize_name("  Zen  ").unwrap(), "Zen");
        assert!(matches!(
            normalize_name("   "),
            Err(StoreError::Validation(_))
        ));
        let long = "x".repeat(MAX_NAME_CHARS + 1);
        assert!(matches!(
            normalize_name(&long),
            Err(StoreError::Validation(_))
        ));
    }
}
