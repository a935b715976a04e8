use serde::{Deserialize, Serialize};

use crate::catalog::DescriptorTag;

use super::budget::{self, Admission};

/// Outcome of a selection mutation. Budget rejections and empty submissions
/// are distinguishable no-ops, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Added,
    Removed,
    Rejected,
    Ignored,
}

impl SelectionChange {
    pub fn mutated(self) -> bool {
        matches!(self, SelectionChange::Added | SelectionChange::Removed)
    }
}

/// Ordered set of chosen descriptor tags for one polarity.
///
/// Insertion order is display order. Catalog admissions deduplicate by
/// `text` with toggle semantics; free-text admissions do not deduplicate.
/// No operation can push the total word weight past the cap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSelection {
    tags: Vec<DescriptorTag>,
}

impl TagSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(&self) -> &[DescriptorTag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn weight(&self) -> usize {
        self.tags
            .iter()
            .map(|tag| budget::word_weight(&tag.text))
            .sum()
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.tags.iter().any(|tag| tag.text == text)
    }

    pub fn texts(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.text.clone()).collect()
    }

    /// Catalog click: a tag with identical text already present is removed
    /// (toggle); otherwise the candidate goes through budget admission.
    pub fn toggle_catalog(&mut self, tag: &DescriptorTag) -> SelectionChange {
        if let Some(position) = self.tags.iter().position(|entry| entry.text == tag.text) {
            self.tags.remove(position);
            return SelectionChange::Removed;
        }
        self.admit(tag.clone())
    }

    /// Typed entry: trimmed, empty input ignored, no dedup against existing
    /// texts. Shares the single budget guard with the catalog path.
    pub fn add_free_text(&mut self, text: &str) -> SelectionChange {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return SelectionChange::Ignored;
        }
        self.admit(DescriptorTag::free_text(trimmed))
    }

    pub fn remove(&mut self, tag_id: &str) -> SelectionChange {
        let Some(position) = self.tags.iter().position(|entry| entry.id == tag_id) else {
            return SelectionChange::Ignored;
        };
        self.tags.remove(position);
        SelectionChange::Removed
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    fn admit(&mut self, tag: DescriptorTag) -> SelectionChange {
        match budget::admit(self.weight(), &tag.text) {
            Admission::Admitted => {
                self.tags.push(tag);
                SelectionChange::Added
            }
            Admission::OverBudget => SelectionChange::Rejected,
        }
    }
}
