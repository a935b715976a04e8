use serde::{Deserialize, Serialize};

use crate::catalog::Polarity;

use super::selection::{SelectionChange, TagSelection};

pub const DEFAULT_RESEMBLANCE: u8 = 75;

/// Which half of the builder is active. Switching never discards the
/// inactive half: custom selections stay in memory while a preset is
/// showing, and the last picked preset is remembered while composing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StyleMode {
    Preset { preset_id: Option<String> },
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDraft {
    mode: StyleMode,
    last_preset: Option<String>,
    positive: TagSelection,
    negative: TagSelection,
    resemblance: u8,
}

impl Default for StyleDraft {
    fn default() -> Self {
        Self {
            mode: StyleMode::Preset { preset_id: None },
            last_preset: None,
            positive: TagSelection::new(),
            negative: TagSelection::new(),
            resemblance: DEFAULT_RESEMBLANCE,
        }
    }
}

impl StyleDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &StyleMode {
        &self.mode
    }

    pub fn select_preset(&mut self, preset_id: impl Into<String>) {
        let preset_id = preset_id.into();
        self.last_preset = Some(preset_id.clone());
        self.mode = StyleMode::Preset {
            preset_id: Some(preset_id),
        };
    }

    pub fn switch_to_custom(&mut self) {
        self.mode = StyleMode::Custom;
    }

    /// Back to the preset tab, restoring the last selected preset if any.
    pub fn switch_to_preset(&mut self) {
        self.mode = StyleMode::Preset {
            preset_id: self.last_preset.clone(),
        };
    }

    pub fn selection(&self, polarity: Polarity) -> &TagSelection {
        match polarity {
            Polarity::Positive => &self.positive,
            Polarity::Negative => &self.negative,
        }
    }

    pub fn selection_mut(&mut self, polarity: Polarity) -> &mut TagSelection {
        match polarity {
            Polarity::Positive => &mut self.positive,
            Polarity::Negative => &mut self.negative,
        }
    }

    pub fn replace_selections(&mut self, positive: TagSelection, negative: TagSelection) {
        self.positive = positive;
        self.negative = negative;
    }

    pub fn resemblance(&self) -> u8 {
        self.resemblance
    }

    pub fn set_resemblance(&mut self, value: i64) {
        self.resemblance = value.clamp(0, 100) as u8;
    }

    pub fn reset_resemblance(&mut self) {
        self.resemblance = DEFAULT_RESEMBLANCE;
    }

    pub fn reset_tags(&mut self, polarity: Polarity) -> SelectionChange {
        let selection = self.selection_mut(polarity);
        if selection.is_empty() {
            return SelectionChange::Ignored;
        }
        selection.clear();
        SelectionChange::Removed
    }

    pub fn reset_all_tags(&mut self) {
        self.positive.clear();
        self.negative.clear();
    }

    /// Immutable copy of the active choice for the generate payload.
    /// `None` while the preset tab is showing with nothing selected.
    pub fn snapshot(&self) -> Option<DraftSnapshot> {
        let choice = match &self.mode {
            StyleMode::Preset { preset_id } => StyleChoice::Preset {
                preset_id: preset_id.clone()?,
            },
            StyleMode::Custom => StyleChoice::Custom {
                positive: self.positive.texts(),
                negative: self.negative.texts(),
            },
        };
        Some(DraftSnapshot {
            choice,
            resemblance: self.resemblance,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StyleChoice {
    Preset {
        preset_id: String,
    },
    Custom {
        positive: Vec<String>,
        negative: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub choice: StyleChoice,
    pub resemblance: u8,
}
