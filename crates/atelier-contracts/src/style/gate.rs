use crate::catalog::Polarity;

use super::draft::{StyleDraft, StyleMode};

/// Whether a base image has been dropped in. Owned by the upload surface;
/// the builder only reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadState {
    pub has_image: bool,
}

/// Gate policy knobs. `require_custom_tags` is off by default: custom mode
/// never blocks generation purely on tag count unless a deployment opts in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatePolicy {
    pub require_custom_tags: bool,
}

pub fn can_generate(draft: &StyleDraft, upload: UploadState, policy: GatePolicy) -> bool {
    blocked_reason(draft, upload, policy).is_none()
}

/// The first reason the generate action is disabled, if any. Pure; callers
/// re-evaluate after every draft, store, or upload mutation.
pub fn blocked_reason(
    draft: &StyleDraft,
    upload: UploadState,
    policy: GatePolicy,
) -> Option<&'static str> {
    if !upload.has_image {
        return Some("no reference image uploaded");
    }
    match draft.mode() {
        StyleMode::Preset { preset_id: None } => Some("no preset selected"),
        StyleMode::Preset { preset_id: Some(_) } => None,
        StyleMode::Custom => {
            if policy.require_custom_tags
                && draft.selection(Polarity::Positive).is_empty()
                && draft.selection(Polarity::Negative).is_empty()
            {
                Some("no descriptor tags selected")
            } else {
                None
            }
        }
    }
}
