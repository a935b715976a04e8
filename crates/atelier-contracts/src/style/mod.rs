mod budget;
mod draft;
mod gate;
mod selection;

pub use budget::{admit, word_weight, Admission, WEIGHT_CAP};
pub use draft::{DraftSnapshot, StyleChoice, StyleDraft, StyleMode, DEFAULT_RESEMBLANCE};
pub use gate::{blocked_reason, can_generate, GatePolicy, UploadState};
pub use selection::{SelectionChange, TagSelection};
