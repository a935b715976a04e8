use serde_json::{json, Value};
use uuid::Uuid;

use crate::catalog::{Polarity, PresetCatalog, TagCatalog};
use crate::errors::StoreError;
use crate::events::EventLog;
use crate::profiles::{ProfilePage, ProfileService, ProfileStore};
use crate::style::{
    blocked_reason, DraftSnapshot, GatePolicy, SelectionChange, StyleDraft, TagSelection,
    UploadState,
};

/// Inbound surface of the builder, one variant per UI event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    TagClick { polarity: Polarity, tag_id: String },
    FreeTextSubmit { polarity: Polarity, text: String },
    TagRemove { polarity: Polarity, tag_id: String },
    SelectPreset { preset_id: String },
    PresetTab,
    CustomTab,
    SliderSet { percent: i64 },
    ResetTags { polarity: Option<Polarity> },
    ResetResemblance,
    ProfileSave { name: String },
    ProfileApply { id: String },
    ProfileEditOpen { id: String },
    ProfileEditName { name: String },
    ProfileEditConfirm,
    ProfileEditCancel,
    ProfileDeleteOpen { id: String },
    ProfileDeleteConfirm,
    ProfileDeleteCancel,
    PageSelect { page: usize },
    ImageDropped,
    Generate,
}

/// What applying an input did. Budget rejections and empty submissions come
/// back as `NoChange`; service failures surface as non-fatal notices; local
/// validation shows up as `Blocked` before anything is sent anywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Updated,
    NoChange,
    Notice(String),
    Blocked(String),
    Busy(String),
    Generate(DraftSnapshot),
}

/// Transient edit-dialog state: a snapshot of the profile under edit.
/// Confirm writes the name back through the store; cancel discards the
/// snapshot without touching it.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDialog {
    pub profile_id: String,
    pub name: String,
    pub positive: TagSelection,
    pub negative: TagSelection,
}

/// One editing session of the style builder: the draft, the profile store,
/// the upload flag, and the transient dialog state, mutated only through
/// [`BuilderSession::apply`]. Each apply is a single synchronous state
/// transition; in-memory invariants are settled before any service call.
pub struct BuilderSession {
    session_id: String,
    catalog: TagCatalog,
    presets: PresetCatalog,
    draft: StyleDraft,
    store: ProfileStore,
    upload: UploadState,
    policy: GatePolicy,
    edit: Option<EditDialog>,
    delete_target: Option<String>,
    events: Option<EventLog>,
}

impl BuilderSession {
    pub fn new(service: Box<dyn ProfileService>) -> Result<Self, StoreError> {
        Ok(Self {
            session_id: Uuid::new_v4().to_string(),
            catalog: TagCatalog::new(),
            presets: PresetCatalog::new(),
            draft: StyleDraft::new(),
            store: ProfileStore::new(service)?,
            upload: UploadState::default(),
            policy: GatePolicy::default(),
            edit: None,
            delete_target: None,
            events: None,
        })
    }

    pub fn with_policy(mut self, policy: GatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_event_log(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_draft(mut self, draft: StyleDraft) -> Self {
        self.draft = draft;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn draft(&self) -> &StyleDraft {
        &self.draft
    }

    pub fn catalog(&self) -> &TagCatalog {
        &self.catalog
    }

    pub fn presets(&self) -> &PresetCatalog {
        &self.presets
    }

    pub fn upload(&self) -> UploadState {
        self.upload
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn edit_dialog(&self) -> Option<&EditDialog> {
        self.edit.as_ref()
    }

    pub fn delete_target(&self) -> Option<&str> {
        self.delete_target.as_deref()
    }

    pub fn can_generate(&self) -> bool {
        blocked_reason(&self.draft, self.upload, self.policy).is_none()
    }

    pub fn profile_page(&self) -> ProfilePage {
        self.store.current()
    }

    pub fn apply(&mut self, input: SessionInput) -> Applied {
        match input {
            SessionInput::TagClick { polarity, tag_id } => self.tag_click(polarity, &tag_id),
            SessionInput::FreeTextSubmit { polarity, text } => {
                self.free_text_submit(polarity, &text)
            }
            SessionInput::TagRemove { polarity, tag_id } => self.tag_remove(polarity, &tag_id),
            SessionInput::SelectPreset { preset_id } => self.select_preset(&preset_id),
            SessionInput::PresetTab => {
                self.draft.switch_to_preset();
                self.emit("mode_switched", &[("mode", json!("preset"))]);
                Applied::Updated
            }
            SessionInput::CustomTab => {
                self.draft.switch_to_custom();
                self.emit("mode_switched", &[("mode", json!("custom"))]);
                Applied::Updated
            }
            SessionInput::SliderSet { percent } => {
                self.draft.set_resemblance(percent);
                self.emit(
                    "resemblance_set",
                    &[("value", json!(self.draft.resemblance()))],
                );
                Applied::Updated
            }
            SessionInput::ResetTags { polarity } => self.reset_tags(polarity),
            SessionInput::ResetResemblance => {
                self.draft.reset_resemblance();
                Applied::Updated
            }
            SessionInput::ProfileSave { name } => self.profile_save(&name),
            SessionInput::ProfileApply { id } => self.profile_apply(&id),
            SessionInput::ProfileEditOpen { id } => self.edit_open(&id),
            SessionInput::ProfileEditName { name } => self.edit_name(name),
            SessionInput::ProfileEditConfirm => self.edit_confirm(),
            SessionInput::ProfileEditCancel => {
                self.edit = None;
                Applied::Updated
            }
            SessionInput::ProfileDeleteOpen { id } => self.delete_open(&id),
            SessionInput::ProfileDeleteConfirm => self.delete_confirm(),
            SessionInput::ProfileDeleteCancel => {
                self.delete_target = None;
                Applied::Updated
            }
            SessionInput::PageSelect { page } => {
                let shown = self.store.select_page(page);
                self.emit("page_selected", &[("page", json!(shown.page))]);
                Applied::Updated
            }
            SessionInput::ImageDropped => {
                self.upload.has_image = true;
                self.emit("image_attached", &[]);
                Applied::Updated
            }
            SessionInput::Generate => self.generate(),
        }
    }

    fn tag_click(&mut self, polarity: Polarity, tag_id: &str) -> Applied {
        let Some(tag) = self.catalog.find(polarity, tag_id).cloned() else {
            return Applied::Notice(format!("unknown catalog tag: {tag_id}"));
        };
        let change = self.draft.selection_mut(polarity).toggle_catalog(&tag);
        self.emit_selection_change(change, polarity, &tag.text);
        if change.mutated() {
            Applied::Updated
        } else {
            Applied::NoChange
        }
    }

    fn free_text_submit(&mut self, polarity: Polarity, text: &str) -> Applied {
        let change = self.draft.selection_mut(polarity).add_free_text(text);
        self.emit_selection_change(change, polarity, text.trim());
        if change.mutated() {
            Applied::Updated
        } else {
            Applied::NoChange
        }
    }

    fn tag_remove(&mut self, polarity: Polarity, tag_id: &str) -> Applied {
        let change = self.draft.selection_mut(polarity).remove(tag_id);
        if change.mutated() {
            self.emit(
                "tag_removed",
                &[("polarity", polarity_json(polarity)), ("id", json!(tag_id))],
            );
            Applied::Updated
        } else {
            Applied::NoChange
        }
    }

    fn select_preset(&mut self, preset_id: &str) -> Applied {
        let Some(preset) = self.presets.get(preset_id) else {
            return Applied::Notice(format!("unknown preset: {preset_id}"));
        };
        let preset_id = preset.id.clone();
        self.draft.select_preset(&preset_id);
        self.emit("preset_selected", &[("preset_id", json!(preset_id))]);
        Applied::Updated
    }

    fn reset_tags(&mut self, polarity: Option<Polarity>) -> Applied {
        match polarity {
            Some(polarity) => {
                self.draft.reset_tags(polarity);
            }
            None => self.draft.reset_all_tags(),
        }
        self.emit("tags_reset", &[]);
        Applied::Updated
    }

    fn profile_save(&mut self, name: &str) -> Applied {
        if name.trim().is_empty() {
            return Applied::Blocked("profile name must not be empty".to_string());
        }
        let positive = self.draft.selection(Polarity::Positive).clone();
        let negative = self.draft.selection(Polarity::Negative).clone();
        match self.store.create(name, positive, negative) {
            Ok(profile) => {
                self.emit(
                    "profile_created",
                    &[("id", json!(profile.id)), ("name", json!(profile.name))],
                );
                Applied::Updated
            }
            Err(error) => self.store_failure(error),
        }
    }

    fn profile_apply(&mut self, id: &str) -> Applied {
        let Some(profile) = self.store.get(id) else {
            return Applied::Notice(format!("profile not found: {id}"));
        };
        let positive = profile.positive.clone();
        let negative = profile.negative.clone();
        self.draft.replace_selections(positive, negative);
        self.draft.switch_to_custom();
        self.emit("profile_applied", &[("id", json!(id))]);
        Applied::Updated
    }

    fn edit_open(&mut self, id: &str) -> Applied {
        if self.delete_target.as_deref() == Some(id) {
            return Applied::Busy(format!("profile {id} has a pending delete"));
        }
        let Some(profile) = self.store.get(id) else {
            return Applied::Notice(format!("profile not found: {id}"));
        };
        self.edit = Some(EditDialog {
            profile_id: profile.id.clone(),
            name: profile.name.clone(),
            positive: profile.positive.clone(),
            negative: profile.negative.clone(),
        });
        Applied::Updated
    }

    fn edit_name(&mut self, name: String) -> Applied {
        let Some(dialog) = self.edit.as_mut() else {
            return Applied::Blocked("no profile is being edited".to_string());
        };
        dialog.name = name;
        Applied::Updated
    }

    fn edit_confirm(&mut self) -> Applied {
        let Some(dialog) = self.edit.clone() else {
            return Applied::Blocked("no profile is being edited".to_string());
        };
        if dialog.name.trim().is_empty() {
            // Pure local check; the dialog stays open for another attempt.
            return Applied::Blocked("profile name must not be empty".to_string());
        }
        self.edit = None;
        match self.store.update(&dialog.profile_id, &dialog.name) {
            Ok(profile) => {
                self.emit(
                    "profile_renamed",
                    &[("id", json!(profile.id)), ("name", json!(profile.name))],
                );
                Applied::Updated
            }
            Err(error) => self.store_failure(error),
        }
    }

    fn delete_open(&mut self, id: &str) -> Applied {
        if self
            .edit
            .as_ref()
            .is_some_and(|dialog| dialog.profile_id == id)
        {
            return Applied::Busy(format!("profile {id} is being edited"));
        }
        if self.store.get(id).is_none() {
            return Applied::Notice(format!("profile not found: {id}"));
        }
        self.delete_target = Some(id.to_string());
        Applied::Updated
    }

    fn delete_confirm(&mut self) -> Applied {
        let Some(id) = self.delete_target.take() else {
            return Applied::Blocked("no delete is pending".to_string());
        };
        match self.store.delete(&id) {
            Ok(()) => {
                self.emit(
                    "profile_deleted",
                    &[("id", json!(id)), ("page", json!(self.store.current_page()))],
                );
                Applied::Updated
            }
            Err(error) => self.store_failure(error),
        }
    }

    fn generate(&mut self) -> Applied {
        if let Some(reason) = blocked_reason(&self.draft, self.upload, self.policy) {
            return Applied::Blocked(reason.to_string());
        }
        let Some(snapshot) = self.draft.snapshot() else {
            return Applied::Blocked("no preset selected".to_string());
        };
        self.emit(
            "generate_issued",
            &[("resemblance", json!(snapshot.resemblance))],
        );
        Applied::Generate(snapshot)
    }

    fn store_failure(&self, error: StoreError) -> Applied {
        match error {
            StoreError::Validation(message) => Applied::Blocked(message),
            other => Applied::Notice(other.to_string()),
        }
    }

    fn emit_selection_change(&self, change: SelectionChange, polarity: Polarity, text: &str) {
        let event = match change {
            SelectionChange::Added => "tag_added",
            SelectionChange::Removed => "tag_removed",
            SelectionChange::Rejected => "tag_rejected",
            SelectionChange::Ignored => return,
        };
        self.emit(
            event,
            &[("polarity", polarity_json(polarity)), ("text", json!(text))],
        );
    }

    fn emit(&self, event: &str, fields: &[(&str, Value)]) {
        if let Some(events) = &self.events {
            let _ = events.emit(event, fields);
        }
    }
}

fn polarity_json(polarity: Polarity) -> Value {
    match polarity {
        Polarity::Positive => json!("positive"),
        Polarity::Negative => json!("negative"),
    }
}
