use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use atelier_contracts::catalog::PresetCatalog;
use atelier_contracts::errors::StoreError;
use atelier_contracts::profiles::{MemoryProfileService, ProfileService, StyleProfile, PAGE_SIZE};
use atelier_contracts::style::{DraftSnapshot, StyleChoice, StyleDraft};
use chrono::{SecondsFormat, Utc};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const DRAFT_SCHEMA_VERSION: u64 = 1;
pub const RECEIPT_SCHEMA_VERSION: u64 = 1;

const PROFILES_BASE_ENV: &str = "ATELIER_PROFILES_BASE";
const PROFILES_TOKEN_ENV: &str = "ATELIER_PROFILES_TOKEN";

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub profiles_base: Option<String>,
    pub profiles_token: Option<String>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            profiles_base: non_empty_env(PROFILES_BASE_ENV)
                .map(|value| value.trim_end_matches('/').to_string()),
            profiles_token: non_empty_env(PROFILES_TOKEN_ENV),
        }
    }
}

/// The profile backend for this process: remote when a base URL is
/// configured, in-memory otherwise.
pub fn profile_service_from_config(config: &EngineConfig) -> Box<dyn ProfileService> {
    match &config.profiles_base {
        Some(base) => Box::new(HttpProfileService::new(
            base.clone(),
            config.profiles_token.clone(),
        )),
        None => Box::new(MemoryProfileService::new()),
    }
}

pub fn profile_service_from_env() -> Box<dyn ProfileService> {
    profile_service_from_config(&EngineConfig::from_env())
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Remote profile CRUD over HTTP. Service failures are folded into the
/// store taxonomy: 404 is `NotFound`, 400/422 is `Validation`, everything
/// else (including transport errors) is `Transient`.
pub struct HttpProfileService {
    base: String,
    token: Option<String>,
    http: HttpClient,
}

#[derive(Debug, Deserialize)]
struct ProfileListBody {
    items: Vec<StyleProfile>,
    total: usize,
}

impl HttpProfileService {
    pub fn new(base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base: base.into(),
            token,
            http: HttpClient::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    fn send(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<HttpResponse, StoreError> {
        let request = match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        };
        let response = request.send().map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<Map<String, Value>>()
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });
        Err(status_error(status, message))
    }
}

impl ProfileService for HttpProfileService {
    fn fetch_all(&mut self) -> Result<Vec<StyleProfile>, StoreError> {
        let mut profiles = Vec::new();
        let mut page = 1usize;
        loop {
            let url = self.url(&format!("profiles?page={page}&size={PAGE_SIZE}"));
            let body: ProfileListBody = self
                .send(self.http.get(&url))?
                .json()
                .map_err(transport_error)?;
            let fetched = body.items.len();
            profiles.extend(body.items);
            if fetched == 0 || profiles.len() >= body.total {
                return Ok(profiles);
            }
            page += 1;
        }
    }

    fn create(&mut self, profile: &StyleProfile) -> Result<(), StoreError> {
        let url = self.url("profiles");
        self.send(self.http.post(&url).json(profile))?;
        Ok(())
    }

    fn rename(&mut self, id: &str, name: &str) -> Result<(), StoreError> {
        let url = self.url(&format!("profiles/{id}"));
        self.send(self.http.patch(&url).json(&json!({ "name": name })))?;
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let url = self.url(&format!("profiles/{id}"));
        self.send(self.http.delete(&url))?;
        Ok(())
    }
}

fn status_error(status: StatusCode, message: Option<String>) -> StoreError {
    let message = message.unwrap_or_else(|| status.to_string());
    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            StoreError::Validation(message)
        }
        _ => StoreError::Transient(message),
    }
}

fn transport_error(error: reqwest::Error) -> StoreError {
    StoreError::Transient(error.to_string())
}

/// The provider-facing shape of a generate request, normalized from a
/// draft snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedGeneration {
    pub prompt: String,
    pub negative_prompt: String,
    pub strength: f64,
    pub preset_id: Option<String>,
    pub warnings: Vec<String>,
}

pub fn resolve_generation(snapshot: &DraftSnapshot, presets: &PresetCatalog) -> ResolvedGeneration {
    let strength = f64::from(snapshot.resemblance) / 100.0;
    match &snapshot.choice {
        StyleChoice::Preset { preset_id } => match presets.get(preset_id) {
            Some(preset) => ResolvedGeneration {
                prompt: preset.prompt.clone(),
                negative_prompt: String::new(),
                strength,
                preset_id: Some(preset.id.clone()),
                warnings: Vec::new(),
            },
            None => ResolvedGeneration {
                prompt: String::new(),
                negative_prompt: String::new(),
                strength,
                preset_id: Some(preset_id.clone()),
                warnings: vec![format!("unknown preset: {preset_id}")],
            },
        },
        StyleChoice::Custom { positive, negative } => {
            let mut warnings = Vec::new();
            if positive.is_empty() && negative.is_empty() {
                warnings.push("no descriptor tags selected".to_string());
            }
            ResolvedGeneration {
                prompt: positive.join(", "),
                negative_prompt: negative.join(", "),
                strength,
                preset_id: None,
                warnings,
            }
        }
    }
}

pub fn build_generation_receipt(
    snapshot: &DraftSnapshot,
    resolved: &ResolvedGeneration,
) -> Value {
    let mut root = Map::new();
    root.insert(
        "schema_version".to_string(),
        Value::Number(RECEIPT_SCHEMA_VERSION.into()),
    );
    root.insert("ts".to_string(), Value::String(now_utc_iso()));
    root.insert(
        "request".to_string(),
        serde_json::to_value(snapshot).unwrap_or(Value::Null),
    );
    root.insert(
        "resolved".to_string(),
        serde_json::to_value(resolved).unwrap_or(Value::Null),
    );
    Value::Object(root)
}

pub fn write_generation_receipt(path: &Path, payload: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(payload)?)?;
    Ok(())
}

pub fn generation_receipt_path(out_dir: &Path) -> PathBuf {
    let stamp = Utc::now().timestamp_millis();
    out_dir.join(format!("generate-{stamp}.json"))
}

#[derive(Debug, Serialize, Deserialize)]
struct DraftFile {
    schema_version: u64,
    saved_at: String,
    draft: StyleDraft,
}

/// Persist the working draft between sessions. Atomic: the payload lands
/// in a temp file first and is renamed over the target.
pub fn save_draft(path: &Path, draft: &StyleDraft) -> Result<()> {
    let payload = DraftFile {
        schema_version: DRAFT_SCHEMA_VERSION,
        saved_at: now_utc_iso(),
        draft: draft.clone(),
    };
    let bytes = serde_json::to_vec_pretty(&payload)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = tmp_sibling(path);
    fs::write(&tmp_path, bytes)
        .with_context(|| format!("failed to stage draft at {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to save draft at {}", path.display()))?;
    Ok(())
}

pub fn load_draft(path: &Path) -> Result<StyleDraft> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read draft at {}", path.display()))?;
    let parsed: DraftFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse draft at {}", path.display()))?;
    if parsed.schema_version != DRAFT_SCHEMA_VERSION {
        bail!(
            "unknown draft schema_version in {}: {}",
            path.display(),
            parsed.schema_version
        );
    }
    Ok(parsed.draft)
}

pub fn load_draft_if_exists(path: &Path) -> Result<Option<StyleDraft>> {
    if !path.exists() {
        return Ok(None);
    }
    load_draft(path).map(Some)
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|value| value.to_string_lossy().to_string())
        .unwrap_or_else(|| "draft.json".to_string());
    name.push_str(".tmp");
    path.with_file_name(name)
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
