use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

/// A short phrase describing a desired or excluded visual attribute.
///
/// Catalog tags carry stable ids; free-text tags get an opaque id at
/// creation time that is never reused. Deduplication compares `text`,
/// not `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorTag {
    pub id: String,
    pub text: String,
}

impl DescriptorTag {
    pub fn free_text(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TagCatalog {
    positive: IndexMap<String, DescriptorTag>,
    negative: IndexMap<String, DescriptorTag>,
}

impl TagCatalog {
    pub fn new() -> Self {
        Self {
            positive: default_positive_tags(),
            negative: default_negative_tags(),
        }
    }

    pub fn with_tags(positive: Vec<DescriptorTag>, negative: Vec<DescriptorTag>) -> Self {
        Self {
            positive: positive.into_iter().map(|tag| (tag.id.clone(), tag)).collect(),
            negative: negative.into_iter().map(|tag| (tag.id.clone(), tag)).collect(),
        }
    }

    pub fn find(&self, polarity: Polarity, id: &str) -> Option<&DescriptorTag> {
        self.side(polarity).get(id)
    }

    /// Resolve a tag id without knowing which list it came from.
    pub fn get(&self, id: &str) -> Option<(Polarity, &DescriptorTag)> {
        if let Some(tag) = self.positive.get(id) {
            return Some((Polarity::Positive, tag));
        }
        self.negative.get(id).map(|tag| (Polarity::Negative, tag))
    }

    pub fn list(&self, polarity: Polarity) -> impl Iterator<Item = &DescriptorTag> {
        self.side(polarity).values()
    }

    /// Case-insensitive substring filter; an empty query returns everything.
    pub fn search(&self, polarity: Polarity, query: &str) -> Vec<DescriptorTag> {
        let needle = query.trim().to_lowercase();
        self.side(polarity)
            .values()
            .filter(|tag| needle.is_empty() || tag.text.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    fn side(&self, polarity: Polarity) -> &IndexMap<String, DescriptorTag> {
        match polarity {
            Polarity::Positive => &self.positive,
            Polarity::Negative => &self.negative,
        }
    }
}

impl Default for TagCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// A fixed style preset selectable as a whole instead of composing tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePreset {
    pub id: String,
    pub label: String,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: IndexMap<String, StylePreset>,
}

impl PresetCatalog {
    pub fn new() -> Self {
        Self {
            presets: default_presets(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&StylePreset> {
        self.presets.get(id)
    }

    pub fn list(&self) -> impl Iterator<Item = &StylePreset> {
        self.presets.values()
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn default_positive_tags() -> IndexMap<String, DescriptorTag> {
    tag_table(
        "pos",
        &[
            "golden hour lighting",
            "soft natural light",
            "cinematic color grade",
            "studio portrait",
            "shallow depth of field",
            "film grain",
            "vivid colors",
            "dramatic shadows",
            "pastel palette",
            "high detail",
            "wide angle",
            "minimalist composition",
            "oil painting texture",
            "watercolor wash",
            "analog film look",
            "neon glow",
            "moody atmosphere",
            "backlit silhouette",
        ],
    )
}

fn default_negative_tags() -> IndexMap<String, DescriptorTag> {
    tag_table(
        "neg",
        &[
            "blurry",
            "overexposed",
            "low resolution",
            "watermark",
            "text artifacts",
            "distorted hands",
            "oversaturated",
            "harsh flash",
            "cluttered background",
            "motion blur",
            "washed out colors",
            "plastic skin",
        ],
    )
}

fn tag_table(prefix: &str, texts: &[&str]) -> IndexMap<String, DescriptorTag> {
    let mut map = IndexMap::new();
    for (index, text) in texts.iter().enumerate() {
        let id = format!("{}-{:03}", prefix, index + 1);
        map.insert(
            id.clone(),
            DescriptorTag {
                id,
                text: (*text).to_string(),
            },
        );
    }
    map
}

fn default_presets() -> IndexMap<String, StylePreset> {
    let mut map = IndexMap::new();

    let mut insert = |id: &str, label: &str, prompt: &str| {
        map.insert(
            id.to_string(),
            StylePreset {
                id: id.to_string(),
                label: label.to_string(),
                prompt: prompt.to_string(),
            },
        );
    };

    insert(
        "natural",
        "Natural",
        "true-to-life colors, soft daylight, unprocessed look",
    );
    insert(
        "cinematic",
        "Cinematic",
        "cinematic color grade, anamorphic framing, dramatic lighting",
    );
    insert(
        "anime",
        "Anime",
        "anime illustration, clean line art, cel shading",
    );
    insert(
        "watercolor",
        "Watercolor",
        "loose watercolor wash, soft paper texture, muted palette",
    );
    insert(
        "noir",
        "Noir",
        "high-contrast black and white, deep shadows, film noir mood",
    );
    insert(
        "vintage",
        "Vintage",
        "faded analog film, warm cast, light grain",
    );

    map
}

#[cfg(test)]
mod tests {
    use super::{DescriptorTag, Polarity, PresetCatalog, TagCatalog};

    #[test]
    fn catalog_lookup_by_id_resolves_polarity() {
        let catalog = TagCatalog::new();
        let (polarity, tag) = catalog.get("pos-001").unwrap();
        assert_eq!(polarity, Polarity::Positive);
        assert_eq!(tag.text, "golden hour lighting");

        let (polarity, _) = catalog.get("neg-001").unwrap();
        assert_eq!(polarity, Polarity::Negative);
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let catalog = TagCatalog::new();
        let hits = catalog.search(Polarity::Positive, "LIGHT");
        assert!(hits.iter().any(|tag| tag.text == "golden hour lighting"));
        assert!(hits.iter().any(|tag| tag.text == "soft natural light"));
        assert!(hits.iter().all(|tag| tag.text.contains("light")));
    }

    #[test]
    fn empty_search_returns_the_full_list() {
        let catalog = TagCatalog::new();
        assert_eq!(
            catalog.search(Polarity::Negative, "  ").len(),
            catalog.list(Polarity::Negative).count()
        );
    }

    #[test]
    fn free_text_tags_get_distinct_ids() {
        let a = DescriptorTag::free_text("hazy skyline");
        let b = DescriptorTag::free_text("hazy skyline");
        assert_ne!(a.id, b.id);
        assert_eq!(a.text, b.text);
    }

    #[test]
    fn preset_catalog_resolves_known_ids() {
        let presets = PresetCatalog::new();
        assert_eq!(presets.get("noir").unwrap().label, "Noir");
        assert!(presets.get("unknown").is_none());
        assert!(presets.list().count() >= 4);
    }
}
