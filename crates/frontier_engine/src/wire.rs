//! JSON shapes exchanged with the remote feature store.
use frontier_core::Feature;
use serde::{Deserialize, Serialize};

/// Body of `GET /doc/{category}/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentPage {
    pub next_url: String,
    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageEntry {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeaturesResponse {
    #[serde(default)]
    features: Vec<FeatureEntry>,
}

#[derive(Debug, Deserialize)]
struct FeatureEntry {
    id: String,
    feature: FeatureValue,
}

// The service is not consistent about numeric encoding.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FeaturesResponse {
    pub(crate) fn into_features(self) -> Result<Vec<Feature>, String> {
        self.features
            .into_iter()
            .map(|entry| {
                let value = match entry.feature {
                    FeatureValue::Int(value) => value,
                    FeatureValue::Float(value) => value.trunc() as i64,
                    FeatureValue::Text(text) => text
                        .trim()
                        .parse()
                        .map_err(|_| format!("non-numeric feature {text:?} for {}", entry.id))?,
                };
                Ok(Feature::new(entry.id, value))
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SaveRequest<'a> {
    data: Vec<SaveEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct SaveEntry<'a> {
    id: &'a str,
    feature: i64,
}

impl<'a> SaveRequest<'a> {
    pub(crate) fn new(features: &'a [Feature]) -> Self {
        Self {
            data: features
                .iter()
                .map(|feature| SaveEntry {
                    id: &feature.id,
                    feature: feature.value,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteRequest<'a> {
    data: Vec<DeleteEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct DeleteEntry<'a> {
    id: &'a str,
}

impl<'a> DeleteRequest<'a> {
    pub(crate) fn new(ids: &'a [String]) -> Self {
        Self {
            data: ids.iter().map(|id| DeleteEntry { id }).collect(),
        }
    }
}
