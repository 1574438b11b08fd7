//! Sign classifier contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::features::EncodedFeatures;

/// Default location of the classifier model.
pub const DEFAULT_MODEL_URL: &str =
    "https://cdn.jsdelivr.net/gh/arrudadev/tf-decision-forests-libras/model.json";

/// Construction parameters for a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifierConfig {
    pub model_url: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_url: DEFAULT_MODEL_URL.to_string(),
        }
    }
}

/// Classifier output. The pipeline never looks inside; it is handed to the
/// prediction sink as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prediction(serde_json::Value);

impl Prediction {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// Sign classifier over encoded hand features.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn execute(&self, features: &EncodedFeatures) -> Result<Prediction>;
}

/// Loads classifier model assets.
#[async_trait]
pub trait ClassifierLoader: Send + Sync {
    async fn load(&self, config: &ClassifierConfig) -> Result<Arc<dyn Classifier>>;
}
