//! Keypoint to classifier input encoding.
//!
//! The classifier expects one rank-1 tensor of length one per coordinate,
//! keyed `{name}_x` / `{name}_y`. Coordinates pass through in frame pixel
//! space; any normalisation belongs to the classifier.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{PipelineError, Result};
use crate::hand::Keypoint;

/// Classifier input: feature key to single-element vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EncodedFeatures {
    inputs: BTreeMap<String, Vec<f32>>,
}

impl EncodedFeatures {
    pub fn get(&self, key: &str) -> Option<&[f32]> {
        self.inputs.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.inputs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn insert_unique(&mut self, key: String, value: f32, name: &str) -> Result<()> {
        if self.inputs.insert(key, vec![value]).is_some() {
            return Err(PipelineError::DuplicateKeypoint(name.to_string()));
        }
        Ok(())
    }
}

/// Encode one hand's keypoints into classifier input.
pub fn encode(keypoints: &[Keypoint]) -> Result<EncodedFeatures> {
    let mut features = EncodedFeatures::default();
    for keypoint in keypoints {
        features.insert_unique(format!("{}_x", keypoint.name), keypoint.x, &keypoint.name)?;
        features.insert_unique(format!("{}_y", keypoint.name), keypoint.y, &keypoint.name)?;
    }
    Ok(features)
}
