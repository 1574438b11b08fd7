use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PipelineError, Result};

/// Number of keypoints in a detected hand.
pub const HAND_KEYPOINT_COUNT: usize = 21;

/// A named point on the hand skeleton, in frame pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl Keypoint {
    pub fn new(name: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z: None,
        }
    }
}

/// Which hand the detector believes it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Label as reported by the detector.
    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One detected hand in one frame.
///
/// Keypoint positions are fixed: 0 is the wrist, then four joints each for
/// thumb, index, middle, ring and pinky. Detector fields the pipeline does not
/// consume travel in `payload` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub handedness: Handedness,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub keypoints: Vec<Keypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl Hand {
    pub fn new(handedness: Handedness, keypoints: Vec<Keypoint>) -> Self {
        Self {
            handedness,
            score: None,
            keypoints,
            payload: None,
        }
    }

    /// Build a hand from 21 `(x, y)` positions, naming each keypoint after
    /// its canonical landmark.
    pub fn from_positions(handedness: Handedness, positions: &[(f32, f32); HAND_KEYPOINT_COUNT]) -> Self {
        let keypoints = HandLandmark::ALL
            .iter()
            .zip(positions.iter())
            .map(|(landmark, &(x, y))| Keypoint::new(landmark.name(), x, y))
            .collect();
        Self::new(handedness, keypoints)
    }

    /// Reject hands that break the 21-keypoint layout.
    pub fn validate(&self) -> Result<()> {
        if self.keypoints.len() != HAND_KEYPOINT_COUNT {
            return Err(PipelineError::MalformedHand {
                expected: HAND_KEYPOINT_COUNT,
                actual: self.keypoints.len(),
            });
        }
        Ok(())
    }

    pub fn keypoint(&self, landmark: HandLandmark) -> Option<&Keypoint> {
        self.keypoints.get(landmark.index())
    }
}

/// Canonical hand landmarks, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexFingerMcp = 5,
    IndexFingerPip = 6,
    IndexFingerDip = 7,
    IndexFingerTip = 8,
    MiddleFingerMcp = 9,
    MiddleFingerPip = 10,
    MiddleFingerDip = 11,
    MiddleFingerTip = 12,
    RingFingerMcp = 13,
    RingFingerPip = 14,
    RingFingerDip = 15,
    RingFingerTip = 16,
    PinkyFingerMcp = 17,
    PinkyFingerPip = 18,
    PinkyFingerDip = 19,
    PinkyFingerTip = 20,
}

impl HandLandmark {
    pub const ALL: [HandLandmark; HAND_KEYPOINT_COUNT] = [
        Self::Wrist,
        Self::ThumbCmc,
        Self::ThumbMcp,
        Self::ThumbIp,
        Self::ThumbTip,
        Self::IndexFingerMcp,
        Self::IndexFingerPip,
        Self::IndexFingerDip,
        Self::IndexFingerTip,
        Self::MiddleFingerMcp,
        Self::MiddleFingerPip,
        Self::MiddleFingerDip,
        Self::MiddleFingerTip,
        Self::RingFingerMcp,
        Self::RingFingerPip,
        Self::RingFingerDip,
        Self::RingFingerTip,
        Self::PinkyFingerMcp,
        Self::PinkyFingerPip,
        Self::PinkyFingerDip,
        Self::PinkyFingerTip,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Keypoint name used by the detector and as the feature key prefix.
    pub fn name(self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb_cmc",
            Self::ThumbMcp => "thumb_mcp",
            Self::ThumbIp => "thumb_ip",
            Self::ThumbTip => "thumb_tip",
            Self::IndexFingerMcp => "index_finger_mcp",
            Self::IndexFingerPip => "index_finger_pip",
            Self::IndexFingerDip => "index_finger_dip",
            Self::IndexFingerTip => "index_finger_tip",
            Self::MiddleFingerMcp => "middle_finger_mcp",
            Self::MiddleFingerPip => "middle_finger_pip",
            Self::MiddleFingerDip => "middle_finger_dip",
            Self::MiddleFingerTip => "middle_finger_tip",
            Self::RingFingerMcp => "ring_finger_mcp",
            Self::RingFingerPip => "ring_finger_pip",
            Self::RingFingerDip => "ring_finger_dip",
            Self::RingFingerTip => "ring_finger_tip",
            Self::PinkyFingerMcp => "pinky_finger_mcp",
            Self::PinkyFingerPip => "pinky_finger_pip",
            Self::PinkyFingerDip => "pinky_finger_dip",
            Self::PinkyFingerTip => "pinky_finger_tip",
        }
    }
}
