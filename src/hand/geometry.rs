//! Finger skeleton paths over the 21-keypoint hand layout.

use super::types::{Hand, Keypoint};

/// A finger, in the fixed order the renderer draws them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

const THUMB: [usize; 5] = [0, 1, 2, 3, 4];
const INDEX_FINGER: [usize; 5] = [0, 5, 6, 7, 8];
const MIDDLE_FINGER: [usize; 5] = [0, 9, 10, 11, 12];
const RING_FINGER: [usize; 5] = [0, 13, 14, 15, 16];
const PINKY: [usize; 5] = [0, 17, 18, 19, 20];

impl Finger {
    pub const ALL: [Finger; 5] = [
        Self::Thumb,
        Self::Index,
        Self::Middle,
        Self::Ring,
        Self::Pinky,
    ];

    /// Keypoint indices from the wrist out to the fingertip.
    pub fn indices(self) -> &'static [usize; 5] {
        match self {
            Self::Thumb => &THUMB,
            Self::Index => &INDEX_FINGER,
            Self::Middle => &MIDDLE_FINGER,
            Self::Ring => &RING_FINGER,
            Self::Pinky => &PINKY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Index => "indexFinger",
            Self::Middle => "middleFinger",
            Self::Ring => "ringFinger",
            Self::Pinky => "pinky",
        }
    }
}

/// Resolve a finger's keypoints on `hand`. Indices missing from the hand are
/// skipped.
pub fn finger_path(hand: &Hand, finger: Finger) -> Vec<&Keypoint> {
    finger
        .indices()
        .iter()
        .filter_map(|&idx| hand.keypoints.get(idx))
        .collect()
}
