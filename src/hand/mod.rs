// Hand domain: detected hand data and skeleton geometry.

pub mod geometry;
pub mod types;

pub use geometry::{finger_path, Finger};
pub use types::{Hand, HandLandmark, Handedness, Keypoint, HAND_KEYPOINT_COUNT};
