//! Frame poses and torso-normalized pose sequences.
//!
//! Users stand at different distances from the camera and have different
//! builds, so raw pixel coordinates are not comparable between recordings.
//! A [`PoseSequence`] divides every coordinate by the mean neck-to-hip
//! distance, expressing all positions in torso lengths.

use std::collections::BTreeMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{BodyPart, Keypoint, RawFrame};

/// All 18 keypoints of a single frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePose {
    keypoints: [Keypoint; BodyPart::COUNT],
}

impl FramePose {
    pub fn new(keypoints: [Keypoint; BodyPart::COUNT]) -> Self {
        Self { keypoints }
    }

    /// Build from a part-name mapping
    ///
    /// Every canonical name must be present. Extra landmarks a detector may
    /// emit are ignored.
    pub fn from_named(parts: &BTreeMap<String, Vec<f64>>) -> Result<Self> {
        let mut keypoints = [Keypoint::new(0.0, 0.0); BodyPart::COUNT];
        for part in BodyPart::ALL {
            let values = parts.get(part.name()).ok_or_else(|| {
                Error::InputFormat(format!("missing body part '{}'", part.name()))
            })?;
            keypoints[part.index()] = Keypoint::from_values(values)?;
        }
        Ok(Self { keypoints })
    }

    /// Build from an 18-entry list in canonical part order
    pub fn from_positional(parts: &[Vec<f64>]) -> Result<Self> {
        if parts.len() != BodyPart::COUNT {
            return Err(Error::InputFormat(format!(
                "expected {} keypoints per frame, got {}",
                BodyPart::COUNT,
                parts.len()
            )));
        }

        let mut keypoints = [Keypoint::new(0.0, 0.0); BodyPart::COUNT];
        for (slot, values) in keypoints.iter_mut().zip(parts) {
            *slot = Keypoint::from_values(values)?;
        }
        Ok(Self { keypoints })
    }

    pub fn from_raw(frame: &RawFrame) -> Result<Self> {
        match frame {
            RawFrame::Named(parts) => Self::from_named(parts),
            RawFrame::Positional(parts) => Self::from_positional(parts),
        }
    }

    pub fn get(&self, part: BodyPart) -> &Keypoint {
        &self.keypoints[part.index()]
    }

    pub fn keypoints(&self) -> &[Keypoint; BodyPart::COUNT] {
        &self.keypoints
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyPart, &Keypoint)> {
        BodyPart::ALL.into_iter().zip(self.keypoints.iter())
    }

    /// True iff every listed part exists in this frame
    pub fn all_exist(&self, parts: &[BodyPart]) -> bool {
        parts.iter().all(|&part| self.get(part).exists())
    }

    /// Neck-to-hip distance if both endpoints exist
    fn torso_length(&self, hip: BodyPart) -> Option<f64> {
        let neck = self.get(BodyPart::Neck);
        let hip = self.get(hip);
        (neck.exists() && hip.exists()).then(|| neck.distance_to(hip))
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            keypoints: self.keypoints.map(|kp| kp / factor),
        }
    }
}

impl Index<BodyPart> for FramePose {
    type Output = Keypoint;

    fn index(&self, part: BodyPart) -> &Keypoint {
        self.get(part)
    }
}

/// Consecutive frames of one repetition, normalized by torso length
///
/// Only constructible through normalization; serializes for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct PoseSequence {
    poses: Vec<FramePose>,
    /// Mean torso length in the original pixel units
    torso_length: f64,
}

impl PoseSequence {
    /// Normalize a sequence of frames
    ///
    /// Left (neck to left hip) and right (neck to right hip) measurements are
    /// pooled over every frame where both endpoints exist and averaged.
    pub fn new(frames: Vec<FramePose>) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::InputFormat("pose sequence has no frames".into()));
        }

        let lengths: Vec<f64> = frames
            .iter()
            .filter_map(|pose| pose.torso_length(BodyPart::LeftHip))
            .chain(frames.iter().filter_map(|pose| pose.torso_length(BodyPart::RightHip)))
            .collect();

        if lengths.is_empty() {
            return Err(Error::Normalization {
                frames: frames.len(),
            });
        }

        let torso_length = lengths.iter().sum::<f64>() / lengths.len() as f64;
        if !torso_length.is_finite() || torso_length <= 0.0 {
            return Err(Error::Normalization {
                frames: frames.len(),
            });
        }

        let poses = frames.iter().map(|pose| pose.scaled(torso_length)).collect();

        Ok(Self {
            poses,
            torso_length,
        })
    }

    pub fn from_raw(frames: &[RawFrame]) -> Result<Self> {
        let poses = frames
            .iter()
            .map(FramePose::from_raw)
            .collect::<Result<Vec<_>>>()?;
        Self::new(poses)
    }

    /// Parse a JSON array of frames in either accepted layout
    pub fn from_json(json: &str) -> Result<Self> {
        let frames: Vec<RawFrame> = serde_json::from_str(json)?;
        Self::from_raw(&frames)
    }

    pub fn poses(&self) -> &[FramePose] {
        &self.poses
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn torso_length(&self) -> f64 {
        self.torso_length
    }
}
