//! Exercise-specific feature extraction from a normalized pose sequence.
//!
//! Every exercise is judged on one arm chain (shoulder, elbow, wrist, hip
//! on the chosen side, plus the neck). The [`FeatureFormula`] of the
//! exercise decides what the first channel measures; the second channel is
//! always the elbow angle.

use serde::{Deserialize, Serialize};
use swole_core::{
    angle_between_degrees, segment, unit_segment, BodyPart, Error, ExerciseKind, FeatureFormula,
    FramePose, PoseSequence, Result, Side,
};

use crate::filtering::{MedianFilter, ANGLE_MEDIAN_PASSES};

/// Two parallel per-frame feature series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureChannelPair {
    pub channel1: Vec<f64>,
    pub channel2: Vec<f64>,
}

impl FeatureChannelPair {
    pub fn new(channel1: Vec<f64>, channel2: Vec<f64>) -> Self {
        Self { channel1, channel2 }
    }

    /// Number of usable frames
    pub fn len(&self) -> usize {
        self.channel1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel1.is_empty() || self.channel2.is_empty()
    }

    /// Fail with [`Error::EmptyChannel`] if either channel has no samples
    pub fn ensure_non_empty(&self) -> Result<()> {
        if self.channel1.is_empty() {
            return Err(Error::EmptyChannel { channel: "channel1" });
        }
        if self.channel2.is_empty() {
            return Err(Error::EmptyChannel { channel: "channel2" });
        }
        Ok(())
    }
}

/// Features together with the side they were computed on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFeatures {
    pub exercise: ExerciseKind,
    pub side: Side,
    /// Whether the side came from visibility counts rather than the caller
    pub side_detected: bool,
    pub channels: FeatureChannelPair,
}

/// Per-exercise feature extractor
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    filter: MedianFilter,
    passes: usize,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            filter: MedianFilter::default(),
            passes: ANGLE_MEDIAN_PASSES,
        }
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the arm with more frames where shoulder, elbow and wrist all exist
    ///
    /// Ties go to the left side.
    pub fn detect_side(&self, sequence: &PoseSequence) -> Side {
        let count = |side: Side| {
            let [shoulder, elbow, wrist, _] = side.arm_chain();
            sequence
                .poses()
                .iter()
                .filter(|pose| pose.all_exist(&[shoulder, elbow, wrist]))
                .count()
        };

        let left = count(Side::Left);
        let right = count(Side::Right);
        tracing::debug!(left, right, "arm visibility counts");

        if right > left {
            Side::Right
        } else {
            Side::Left
        }
    }

    /// Extract the channel pair for `exercise`
    ///
    /// With `side` omitted the visible arm is detected automatically. A
    /// sequence with no usable frames yields an empty pair, not an error.
    pub fn extract(
        &self,
        sequence: &PoseSequence,
        exercise: ExerciseKind,
        side: Option<Side>,
    ) -> Result<FeatureChannelPair> {
        Ok(self.analyze(sequence, exercise, side)?.channels)
    }

    /// Like [`FeatureExtractor::extract`], also reporting the side used
    pub fn analyze(
        &self,
        sequence: &PoseSequence,
        exercise: ExerciseKind,
        side: Option<Side>,
    ) -> Result<ExtractedFeatures> {
        let (side, side_detected) = match side {
            Some(side) => (side, false),
            None => (self.detect_side(sequence), true),
        };

        let [shoulder, elbow, wrist, hip] = side.arm_chain();
        let chain = [shoulder, elbow, wrist, hip, BodyPart::Neck];

        let usable: Vec<&FramePose> = sequence
            .poses()
            .iter()
            .filter(|pose| pose.all_exist(&chain))
            .collect();

        let formula = exercise.formula();
        let mut channel1 = Vec::with_capacity(usable.len());
        let mut elbow_angles = Vec::with_capacity(usable.len());

        for (frame, pose) in usable.iter().enumerate() {
            let upper_arm = segment(&pose[elbow], &pose[shoulder]);
            let upper_arm = unit_segment(&upper_arm, frame, "upper_arm")?;
            let forearm = unit_segment(&segment(&pose[elbow], &pose[wrist]), frame, "forearm")?;

            let first = match formula {
                FeatureFormula::CurlLike => {
                    let torso = segment(&pose[hip], &pose[BodyPart::Neck]);
                    let torso = unit_segment(&torso, frame, "torso")?;
                    angle_between_degrees(&upper_arm, &torso)
                }
                FeatureFormula::PressLike => pose[BodyPart::Neck].x - pose[hip].x,
            };

            channel1.push(first);
            elbow_angles.push(angle_between_degrees(&upper_arm, &forearm));
        }

        // Only angle channels are smoothed; back displacement stays raw
        let channel1 = match formula {
            FeatureFormula::CurlLike => self.filter.filter_repeated(&channel1, self.passes),
            FeatureFormula::PressLike => channel1,
        };
        let channel2 = self.filter.filter_repeated(&elbow_angles, self.passes);

        tracing::debug!(
            exercise = %exercise,
            side = %side,
            frames = sequence.len(),
            usable = usable.len(),
            "extracted feature channels"
        );

        Ok(ExtractedFeatures {
            exercise,
            side,
            side_detected,
            channels: FeatureChannelPair::new(channel1, channel2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swole_core::Keypoint;

    const HIDDEN: Keypoint = Keypoint {
        x: 0.0,
        y: 0.0,
        confidence: Some(0.0),
    };

    /// Side-view frame: torso vertical, upper arm hanging alongside it, elbow bent to `elbow_deg`
    fn arm_frame(side: Side, elbow_deg: f64, visible: bool) -> FramePose {
        let mut keypoints = [HIDDEN; BodyPart::COUNT];
        let [shoulder, elbow, wrist, _] = side.arm_chain();
        let put = |kps: &mut [Keypoint; BodyPart::COUNT], part: BodyPart, x: f64, y: f64| {
            kps[part.index()] = Keypoint::with_confidence(x, y, 0.9);
        };

        put(&mut keypoints, BodyPart::Neck, 0.0, 0.0);
        put(&mut keypoints, BodyPart::LeftHip, 0.0, 100.0);
        put(&mut keypoints, BodyPart::RightHip, 0.0, 100.0);

        if visible {
            put(&mut keypoints, shoulder, 0.0, 10.0);
            put(&mut keypoints, elbow, 0.0, 50.0);
            let theta = elbow_deg.to_radians();
            // Forearm direction relative to the elbow->shoulder vector (0, -1)
            put(&mut keypoints, wrist, 40.0 * theta.sin(), 50.0 - 40.0 * theta.cos());
        }
        FramePose::new(keypoints)
    }

    fn sequence(frames: Vec<FramePose>) -> PoseSequence {
        PoseSequence::new(frames).unwrap()
    }

    #[test]
    fn test_detects_right_side() {
        let frames = (0..8).map(|_| arm_frame(Side::Right, 120.0, true)).collect();
        let seq = sequence(frames);
        let extractor = FeatureExtractor::new();

        assert_eq!(extractor.detect_side(&seq), Side::Right);

        let features = extractor.analyze(&seq, ExerciseKind::BicepCurl, None).unwrap();
        assert_eq!(features.side, Side::Right);
        assert!(features.side_detected);
        assert_eq!(features.channels.len(), 8);
    }

    #[test]
    fn test_tie_resolves_left() {
        let frames = (0..4).map(|_| arm_frame(Side::Left, 90.0, false)).collect();
        let seq = sequence(frames);
        assert_eq!(FeatureExtractor::new().detect_side(&seq), Side::Left);
    }

    #[test]
    fn test_curl_angles() {
        let frames = (0..10).map(|_| arm_frame(Side::Left, 90.0, true)).collect();
        let seq = sequence(frames);
        let pair = FeatureExtractor::new()
            .extract(&seq, ExerciseKind::BicepCurl, Some(Side::Left))
            .unwrap();

        assert_eq!(pair.len(), 10);
        // Interior samples are untouched by the zero padding
        for i in 4..6 {
            assert!(pair.channel1[i].abs() < 1e-6, "torso angle {}", pair.channel1[i]);
            assert!((pair.channel2[i] - 90.0).abs() < 1e-6, "elbow angle {}", pair.channel2[i]);
        }
    }

    #[test]
    fn test_press_back_channel_is_raw_displacement() {
        let mut frames: Vec<FramePose> = (0..6).map(|_| arm_frame(Side::Left, 170.0, true)).collect();
        // Lean: neck shifted forward by 20px in one frame
        let mut kps = *frames[0].keypoints();
        kps[BodyPart::Neck.index()] = Keypoint::with_confidence(20.0, 0.0, 0.9);
        frames[0] = FramePose::new(kps);

        let seq = sequence(frames);
        let pair = FeatureExtractor::new()
            .extract(&seq, ExerciseKind::ShoulderPress, Some(Side::Left))
            .unwrap();

        let expected = 20.0 / seq.torso_length();
        assert!((pair.channel1[0] - expected).abs() < 1e-9);
        assert!(pair.channel1[1..].iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_no_usable_frames_yields_empty_pair() {
        let frames = (0..5).map(|_| arm_frame(Side::Left, 90.0, false)).collect();
        let seq = sequence(frames);
        let pair = FeatureExtractor::new()
            .extract(&seq, ExerciseKind::FrontRaise, Some(Side::Left))
            .unwrap();

        assert!(pair.is_empty());
        assert_eq!(
            pair.ensure_non_empty(),
            Err(Error::EmptyChannel { channel: "channel1" })
        );
    }

    #[test]
    fn test_collapsed_forearm_is_degenerate() {
        let mut frames: Vec<FramePose> = (0..3).map(|_| arm_frame(Side::Left, 90.0, true)).collect();
        let mut kps = *frames[2].keypoints();
        kps[BodyPart::LeftWrist.index()] = kps[BodyPart::LeftElbow.index()];
        frames[2] = FramePose::new(kps);

        let err = FeatureExtractor::new()
            .extract(&sequence(frames), ExerciseKind::BicepCurl, Some(Side::Left))
            .unwrap_err();
        assert_eq!(
            err,
            Error::DegenerateVector {
                frame: 2,
                segment: "forearm"
            }
        );
    }
}
