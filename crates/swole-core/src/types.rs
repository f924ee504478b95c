//! Fundamental types for the form evaluation pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Div;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Timestamp wrapper with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }
}

/// 18-part body landmark set (OpenPose COCO-18 ordering)
///
/// The discriminant is the position of the part in a positional frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BodyPart {
    Nose = 0,
    Neck = 1,
    RightShoulder = 2,
    RightElbow = 3,
    RightWrist = 4,
    LeftShoulder = 5,
    LeftElbow = 6,
    LeftWrist = 7,
    RightHip = 8,
    RightKnee = 9,
    RightAnkle = 10,
    LeftHip = 11,
    LeftKnee = 12,
    LeftAnkle = 13,
    RightEye = 14,
    LeftEye = 15,
    RightEar = 16,
    LeftEar = 17,
}

impl BodyPart {
    pub const COUNT: usize = 18;

    /// All parts in canonical positional order
    pub const ALL: [BodyPart; BodyPart::COUNT] = [
        BodyPart::Nose,
        BodyPart::Neck,
        BodyPart::RightShoulder,
        BodyPart::RightElbow,
        BodyPart::RightWrist,
        BodyPart::LeftShoulder,
        BodyPart::LeftElbow,
        BodyPart::LeftWrist,
        BodyPart::RightHip,
        BodyPart::RightKnee,
        BodyPart::RightAnkle,
        BodyPart::LeftHip,
        BodyPart::LeftKnee,
        BodyPart::LeftAnkle,
        BodyPart::RightEye,
        BodyPart::LeftEye,
        BodyPart::RightEar,
        BodyPart::LeftEar,
    ];

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Canonical snake_case name used by keypoint files
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::Neck => "neck",
            Self::RightShoulder => "right_shoulder",
            Self::RightElbow => "right_elbow",
            Self::RightWrist => "right_wrist",
            Self::LeftShoulder => "left_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightHip => "right_hip",
            Self::RightKnee => "right_knee",
            Self::RightAnkle => "right_ankle",
            Self::LeftHip => "left_hip",
            Self::LeftKnee => "left_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightEye => "right_eye",
            Self::LeftEye => "left_eye",
            Self::RightEar => "right_ear",
            Self::LeftEar => "left_ear",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|part| part.name() == name)
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One detected landmark for one frame
///
/// A missing confidence means the detector does not report one and the
/// landmark is treated as always present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    pub confidence: Option<f64>,
}

impl Keypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            confidence: None,
        }
    }

    pub fn with_confidence(x: f64, y: f64, confidence: f64) -> Self {
        Self {
            x,
            y,
            confidence: Some(confidence),
        }
    }

    /// Build from a `[x, y]` or `[x, y, confidence]` tuple
    pub fn from_values(values: &[f64]) -> Result<Self> {
        match *values {
            [x, y] => Ok(Self::new(x, y)),
            [x, y, c] => Ok(Self::with_confidence(x, y, c)),
            _ => Err(Error::InputFormat(format!(
                "keypoint must have 2 or 3 values, got {}",
                values.len()
            ))),
        }
    }

    /// A zero confidence marks a landmark the detector did not find
    pub fn exists(&self) -> bool {
        self.confidence.map_or(true, |c| c != 0.0)
    }

    /// Planar Euclidean distance, regardless of existence
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Div<f64> for Keypoint {
    type Output = Keypoint;

    fn div(self, scalar: f64) -> Keypoint {
        Keypoint {
            x: self.x / scalar,
            y: self.y / scalar,
            confidence: self.confidence,
        }
    }
}

/// One frame of detector output, before validation
///
/// Either a mapping from canonical part name to coordinate tuple, or an
/// 18-entry list in canonical part order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFrame {
    Named(BTreeMap<String, Vec<f64>>),
    Positional(Vec<Vec<f64>>),
}

/// Binary form label attached to references and verdicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FormLabel {
    Bad = 0,
    Good = 1,
}

impl FormLabel {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn is_good(&self) -> bool {
        matches!(self, FormLabel::Good)
    }
}

impl fmt::Display for FormLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormLabel::Good => f.write_str("good"),
            FormLabel::Bad => f.write_str("bad"),
        }
    }
}

/// Body side facing the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Shoulder, elbow, wrist and hip on this side
    pub fn arm_chain(&self) -> [BodyPart; 4] {
        match self {
            Side::Left => [
                BodyPart::LeftShoulder,
                BodyPart::LeftElbow,
                BodyPart::LeftWrist,
                BodyPart::LeftHip,
            ],
            Side::Right => [
                BodyPart::RightShoulder,
                BodyPart::RightElbow,
                BodyPart::RightWrist,
                BodyPart::RightHip,
            ],
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "1" => Ok(Side::Left),
            "right" | "2" => Ok(Side::Right),
            other => Err(Error::InvalidInput(format!(
                "side must be 'left' or 'right', got '{other}'"
            ))),
        }
    }
}

/// Which pair of channels an exercise is judged on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureFormula {
    /// Upper arm vs torso angle, upper arm vs forearm angle
    CurlLike,
    /// Horizontal torso displacement, upper arm vs forearm angle
    PressLike,
}

/// Supported exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    BicepCurl,
    FrontRaise,
    ShoulderPress,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 3] = [
        ExerciseKind::BicepCurl,
        ExerciseKind::FrontRaise,
        ExerciseKind::ShoulderPress,
    ];

    pub fn formula(&self) -> FeatureFormula {
        match self {
            ExerciseKind::BicepCurl | ExerciseKind::FrontRaise => FeatureFormula::CurlLike,
            ExerciseKind::ShoulderPress => FeatureFormula::PressLike,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExerciseKind::BicepCurl => "Bicep Curl",
            ExerciseKind::FrontRaise => "Front Raise",
            ExerciseKind::ShoulderPress => "Shoulder Press",
        }
    }

    /// Directory holding this exercise's labeled training files
    pub fn corpus_dir_name(&self) -> &'static str {
        match self {
            ExerciseKind::BicepCurl => "bicep",
            ExerciseKind::FrontRaise => "frontraise",
            ExerciseKind::ShoulderPress => "shoulderpress",
        }
    }

    /// Human-readable descriptions of the two channels
    pub fn channel_labels(&self) -> (&'static str, &'static str) {
        let forearm = "Angle between Upper Arm and Forearm";
        match self.formula() {
            FeatureFormula::CurlLike => ("Angles between Upper Arm and Torso", forearm),
            FeatureFormula::PressLike => ("Movement of Back", forearm),
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ExerciseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "1" | "bicep" | "bicepcurl" => Ok(ExerciseKind::BicepCurl),
            "2" | "frontraise" => Ok(ExerciseKind::FrontRaise),
            "3" | "shoulderpress" => Ok(ExerciseKind::ShoulderPress),
            _ => Err(Error::InvalidInput(format!("unknown exercise '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_now_is_ordered() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        assert!(a.0 > 0);
        assert!(b >= a);
    }

    #[test]
    fn test_body_part_roundtrip() {
        for i in 0..BodyPart::COUNT {
            let part = BodyPart::from_index(i).unwrap();
            assert_eq!(part.index(), i);
            assert_eq!(BodyPart::from_name(part.name()), Some(part));
        }
        assert!(BodyPart::from_index(BodyPart::COUNT).is_none());
    }

    #[test]
    fn test_keypoint_existence() {
        assert!(Keypoint::new(1.0, 2.0).exists());
        assert!(Keypoint::with_confidence(1.0, 2.0, 0.3).exists());
        assert!(!Keypoint::with_confidence(1.0, 2.0, 0.0).exists());
    }

    #[test]
    fn test_keypoint_division_keeps_confidence() {
        let kp = Keypoint::with_confidence(10.0, 4.0, 0.0) / 2.0;
        assert_eq!(kp, Keypoint::with_confidence(5.0, 2.0, 0.0));

        let kp = Keypoint::new(3.0, 9.0) / 3.0;
        assert_eq!(kp.confidence, None);
        assert!((kp.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_keypoint_distance() {
        let a = Keypoint::new(0.0, 0.0);
        let b = Keypoint::with_confidence(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_keypoint_from_values_rejects_bad_arity() {
        assert!(Keypoint::from_values(&[1.0]).is_err());
        assert!(Keypoint::from_values(&[1.0, 2.0, 3.0, 4.0]).is_err());
        assert_eq!(
            Keypoint::from_values(&[1.0, 2.0, 0.5]).unwrap(),
            Keypoint::with_confidence(1.0, 2.0, 0.5)
        );
    }

    #[test]
    fn test_exercise_parsing() {
        assert_eq!("Bicep Curl".parse::<ExerciseKind>().unwrap(), ExerciseKind::BicepCurl);
        assert_eq!("frontraise".parse::<ExerciseKind>().unwrap(), ExerciseKind::FrontRaise);
        assert_eq!("shoulder_press".parse::<ExerciseKind>().unwrap(), ExerciseKind::ShoulderPress);
        assert_eq!("3".parse::<ExerciseKind>().unwrap(), ExerciseKind::ShoulderPress);
        assert!("squat".parse::<ExerciseKind>().is_err());
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!("Left".parse::<Side>().unwrap(), Side::Left);
        assert_eq!("2".parse::<Side>().unwrap(), Side::Right);
        assert!("up".parse::<Side>().is_err());
    }

    #[test]
    fn test_raw_frame_untagged_forms() {
        let named: RawFrame = serde_json::from_str(r#"{"nose": [1.0, 2.0]}"#).unwrap();
        assert!(matches!(named, RawFrame::Named(_)));

        let positional: RawFrame = serde_json::from_str("[[1.0, 2.0, 0.9]]").unwrap();
        assert!(matches!(positional, RawFrame::Positional(_)));
    }
}
