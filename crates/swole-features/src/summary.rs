//! Range statistics of feature channels for display next to a verdict.

use serde::{Deserialize, Serialize};
use swole_core::{Error, Result};

use crate::extractor::FeatureChannelPair;

/// Round to two decimal places
pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Min/max statistics of one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub len: usize,
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

impl ChannelSummary {
    pub fn from_channel(values: &[f64], channel: &'static str) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::EmptyChannel { channel });
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            len: values.len(),
            min,
            max,
            range: max - min,
        })
    }
}

/// Summaries of both channels of a pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelPairSummary {
    pub channel1: ChannelSummary,
    pub channel2: ChannelSummary,
}

impl ChannelPairSummary {
    pub fn from_pair(pair: &FeatureChannelPair) -> Result<Self> {
        Ok(Self {
            channel1: ChannelSummary::from_channel(&pair.channel1, "channel1")?,
            channel2: ChannelSummary::from_channel(&pair.channel2, "channel2")?,
        })
    }

    /// The two display numbers: spread of channel 1, floor of channel 2
    pub fn display_range(&self) -> DisplayRange {
        DisplayRange {
            channel1_range: round_hundredths(self.channel1.range),
            channel2_min: round_hundredths(self.channel2.min),
        }
    }
}

/// Informational range figures for one sample (not used for classification)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    /// `max(channel1) - min(channel1)`
    pub channel1_range: f64,
    /// `min(channel2)`
    pub channel2_min: f64,
}

impl DisplayRange {
    pub fn from_pair(pair: &FeatureChannelPair) -> Result<Self> {
        Ok(ChannelPairSummary::from_pair(pair)?.display_range())
    }
}
