//! Pre-labeled reference corpus.
//!
//! The corpus is assembled once from training repetitions and is read-only
//! afterwards; scoring only ever borrows it.

use serde::{Deserialize, Serialize};
use swole_core::{ExerciseKind, FormLabel, PoseSequence, Result};
use swole_features::{FeatureChannelPair, FeatureExtractor};

/// Label a training file by name: anything containing `good` is good form
pub fn label_for_name(name: &str) -> FormLabel {
    if name.contains("good") {
        FormLabel::Good
    } else {
        FormLabel::Bad
    }
}

/// One labeled training repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub name: String,
    pub label: FormLabel,
    pub channels: FeatureChannelPair,
}

/// Ordered, immutable set of labeled references for one exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceCorpus {
    exercise: ExerciseKind,
    entries: Vec<ReferenceEntry>,
}

impl ReferenceCorpus {
    /// Every entry must have samples in both channels
    pub fn new(exercise: ExerciseKind, entries: Vec<ReferenceEntry>) -> Result<Self> {
        for entry in &entries {
            entry.channels.ensure_non_empty()?;
        }
        Ok(Self { exercise, entries })
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.exercise
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, label: FormLabel) -> usize {
        self.entries.iter().filter(|e| e.label == label).count()
    }

    /// First good-form exemplar in corpus order
    pub fn first_good(&self) -> Option<&ReferenceEntry> {
        self.entries.iter().find(|e| e.label.is_good())
    }
}

/// Incrementally extracts and collects reference entries
#[derive(Debug)]
pub struct CorpusBuilder {
    exercise: ExerciseKind,
    extractor: FeatureExtractor,
    entries: Vec<ReferenceEntry>,
}

impl CorpusBuilder {
    pub fn new(exercise: ExerciseKind) -> Self {
        Self {
            exercise,
            extractor: FeatureExtractor::default(),
            entries: Vec::new(),
        }
    }

    /// Extract features from a training sequence (side auto-detected)
    pub fn add_sequence(
        &mut self,
        name: impl Into<String>,
        label: FormLabel,
        sequence: &PoseSequence,
    ) -> Result<()> {
        let channels = self.extractor.extract(sequence, self.exercise, None)?;
        self.add_features(name, label, channels)
    }

    /// Add already-extracted channels
    pub fn add_features(
        &mut self,
        name: impl Into<String>,
        label: FormLabel,
        channels: FeatureChannelPair,
    ) -> Result<()> {
        let name = name.into();
        if let Err(e) = channels.ensure_non_empty() {
            tracing::debug!(entry = %name, "reference has no usable frames");
            return Err(e);
        }

        self.entries.push(ReferenceEntry {
            name,
            label,
            channels,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(self) -> ReferenceCorpus {
        ReferenceCorpus {
            exercise: self.exercise,
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swole_core::Error;

    fn pair(a: &[f64], b: &[f64]) -> FeatureChannelPair {
        FeatureChannelPair::new(a.to_vec(), b.to_vec())
    }

    #[test]
    fn test_label_for_name() {
        assert_eq!(label_for_name("bicep_good3.json"), FormLabel::Good);
        assert_eq!(label_for_name("bicep_bad12.json"), FormLabel::Bad);
        assert_eq!(label_for_name("GOOD1.json"), FormLabel::Bad);
    }

    #[test]
    fn test_builder_preserves_order() {
        let mut builder = CorpusBuilder::new(ExerciseKind::BicepCurl);
        builder.add_features("bad1", FormLabel::Bad, pair(&[1.0], &[2.0])).unwrap();
        builder.add_features("good1", FormLabel::Good, pair(&[3.0], &[4.0])).unwrap();
        builder.add_features("good2", FormLabel::Good, pair(&[5.0], &[6.0])).unwrap();

        let corpus = builder.build();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.count(FormLabel::Good), 2);
        assert_eq!(corpus.count(FormLabel::Bad), 1);
        assert_eq!(corpus.first_good().unwrap().name, "good1");
    }

    #[test]
    fn test_empty_entry_rejected() {
        let mut builder = CorpusBuilder::new(ExerciseKind::FrontRaise);
        let err = builder
            .add_features("good1", FormLabel::Good, pair(&[], &[]))
            .unwrap_err();
        assert_eq!(err, Error::EmptyChannel { channel: "channel1" });
        assert!(builder.is_empty());

        let entry = ReferenceEntry {
            name: "bad1".into(),
            label: FormLabel::Bad,
            channels: pair(&[1.0], &[]),
        };
        assert!(ReferenceCorpus::new(ExerciseKind::FrontRaise, vec![entry]).is_err());
    }
}
