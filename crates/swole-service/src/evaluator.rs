//! Concurrent form evaluation against lazily loaded reference corpora.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use swole_core::{ExerciseKind, PoseSequence, RawFrame, Side, Timestamp};
use swole_features::{ChannelPairSummary, FeatureExtractor};
use swole_scoring::{FormScorer, ReferenceCorpus, ScoreResult};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::loader::load_corpus;

/// Unique identifier of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationId(pub Uuid);

impl EvaluationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EvaluationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One repetition to judge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub exercise: ExerciseKind,
    /// Arm to measure; detected from visibility when absent
    pub side: Option<Side>,
    pub frames: Vec<RawFrame>,
}

impl EvaluationRequest {
    pub fn new(exercise: ExerciseKind, frames: Vec<RawFrame>) -> Self {
        Self {
            exercise,
            side: None,
            frames,
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }
}

/// Outcome of one evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub id: EvaluationId,
    pub evaluated_at: Timestamp,
    pub exercise: ExerciseKind,
    pub side: Side,
    pub side_detected: bool,
    pub frames: usize,
    /// Range statistics of the query channels
    pub query: ChannelPairSummary,
    pub result: ScoreResult,
}

/// Scores repetitions against one shared corpus per exercise
///
/// Each corpus is built on first use, exactly once, and then shared
/// read-only by every request. A failed build is retried by the next
/// request for that exercise.
pub struct FormEvaluator {
    config: ServiceConfig,
    extractor: FeatureExtractor,
    scorer: FormScorer,
    corpora: HashMap<ExerciseKind, OnceCell<Arc<ReferenceCorpus>>>,
}

impl FormEvaluator {
    pub fn new(config: ServiceConfig) -> ServiceResult<Self> {
        config.validate()?;

        let scorer = FormScorer::new(config.scoring.aggregation());
        let corpora = ExerciseKind::ALL
            .iter()
            .map(|kind| (*kind, OnceCell::new()))
            .collect();

        Ok(Self {
            config,
            extractor: FeatureExtractor::default(),
            scorer,
            corpora,
        })
    }

    /// Use a prebuilt corpus instead of loading one from disk
    pub fn with_corpus(mut self, corpus: ReferenceCorpus) -> Self {
        let exercise = corpus.exercise();
        self.corpora
            .insert(exercise, OnceCell::new_with(Some(Arc::new(corpus))));
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The reference corpus for `exercise`, loading it on first use
    pub async fn corpus(&self, exercise: ExerciseKind) -> ServiceResult<Arc<ReferenceCorpus>> {
        let cell = self.corpora.get(&exercise).ok_or_else(|| ServiceError::Corpus {
            exercise,
            reason: "exercise not registered".into(),
        })?;

        let corpus = cell
            .get_or_try_init(|| async {
                let dir = self.config.corpus.dir_for(exercise);
                let corpus = tokio::task::spawn_blocking(move || load_corpus(&dir, exercise))
                    .await
                    .map_err(|e| ServiceError::Corpus {
                        exercise,
                        reason: format!("loader task failed: {e}"),
                    })??;
                Ok::<_, ServiceError>(Arc::new(corpus))
            })
            .await?;

        Ok(Arc::clone(corpus))
    }

    /// Build every corpus eagerly
    pub async fn preload(&self) -> ServiceResult<()> {
        for exercise in ExerciseKind::ALL {
            self.corpus(exercise).await?;
        }
        Ok(())
    }

    /// Judge one repetition
    pub async fn evaluate(&self, request: EvaluationRequest) -> ServiceResult<EvaluationReport> {
        let EvaluationRequest {
            exercise,
            side,
            frames,
        } = request;

        let limit = self.config.limits.max_frames;
        if frames.len() > limit {
            return Err(ServiceError::TooManyFrames {
                frames: frames.len(),
                limit,
            });
        }

        let sequence = PoseSequence::from_raw(&frames)?;
        let features = self.extractor.analyze(&sequence, exercise, side)?;
        let query = ChannelPairSummary::from_pair(&features.channels)?;

        let corpus = self.corpus(exercise).await?;
        let scorer = self.scorer.clone();
        let channels = features.channels;
        let result = tokio::task::spawn_blocking(move || scorer.score(&channels, &corpus, exercise))
            .await
            .map_err(|e| ServiceError::Corpus {
                exercise,
                reason: format!("scoring task failed: {e}"),
            })??;

        let report = EvaluationReport {
            id: EvaluationId::new(),
            evaluated_at: Timestamp::now(),
            exercise,
            side: features.side,
            side_detected: features.side_detected,
            frames: sequence.len(),
            query,
            result,
        };

        tracing::info!(
            id = %report.id,
            exercise = %exercise,
            side = %report.side,
            label = %report.result.label,
            percentage = report.result.percentage,
            "evaluation complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swole_core::{Error, FormLabel};
    use swole_features::FeatureChannelPair;
    use swole_scoring::{Aggregation, CorpusBuilder};

    fn corpus(exercise: ExerciseKind) -> ReferenceCorpus {
        let good = FeatureChannelPair::new(vec![1.0, 2.0], vec![3.0]);
        let bad = FeatureChannelPair::new(vec![9.0, 9.0], vec![9.0]);

        let mut builder = CorpusBuilder::new(exercise);
        builder.add_features("good1", FormLabel::Good, good).unwrap();
        builder.add_features("bad1", FormLabel::Bad, bad).unwrap();
        builder.build()
    }

    #[test]
    fn test_evaluation_ids_unique() {
        assert_ne!(EvaluationId::new(), EvaluationId::new());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ServiceConfig::default();
        config.limits.max_frames = 0;
        assert!(matches!(FormEvaluator::new(config), Err(ServiceError::Config(_))));
    }

    #[test]
    fn test_scorer_follows_config() {
        let mut config = ServiceConfig::default();
        config.scoring.aggregation = crate::config::AggregationMode::Nearest;
        let evaluator = FormEvaluator::new(config).unwrap();
        assert_eq!(evaluator.scorer.aggregation(), Aggregation::Nearest { k: 3 });
    }

    #[tokio::test]
    async fn test_injected_corpus_is_shared() {
        let evaluator = FormEvaluator::new(ServiceConfig::default())
            .unwrap()
            .with_corpus(corpus(ExerciseKind::FrontRaise));

        let a = evaluator.corpus(ExerciseKind::FrontRaise).await.unwrap();
        let b = evaluator.corpus(ExerciseKind::FrontRaise).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 2);
    }

    #[tokio::test]
    async fn test_frame_limit_checked_first() {
        let mut config = ServiceConfig::default();
        config.limits.max_frames = 2;
        let evaluator = FormEvaluator::new(config).unwrap();

        let frames = vec![RawFrame::Positional(Vec::new()); 3];
        let err = evaluator
            .evaluate(EvaluationRequest::new(ExerciseKind::BicepCurl, frames))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::TooManyFrames { frames: 3, limit: 2 }));
    }

    #[tokio::test]
    async fn test_empty_request_rejected() {
        let evaluator = FormEvaluator::new(ServiceConfig::default()).unwrap();
        let err = evaluator
            .evaluate(EvaluationRequest::new(ExerciseKind::BicepCurl, Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(Error::InputFormat(_))));
    }
}
