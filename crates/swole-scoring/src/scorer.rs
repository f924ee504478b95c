//! Corpus scorer: distance pools, percentage score and verdict.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use swole_core::{Error, ExerciseKind, FormLabel, Result};
use swole_features::{round_hundredths, DisplayRange, FeatureChannelPair};

use crate::corpus::ReferenceCorpus;
use crate::dtw::dtw_distance;

pub const VERDICT_GOOD: &str = "Exercise Performed Correctly";
pub const VERDICT_BAD: &str = "Exercise needs some work";

/// How a pool of per-reference distances is reduced to one number per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Aggregation {
    /// Mean over the whole pool
    #[default]
    Mean,
    /// Mean over the `k` references closest on channel 1
    Nearest { k: usize },
}

/// Distance from the query to one reference entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDistance {
    /// Position of the entry in the corpus
    pub index: usize,
    pub name: String,
    pub label: FormLabel,
    pub channel1: f64,
    pub channel2: f64,
}

/// Display figures for the good exemplar and the query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRanges {
    pub reference: DisplayRange,
    pub query: DisplayRange,
}

/// Outcome of scoring one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Positive when the query is closer to good form; two decimals
    pub percentage: f64,
    pub label: FormLabel,
    pub verdict: String,
    pub good_score: f64,
    pub bad_score: f64,
    pub display: DisplayRanges,
    /// Good pool then bad pool, each sorted by channel-1 distance
    pub distances: Vec<ReferenceDistance>,
}

/// Nearest-neighbour form scorer
#[derive(Debug, Clone, Default)]
pub struct FormScorer {
    aggregation: Aggregation,
}

impl FormScorer {
    pub fn new(aggregation: Aggregation) -> Self {
        Self { aggregation }
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    /// Score `query` against every entry of `corpus`
    pub fn score(
        &self,
        query: &FeatureChannelPair,
        corpus: &ReferenceCorpus,
        exercise: ExerciseKind,
    ) -> Result<ScoreResult> {
        if corpus.exercise() != exercise {
            return Err(Error::InvalidInput(format!(
                "corpus is for {}, query is {}",
                corpus.exercise(),
                exercise
            )));
        }
        if let Aggregation::Nearest { k: 0 } = self.aggregation {
            return Err(Error::InvalidInput("nearest-k aggregation needs k > 0".into()));
        }
        query.ensure_non_empty()?;

        let mut good = Vec::new();
        let mut bad = Vec::new();

        for (index, entry) in corpus.entries().iter().enumerate() {
            let distance = ReferenceDistance {
                index,
                name: entry.name.clone(),
                label: entry.label,
                channel1: dtw_distance(&entry.channels.channel1, &query.channel1)?,
                channel2: dtw_distance(&entry.channels.channel2, &query.channel2)?,
            };
            match entry.label {
                FormLabel::Good => good.push(distance),
                FormLabel::Bad => bad.push(distance),
            }
        }

        if good.is_empty() {
            return Err(Error::EmptyPool {
                label: FormLabel::Good,
            });
        }
        if bad.is_empty() {
            return Err(Error::EmptyPool {
                label: FormLabel::Bad,
            });
        }

        sort_by_channel1(&mut good);
        sort_by_channel1(&mut bad);

        let good_score = self.pool_score(&good);
        let bad_score = self.pool_score(&bad);

        if !good_score.is_finite() || !bad_score.is_finite() {
            return Err(Error::InvalidInput(
                "feature channels produced a non-finite distance".into(),
            ));
        }
        if bad_score == 0.0 {
            return Err(Error::ZeroDenominator);
        }

        let percentage = round_hundredths(-100.0 * (good_score - bad_score) / bad_score);

        let (label, verdict) = if good_score < bad_score {
            (FormLabel::Good, VERDICT_GOOD)
        } else {
            (FormLabel::Bad, VERDICT_BAD)
        };

        // Pool emptiness was checked above, so an exemplar exists
        let exemplar = corpus
            .first_good()
            .ok_or(Error::EmptyPool {
                label: FormLabel::Good,
            })?;
        let display = DisplayRanges {
            reference: DisplayRange::from_pair(&exemplar.channels)?,
            query: DisplayRange::from_pair(query)?,
        };

        tracing::debug!(
            exercise = %exercise,
            good_score,
            bad_score,
            good_refs = good.len(),
            bad_refs = bad.len(),
            "scored query against corpus"
        );

        let mut distances = good;
        distances.append(&mut bad);

        Ok(ScoreResult {
            percentage,
            label,
            verdict: verdict.to_string(),
            good_score,
            bad_score,
            display,
            distances,
        })
    }

    /// Channel-1 mean plus channel-2 mean over the selected part of a sorted pool
    fn pool_score(&self, pool: &[ReferenceDistance]) -> f64 {
        let selected = match self.aggregation {
            Aggregation::Mean => pool,
            Aggregation::Nearest { k } => &pool[..k.min(pool.len())],
        };

        let n = selected.len() as f64;
        let d1 = selected.iter().map(|d| d.channel1).sum::<f64>() / n;
        let d2 = selected.iter().map(|d| d.channel2).sum::<f64>() / n;
        d1 + d2
    }
}

fn sort_by_channel1(pool: &mut [ReferenceDistance]) {
    pool.sort_by(|a, b| a.channel1.partial_cmp(&b.channel1).unwrap_or(Ordering::Equal));
}
