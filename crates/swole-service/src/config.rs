//! Service configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use swole_core::ExerciseKind;
use swole_scoring::Aggregation;

/// Environment variable prefix, e.g. `SWOLEMATE_CORPUS__ROOT`
pub const ENV_PREFIX: &str = "SWOLEMATE";

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Reference corpus location
    pub corpus: CorpusConfig,

    /// Scoring behaviour
    pub scoring: ScoringConfig,

    /// Request limits
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Directory holding one subdirectory per exercise
    pub root: PathBuf,

    pub bicep_dir: String,
    pub frontraise_dir: String,
    pub shoulderpress_dir: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("poses_compressed"),
            bicep_dir: ExerciseKind::BicepCurl.corpus_dir_name().to_string(),
            frontraise_dir: ExerciseKind::FrontRaise.corpus_dir_name().to_string(),
            shoulderpress_dir: ExerciseKind::ShoulderPress.corpus_dir_name().to_string(),
        }
    }
}

impl CorpusConfig {
    /// Training-file directory for one exercise
    pub fn dir_for(&self, exercise: ExerciseKind) -> PathBuf {
        let name = match exercise {
            ExerciseKind::BicepCurl => &self.bicep_dir,
            ExerciseKind::FrontRaise => &self.frontraise_dir,
            ExerciseKind::ShoulderPress => &self.shoulderpress_dir,
        };
        self.root.join(name)
    }
}

/// Pool reduction selected in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    #[default]
    Mean,
    Nearest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub aggregation: AggregationMode,

    /// Neighbours averaged per pool in `nearest` mode
    pub nearest_k: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            aggregation: AggregationMode::Mean,
            nearest_k: 3,
        }
    }
}

impl ScoringConfig {
    pub fn aggregation(&self) -> Aggregation {
        match self.aggregation {
            AggregationMode::Mean => Aggregation::Mean,
            AggregationMode::Nearest => Aggregation::Nearest { k: self.nearest_k },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Longest accepted query, in frames
    pub max_frames: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_frames: 600 }
    }
}

impl ServiceConfig {
    /// Load configuration from file, overlaid by the environment
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(environment())
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.scoring.aggregation == AggregationMode::Nearest && self.scoring.nearest_k == 0 {
            return Err(config::ConfigError::Message(
                "scoring.nearest_k must be positive".into(),
            ));
        }
        if self.limits.max_frames == 0 {
            return Err(config::ConfigError::Message(
                "limits.max_frames must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
