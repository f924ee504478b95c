//! Keypoint files and on-disk training corpora.
//!
//! A corpus directory holds one JSON keypoint file per repetition. Files are
//! visited in natural order and labeled from their names.

use std::path::{Path, PathBuf};

use swole_core::{Error, ExerciseKind, FormLabel, PoseSequence, RawFrame};
use swole_scoring::{label_for_name, CorpusBuilder, ReferenceCorpus};

use crate::error::{ServiceError, ServiceResult};

/// Split a file stem into its text head and trailing decimal number
pub fn split_trailing_number(stem: &str) -> (&str, Option<u64>) {
    let head = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    let number = stem[head.len()..].parse().ok();
    (head, number)
}

/// Sort paths by stem head, then trailing number (missing number first)
pub fn sort_naturally(paths: &mut [PathBuf]) {
    paths.sort_by_cached_key(|path| {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (head, number) = split_trailing_number(&stem);
        (head.to_string(), number, path.clone())
    });
}

/// JSON keypoint files in `dir`, naturally ordered
pub fn keypoint_files(dir: &Path) -> ServiceResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ServiceError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ServiceError::io(dir, e))?.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if path.is_file() && is_json {
            files.push(path);
        }
    }

    sort_naturally(&mut files);
    Ok(files)
}

/// Read the raw frames of one keypoint file
pub fn read_frames(path: &Path) -> ServiceResult<Vec<RawFrame>> {
    let json = std::fs::read_to_string(path).map_err(|e| ServiceError::io(path, e))?;
    serde_json::from_str(&json).map_err(|e| ServiceError::KeypointFile {
        path: path.to_path_buf(),
        source: Error::from(e),
    })
}

/// Read and normalize one keypoint file
pub fn load_sequence(path: &Path) -> ServiceResult<PoseSequence> {
    let frames = read_frames(path)?;
    PoseSequence::from_raw(&frames).map_err(|source| ServiceError::KeypointFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the reference corpus for `exercise` from every file in `dir`
///
/// Files that cannot be normalized, that have no usable frames, or that hold
/// a zero-length limb segment are skipped with a warning. Unreadable or
/// malformed files abort the load.
pub fn load_corpus(dir: &Path, exercise: ExerciseKind) -> ServiceResult<ReferenceCorpus> {
    let files = keypoint_files(dir)?;
    if files.is_empty() {
        return Err(ServiceError::Corpus {
            exercise,
            reason: format!("no keypoint files in {}", dir.display()),
        });
    }

    tracing::info!(
        exercise = %exercise,
        dir = %dir.display(),
        files = files.len(),
        "loading reference corpus"
    );

    let mut builder = CorpusBuilder::new(exercise);
    let mut skipped = 0usize;

    for path in &files {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = label_for_name(&name);

        let added = load_sequence(path).and_then(|sequence| {
            builder
                .add_sequence(name.as_str(), label, &sequence)
                .map_err(|source| ServiceError::KeypointFile {
                    path: path.clone(),
                    source,
                })
        });

        match added {
            Ok(()) => {}
            Err(e) if is_skippable(&e) => {
                tracing::warn!(file = %name, error = %e, "skipping training file");
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    let corpus = builder.build();
    tracing::info!(
        exercise = %exercise,
        entries = corpus.len(),
        good = corpus.count(FormLabel::Good),
        bad = corpus.count(FormLabel::Bad),
        skipped,
        "reference corpus ready"
    );

    Ok(corpus)
}

fn is_skippable(error: &ServiceError) -> bool {
    matches!(
        error.core(),
        Some(Error::EmptyChannel { .. })
            | Some(Error::Normalization { .. })
            | Some(Error::DegenerateVector { .. })
    )
}
