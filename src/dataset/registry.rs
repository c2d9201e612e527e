//! Closed mapping from source keys to dataset files and shape families.

use crate::error::{AnalyzerError, Result};
use std::path::PathBuf;

/// Native field layout of a dataset source.
///
/// The family is fixed per source key at registry-definition time;
/// normalization dispatches on it rather than inspecting record shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFamily {
    /// Separate `context` and `question` fields plus benchmark metadata
    /// (`question_index`, `category`, `question_polarity`,
    /// `context_condition`).
    ContextQuestion,
    /// A bare `question` field and a `question_no` ordinal, nothing else.
    QuestionOnly,
    /// Already carries the canonical question under `eval_question`.
    PreNormalized,
}

/// One registry entry: file name, shape family, and the provenance label
/// stamped on normalized records.
#[derive(Debug)]
pub struct SourceSpec {
    pub key: &'static str,
    pub file_name: &'static str,
    pub family: ShapeFamily,
    pub label: &'static str,
}

/// Adding a source is one line here plus, for a new native layout, one
/// `ShapeFamily` variant.
const SOURCES: &[SourceSpec] = &[
    SourceSpec { key: "age", file_name: "Age.jsonl", family: ShapeFamily::ContextQuestion, label: "bbq" },
    SourceSpec { key: "disability", file_name: "Disability_status.jsonl", family: ShapeFamily::ContextQuestion, label: "bbq" },
    SourceSpec { key: "gender", file_name: "Gender_identity.jsonl", family: ShapeFamily::ContextQuestion, label: "bbq" },
    SourceSpec { key: "nationality", file_name: "Nationality.jsonl", family: ShapeFamily::ContextQuestion, label: "bbq" },
    SourceSpec { key: "physical", file_name: "Physical_appearance.jsonl", family: ShapeFamily::ContextQuestion, label: "bbq" },
    SourceSpec { key: "race", file_name: "Race_ethnicity.jsonl", family: ShapeFamily::ContextQuestion, label: "bbq" },
    SourceSpec { key: "race_gender", file_name: "Race_x_gender.jsonl", family: ShapeFamily::ContextQuestion, label: "bbq" },
    SourceSpec { key: "race_ses", file_name: "Race_x_SES.jsonl", family: ShapeFamily::ContextQuestion, label: "bbq" },
    SourceSpec { key: "religion", file_name: "Religion.jsonl", family: ShapeFamily::ContextQuestion, label: "bbq" },
    SourceSpec { key: "ses", file_name: "SES.jsonl", family: ShapeFamily::ContextQuestion, label: "bbq" },
    SourceSpec { key: "orientation", file_name: "Sexual_orientation.jsonl", family: ShapeFamily::ContextQuestion, label: "bbq" },
    SourceSpec { key: "diverse", file_name: "llm_eval_qns_diverse_topicsv2.jsonl", family: ShapeFamily::QuestionOnly, label: "llm_generated_diverse" },
    SourceSpec { key: "diverse_openai_updated", file_name: "llm_eval_qns_diverse_topics_openai_updated.jsonl", family: ShapeFamily::PreNormalized, label: "llm_generated_diverse" },
    SourceSpec { key: "beats_eval_v1", file_name: "beats_eval_questions_v1.jsonl", family: ShapeFamily::PreNormalized, label: "beats_eval" },
    SourceSpec { key: "beats_diverse", file_name: "beats_eval_qns_diverse.jsonl", family: ShapeFamily::PreNormalized, label: "beats_eval" },
];

/// Resolves logical dataset names to physical resources.
///
/// The key set is closed and fixed; an unknown key is a hard error, never
/// a silent default.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    base_dir: PathBuf,
}

impl SourceRegistry {
    /// Create a registry rooted at the directory holding the JSONL files.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// All valid source keys, in registry order.
    pub fn keys() -> Vec<&'static str> {
        SOURCES.iter().map(|s| s.key).collect()
    }

    /// Look up the registry entry for a source key.
    pub fn lookup(&self, key: &str) -> Result<&'static SourceSpec> {
        SOURCES
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| AnalyzerError::UnknownSource {
                key: key.to_string(),
                valid: Self::keys(),
            })
    }

    /// Resolve a source key to the full path of its dataset file.
    pub fn resolve(&self, key: &str) -> Result<PathBuf> {
        let spec = self.lookup(key)?;
        Ok(self.base_dir.join(spec.file_name))
    }
}
