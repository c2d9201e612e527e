//! JSONL export for downstream batch tooling.

use crate::dataset::{MaterializedEntry, SourcedQuestion};
use crate::error::{AnalyzerError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// One exported row. Struct field order is the wire order consumed by the
/// downstream batch tooling.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord {
    pub qn_source: String,
    pub bias_qn_category: Option<String>,
    pub question_number: usize,
    pub question_index: Option<String>,
    pub question_polarity: Option<String>,
    pub context_condition: Option<String>,
    pub question: String,
    pub question_string_length: usize,
}

impl ExportRecord {
    /// Build a row from a materialized question at its 1-based position.
    pub fn from_question(position: usize, sourced: &SourcedQuestion) -> Self {
        let q = &sourced.question;
        Self {
            qn_source: q.qn_source.clone(),
            bias_qn_category: q.bias_qn_category.clone(),
            question_number: position,
            question_index: q.eval_qn_num.clone(),
            question_polarity: q.question_polarity.clone(),
            context_condition: q.context_condition.clone(),
            question: q.qn.clone(),
            question_string_length: q.qn.chars().count(),
        }
    }
}

/// Rows for every successfully materialized position of a dataset, in
/// position order. Positions holding error markers are left out.
pub fn export_rows(entries: &BTreeMap<usize, MaterializedEntry>) -> Vec<ExportRecord> {
    entries
        .iter()
        .filter_map(|(position, entry)| {
            entry
                .as_question()
                .map(|q| ExportRecord::from_question(*position, q))
        })
        .collect()
}

/// Append one JSON object per line to `path`, creating the file if
/// needed.
pub fn append_jsonl<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AnalyzerError::io(path, e))?;
    for row in rows {
        let line = serde_json::to_string(row)?;
        writeln!(file, "{}", line).map_err(|e| AnalyzerError::io(path, e))?;
    }
    Ok(())
}

/// Build the classification output object: the question first, then the
/// raw classifier response fields in their original order.
pub fn classification_row(question: &str, raw: &Value) -> Value {
    let mut row = Map::new();
    row.insert(
        "eval_question".to_string(),
        Value::String(question.to_string()),
    );
    if let Some(fields) = raw.as_object() {
        for (key, value) in fields {
            row.insert(key.clone(), value.clone());
        }
    }
    Value::Object(row)
}
