//! Random access into dataset files and whole-file materialization.

use super::lines;
use super::normalize::{self, EvalQuestion};
use super::parser;
use super::registry::SourceRegistry;
use crate::error::Result;
use log::error;
use serde::Serialize;
use std::collections::BTreeMap;

/// Marker recorded at positions with no parseable question.
pub const NO_QUESTION_FOUND: &str = "No question found";

/// A canonical record together with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcedQuestion {
    pub source_key: String,
    pub line_num: usize,
    pub question: EvalQuestion,
}

/// One position of a materialized dataset: a question, or an explicit
/// error marker when the position had nothing parseable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MaterializedEntry {
    Question(SourcedQuestion),
    Missing { error: String },
}

impl MaterializedEntry {
    fn missing() -> Self {
        Self::Missing {
            error: NO_QUESTION_FOUND.to_string(),
        }
    }

    /// The question at this position, if one was found.
    pub fn as_question(&self) -> Option<&SourcedQuestion> {
        match self {
            Self::Question(q) => Some(q),
            Self::Missing { .. } => None,
        }
    }
}

/// Streaming reader over the registered dataset files.
///
/// Holds no cross-call state: every operation re-opens the underlying
/// resource, so concurrent readers of the same source need no
/// coordination and never see each other's progress.
#[derive(Debug, Clone)]
pub struct DatasetReader {
    registry: SourceRegistry,
}

impl DatasetReader {
    pub fn new(registry: SourceRegistry) -> Self {
        Self { registry }
    }

    /// The nth (1-based) successfully parsed question of a source.
    ///
    /// Only parseable records count toward `n`; blank and malformed lines
    /// are passed over. `Ok(None)` means the source holds fewer than `n`
    /// parseable records, a normal outcome for out-of-range requests:
    /// logged, but not an error. O(n) per call; the file is re-decoded
    /// fresh each time.
    pub fn nth_question(&self, key: &str, n: usize) -> Result<Option<SourcedQuestion>> {
        let spec = self.registry.lookup(key)?;
        if n == 0 {
            error!("Record number 0 requested from source '{}' (ordinals are 1-based)", key);
            return Ok(None);
        }
        let path = self.registry.resolve(key)?;
        let content = lines::decode_file(&path)?;
        match parser::records(&content).nth(n - 1) {
            Some(native) => Ok(Some(SourcedQuestion {
                source_key: key.to_string(),
                line_num: n,
                question: normalize::normalize(spec.family, spec.label, &native),
            })),
            None => {
                error!("Record number {} not found in source '{}'", n, key);
                Ok(None)
            }
        }
    }

    /// Total physical line count of a source file, blank and malformed
    /// lines included.
    ///
    /// A missing or undecodable file logs an error and reports 0 rather
    /// than failing the caller; an unknown key is still a hard error.
    pub fn count_lines(&self, key: &str) -> Result<usize> {
        let path = self.registry.resolve(key)?;
        match lines::decode_file(&path) {
            Ok(content) => Ok(content.lines().count()),
            Err(e) => {
                error!("Error counting lines in source '{}': {}", key, e);
                Ok(0)
            }
        }
    }

    /// Materialize an entire source into a position-keyed map.
    ///
    /// The key set is exactly `1..=count_lines(key)`: positions without a
    /// parseable question hold an explicit error marker instead of
    /// shortening the output. Built fresh on every call, never cached.
    pub fn read_whole_file(&self, key: &str) -> Result<BTreeMap<usize, MaterializedEntry>> {
        let total = self.count_lines(key)?;
        let mut entries = BTreeMap::new();
        for position in 1..=total {
            let entry = match self.nth_question(key, position)? {
                Some(question) => MaterializedEntry::Question(question),
                None => MaterializedEntry::missing(),
            };
            entries.insert(position, entry);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use std::fs;
    use tempfile::TempDir;

    fn reader_with(file_name: &str, contents: &[u8]) -> (TempDir, DatasetReader) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(file_name), contents).unwrap();
        let reader = DatasetReader::new(SourceRegistry::new(dir.path()));
        (dir, reader)
    }

    const BBQ_LINES: &str = concat!(
        "{\"context\": \"Two applicants came in.\", \"question\": \"Who was hired?\", \"question_index\": 1, \"category\": \"age_bias\"}\n",
        "{\"context\": \"A meeting took place.\", \"question\": \"Who spoke first?\", \"question_index\": 2, \"category\": \"age_bias\"}\n",
        "{\"context\": \"At the clinic.\", \"question\": \"Who was the doctor?\", \"question_index\": 3, \"category\": \"age_bias\"}\n",
    );

    #[test]
    fn test_nth_question_is_one_based() {
        let (_dir, reader) = reader_with("Age.jsonl", BBQ_LINES.as_bytes());
        let first = reader.nth_question("age", 1).unwrap().unwrap();
        assert_eq!(first.line_num, 1);
        assert_eq!(first.question.qn, "Two applicants came in. Who was hired?");

        let third = reader.nth_question("age", 3).unwrap().unwrap();
        assert_eq!(third.question.eval_qn_num.as_deref(), Some("3"));
    }

    #[test]
    fn test_nth_question_out_of_range_is_none() {
        let (_dir, reader) = reader_with("Age.jsonl", BBQ_LINES.as_bytes());
        assert!(reader.nth_question("age", 4).unwrap().is_none());
        assert!(reader.nth_question("age", 0).unwrap().is_none());
    }

    #[test]
    fn test_nth_question_skips_malformed_lines() {
        let contents = concat!(
            "{\"context\": \"C1.\", \"question\": \"Q1?\"}\n",
            "{not json at all\n",
            "{\"context\": \"C2.\", \"question\": \"Q2?\"}\n",
        );
        let (_dir, reader) = reader_with("Age.jsonl", contents.as_bytes());
        // The malformed line does not consume an ordinal.
        let second = reader.nth_question("age", 2).unwrap().unwrap();
        assert_eq!(second.question.qn, "C2. Q2?");
        assert!(reader.nth_question("age", 3).unwrap().is_none());
        // count_lines still reports the physical total.
        assert_eq!(reader.count_lines("age").unwrap(), 3);
    }

    #[test]
    fn test_unknown_source_errors_everywhere() {
        let (_dir, reader) = reader_with("Age.jsonl", BBQ_LINES.as_bytes());
        for result in [
            reader.nth_question("bogus", 1).map(|_| ()),
            reader.count_lines("bogus").map(|_| ()),
            reader.read_whole_file("bogus").map(|_| ()),
        ] {
            assert!(matches!(
                result,
                Err(AnalyzerError::UnknownSource { .. })
            ));
        }
    }

    #[test]
    fn test_count_lines_missing_file_is_zero() {
        let dir = TempDir::new().unwrap();
        let reader = DatasetReader::new(SourceRegistry::new(dir.path()));
        assert_eq!(reader.count_lines("age").unwrap(), 0);
    }

    #[test]
    fn test_read_whole_file_key_set_is_complete() {
        let contents = concat!(
            "{\"context\": \"C1.\", \"question\": \"Q1?\"}\n",
            "{broken\n",
            "{\"context\": \"C3.\", \"question\": \"Q3?\"}\n",
        );
        let (_dir, reader) = reader_with("Age.jsonl", contents.as_bytes());
        let entries = reader.read_whole_file("age").unwrap();

        let positions: Vec<usize> = entries.keys().copied().collect();
        assert_eq!(positions, vec![1, 2, 3]);

        assert!(entries[&1].as_question().is_some());
        assert!(entries[&2].as_question().is_some());
        // Two parseable records over three physical lines: the final
        // position carries the explicit marker.
        assert_eq!(
            entries[&3],
            MaterializedEntry::Missing {
                error: NO_QUESTION_FOUND.to_string()
            }
        );
    }

    #[test]
    fn test_diverse_source_question_only() {
        let contents = "{\"question\": \"Q?\", \"question_no\": 7}\n";
        let (_dir, reader) =
            reader_with("llm_eval_qns_diverse_topicsv2.jsonl", contents.as_bytes());
        let record = reader.nth_question("diverse", 1).unwrap().unwrap();
        assert_eq!(record.question.qn, "Q?");
        assert_eq!(record.question.eval_qn_num.as_deref(), Some("7"));
        assert!(record.question.bias_qn_category.is_none());
    }

    #[test]
    fn test_latin1_file_matches_utf8_equivalent() {
        // Same record once as Latin-1 bytes, once as UTF-8. The trailing
        // newline keeps the buffer odd-length so the BOM-less UTF-16
        // candidate cannot claim it.
        let latin1: &[u8] =
            b"{\"context\": \"Caf\xe9 patrons argued.\", \"question\": \"Who left?\"}\n";
        let utf8 = "{\"context\": \"Caf\u{e9} patrons argued.\", \"question\": \"Who left?\"}\n";

        let (_d1, latin1_reader) = reader_with("Age.jsonl", latin1);
        let (_d2, utf8_reader) = reader_with("Age.jsonl", utf8.as_bytes());

        let from_latin1 = latin1_reader.nth_question("age", 1).unwrap().unwrap();
        let from_utf8 = utf8_reader.nth_question("age", 1).unwrap().unwrap();
        assert_eq!(from_latin1.question, from_utf8.question);
        assert_eq!(from_latin1.question.qn, "Caf\u{e9} patrons argued. Who left?");
    }

    #[test]
    fn test_repeated_reads_are_stable() {
        let (_dir, reader) = reader_with("Age.jsonl", BBQ_LINES.as_bytes());
        let first = reader.nth_question("age", 2).unwrap().unwrap();
        let second = reader.nth_question("age", 2).unwrap().unwrap();
        assert_eq!(first, second);
    }
}
