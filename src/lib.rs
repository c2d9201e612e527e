//! Eval Question Analyzer - dataset normalization and bias classification
//! for LLM evaluation questions.
//!
//! This library reads heterogeneous JSONL datasets of bias/fairness
//! evaluation questions, normalizes them into one canonical record shape,
//! optionally persists them to a queryable store, and submits them to an
//! OpenAI-compatible classification endpoint whose structured response is
//! validated against a closed schema.
//!
//! # Overview
//!
//! The dataset layer is the heart of the crate:
//! 1. A closed source registry resolves short keys (`age`, `diverse`,
//!    `beats_eval_v1`, ...) to physical files and native field layouts
//! 2. Files are decoded under a sequence of candidate encodings
//! 3. Each line is parsed as JSON; malformed lines are skipped, never fatal
//! 4. A per-source shape family maps native fields onto the canonical
//!    evaluation-question record
//! 5. Records are addressed by stable 1-based ordinals without loading a
//!    whole file into memory
//!
//! # Quick Start
//!
//! ```no_run
//! use eval_question_analyzer::{
//!     classifier::QuestionClassifier,
//!     config::Config,
//!     dataset::{DatasetReader, SourceRegistry},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!
//!     let reader = DatasetReader::new(SourceRegistry::new(&config.data_dir));
//!     let total = reader.count_lines("gender")?;
//!     println!("{} lines in the gender dataset", total);
//!
//!     if let Some(record) = reader.nth_question("gender", 4)? {
//!         config.validate_llm()?;
//!         let classifier = QuestionClassifier::from_config(config.llm.clone());
//!         let (verdict, _raw) = classifier.classify(&record.question.qn).await?;
//!         println!("bias eval: {}", verdict.is_bias_eval);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **dataset**: registry, multi-encoding line decoding, per-line JSON
//!   parsing, shape-family normalization, 1-based random access
//! - **classifier**: OpenAI-compatible client with strict structured output
//! - **sink**: pluggable record store backed by `redb`
//! - **export**: JSONL writers for downstream batch tooling

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod sink;

// Re-export commonly used types
pub use classifier::{BiasCategory, LlmClient, QuestionClassification, QuestionClassifier};
pub use config::Config;
pub use dataset::{DatasetReader, EvalQuestion, MaterializedEntry, SourceRegistry, SourcedQuestion};
pub use error::{AnalyzerError, Result};
pub use sink::{RecordSink, RedbRecordSink};
