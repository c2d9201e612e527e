//! Eval Question Analyzer CLI
//!
//! Reads bias/fairness evaluation question datasets, normalizes them,
//! and submits them to an LLM classifier.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eval_question_analyzer::{
    classifier::QuestionClassifier,
    config::Config,
    dataset::{DatasetReader, SourceRegistry},
    export,
    sink::{RecordSink, RedbRecordSink},
};
use log::{error, info, warn};
use std::path::PathBuf;

/// Eval Question Analyzer - dataset normalization and bias classification
#[derive(Parser)]
#[command(name = "eval-analyzer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered dataset sources
    Sources,

    /// Count the lines of a dataset source
    Count {
        /// Source key (e.g., "age", "gender", "diverse")
        source: String,
    },

    /// Print the nth normalized question of a source
    Get {
        /// Source key
        source: String,

        /// 1-based record number
        number: usize,
    },

    /// Materialize a whole source and export it as JSONL
    Export {
        /// Source key
        source: String,

        /// Output path for the exported rows
        #[arg(short, long, default_value = "eval_questions_export.jsonl")]
        output: PathBuf,
    },

    /// Materialize a whole source into the record store
    Load {
        /// Source key
        source: String,

        /// Path to the record store database
        #[arg(long, default_value = "data/eval_questions.redb")]
        db: PathBuf,
    },

    /// Query the record store for matching records
    Query {
        /// Table name (a previously loaded source key)
        table: String,

        /// Field to match on
        field: String,

        /// Value the field must equal
        value: String,

        /// Path to the record store database
        #[arg(long, default_value = "data/eval_questions.redb")]
        db: PathBuf,
    },

    /// Classify every question of a source via the LLM endpoint
    Classify {
        /// Source key
        source: String,

        /// Output path for classification results (appended)
        #[arg(short, long, default_value = "classified_eval_questions.jsonl")]
        output: PathBuf,

        /// Stop after this many questions
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Test LLM connection
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sources => cmd_sources(),
        Commands::Count { source } => cmd_count(source),
        Commands::Get { source, number } => cmd_get(source, number),
        Commands::Export { source, output } => cmd_export(source, output),
        Commands::Load { source, db } => cmd_load(source, db),
        Commands::Query {
            table,
            field,
            value,
            db,
        } => cmd_query(table, field, value, db),
        Commands::Classify {
            source,
            output,
            limit,
        } => cmd_classify(source, output, limit).await,
        Commands::Test => cmd_test().await,
    }
}

fn dataset_reader() -> Result<DatasetReader> {
    let config = Config::load().context("Failed to load configuration")?;
    Ok(DatasetReader::new(SourceRegistry::new(config.data_dir)))
}

fn cmd_sources() -> Result<()> {
    for key in SourceRegistry::keys() {
        println!("{}", key);
    }
    Ok(())
}

fn cmd_count(source: String) -> Result<()> {
    let reader = dataset_reader()?;
    let total = reader.count_lines(&source)?;
    println!("{} lines in source '{}'", total, source);
    Ok(())
}

fn cmd_get(source: String, number: usize) -> Result<()> {
    let reader = dataset_reader()?;
    match reader.nth_question(&source, number)? {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        None => {
            println!("No record found.");
        }
    }
    Ok(())
}

fn cmd_export(source: String, output: PathBuf) -> Result<()> {
    let reader = dataset_reader()?;
    let entries = reader.read_whole_file(&source)?;
    let rows = export::export_rows(&entries);
    let skipped = entries.len() - rows.len();

    export::append_jsonl(&output, &rows).context("Failed to write export file")?;

    println!(
        "Exported {} questions from '{}' to {}",
        rows.len(),
        source,
        output.display()
    );
    if skipped > 0 {
        warn!("{} positions had no parseable question and were skipped", skipped);
    }
    Ok(())
}

fn cmd_load(source: String, db: PathBuf) -> Result<()> {
    let reader = dataset_reader()?;
    let entries = reader.read_whole_file(&source)?;

    let records: Vec<serde_json::Value> = entries
        .values()
        .filter_map(|entry| entry.as_question())
        .map(|sourced| serde_json::to_value(&sourced.question))
        .collect::<std::result::Result<_, _>>()?;

    let sink = RedbRecordSink::open(&db).context("Failed to open record store")?;
    sink.initialize(&source)?;
    let inserted = sink.insert(&source, &records)?;

    println!(
        "Inserted {} of {} records into table '{}' ({})",
        inserted,
        entries.len(),
        source,
        db.display()
    );
    Ok(())
}

fn cmd_query(table: String, field: String, value: String, db: PathBuf) -> Result<()> {
    let sink = RedbRecordSink::open(&db).context("Failed to open record store")?;
    let matches = sink.query(&table, &field, &serde_json::Value::String(value))?;

    for record in &matches {
        println!("{}", serde_json::to_string(record)?);
    }
    println!("{} matching records", matches.len());
    Ok(())
}

async fn cmd_classify(source: String, output: PathBuf, limit: Option<usize>) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    config.validate_llm().context("Invalid configuration")?;

    let reader = DatasetReader::new(SourceRegistry::new(config.data_dir.clone()));
    let classifier = QuestionClassifier::from_config(config.llm.clone());

    let total = reader.count_lines(&source)?;
    info!("Number of lines in '{}' file: {}", source, total);
    let last = limit.map_or(total, |l| l.min(total));

    let mut classified = 0usize;
    for number in 1..=last {
        let record = match reader.nth_question(&source, number)? {
            Some(record) => record,
            None => continue,
        };
        let question = &record.question.qn;

        // One failed question never aborts the batch.
        match classifier.classify(question).await {
            Ok((verdict, raw)) => {
                info!(
                    "[{}/{}] is_bias_eval={} category={:?}",
                    number, last, verdict.is_bias_eval, verdict.category
                );
                let row = export::classification_row(question, &raw);
                export::append_jsonl(&output, &[row])
                    .context("Failed to append classification output")?;
                classified += 1;
            }
            Err(e) => {
                error!("Failed to analyze question {}: {}", number, e);
            }
        }
    }

    println!(
        "Classified {} of {} questions from '{}'; results in {}",
        classified,
        last,
        source,
        output.display()
    );
    Ok(())
}

async fn cmd_test() -> Result<()> {
    println!("Testing LLM connection...\n");

    let config = Config::load().context("Failed to load configuration")?;

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!(
        "  API Key:   {}...",
        &config.llm.api_key[..config.llm.api_key.len().min(8)]
    );
    println!();

    if let Err(e) = config.validate_llm() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = eval_question_analyzer::LlmClient::new(config.llm);

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => {
            println!("Connection successful!");
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}
