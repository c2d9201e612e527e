//! Pluggable record sink backed by an embedded key/value store.
//!
//! Normalized records are stored as JSON bytes under a monotonically
//! increasing ordinal, one `redb` table per logical table name. The sink
//! mirrors the batch partial-failure policy: an individually malformed
//! record is logged and skipped, never aborting the insert.

use crate::error::{AnalyzerError, Result};
use log::warn;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use serde_json::Value;
use std::path::Path;

/// Next-ordinal bookkeeping, one entry per logical table.
const ORDINALS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("__ordinals");

/// Destination for normalized records.
pub trait RecordSink {
    /// Create the table if it does not exist.
    fn initialize(&self, table: &str) -> Result<()>;

    /// Insert records in order, skipping and logging individually
    /// malformed ones. Returns the number actually inserted.
    fn insert(&self, table: &str, records: &[Value]) -> Result<usize>;

    /// All records whose `field` equals `value`.
    fn query(&self, table: &str, field: &str, value: &Value) -> Result<Vec<Value>>;

    /// Remove all records, optionally restarting the ordinal sequence.
    fn clear(&self, table: &str, reset_ordinal: bool) -> Result<()>;
}

/// `redb`-backed record sink.
pub struct RedbRecordSink {
    db: Database,
}

fn is_valid_identifier(name: &str) -> bool {
    // "__" prefix is reserved for internal tables.
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_identifier(name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(AnalyzerError::InvalidIdentifier(name.to_string()))
    }
}

fn storage_err(e: impl std::fmt::Display) -> AnalyzerError {
    AnalyzerError::Storage(e.to_string())
}

impl RedbRecordSink {
    /// Open or create a database file at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path.as_ref())
            .map_err(|e| AnalyzerError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    fn records_table(name: &str) -> TableDefinition<'_, u64, &'static [u8]> {
        TableDefinition::new(name)
    }
}

impl RecordSink for RedbRecordSink {
    fn initialize(&self, table: &str) -> Result<()> {
        check_identifier(table)?;
        let txn = self.db.begin_write().map_err(storage_err)?;
        txn.open_table(Self::records_table(table))
            .map_err(storage_err)?;
        txn.open_table(ORDINALS_TABLE).map_err(storage_err)?;
        txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn insert(&self, table: &str, records: &[Value]) -> Result<usize> {
        check_identifier(table)?;
        let txn = self.db.begin_write().map_err(storage_err)?;
        let mut inserted = 0;
        {
            let mut ordinals = txn.open_table(ORDINALS_TABLE).map_err(storage_err)?;
            let mut records_table = txn
                .open_table(Self::records_table(table))
                .map_err(storage_err)?;
            let mut next = ordinals
                .get(table)
                .map_err(storage_err)?
                .map(|guard| guard.value())
                .unwrap_or(1);

            for record in records {
                if !record.is_object() {
                    warn!("Skipping malformed record (not a JSON object): {}", record);
                    continue;
                }
                let bytes = serde_json::to_vec(record)?;
                records_table
                    .insert(next, bytes.as_slice())
                    .map_err(storage_err)?;
                next += 1;
                inserted += 1;
            }

            ordinals.insert(table, next).map_err(storage_err)?;
        }
        txn.commit().map_err(storage_err)?;
        Ok(inserted)
    }

    fn query(&self, table: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        check_identifier(table)?;
        check_identifier(field)?;
        let txn = self.db.begin_read().map_err(storage_err)?;
        let records_table = match txn.open_table(Self::records_table(table)) {
            Ok(t) => t,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(storage_err(e)),
        };

        let mut matches = Vec::new();
        for entry in records_table.iter().map_err(storage_err)? {
            let (_, bytes) = entry.map_err(storage_err)?;
            let record: Value = serde_json::from_slice(bytes.value())?;
            if record.get(field) == Some(value) {
                matches.push(record);
            }
        }
        Ok(matches)
    }

    fn clear(&self, table: &str, reset_ordinal: bool) -> Result<()> {
        check_identifier(table)?;
        let txn = self.db.begin_write().map_err(storage_err)?;
        txn.delete_table(Self::records_table(table))
            .map_err(storage_err)?;
        if reset_ordinal {
            let mut ordinals = txn.open_table(ORDINALS_TABLE).map_err(storage_err)?;
            ordinals.remove(table).map_err(storage_err)?;
        }
        txn.commit().map_err(storage_err)?;
        Ok(())
    }
}
