//! Dataset metadata operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::Dataset;

impl Database {
    /// Record a new dataset
    pub fn insert_dataset(
        &self,
        dataset_id: &str,
        source_name: Option<&str>,
        rows_ingested: i64,
        warnings_count: i64,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO datasets (dataset_id, source_name, rows_ingested, warnings_count)
            VALUES (?, ?, ?, ?)
            "#,
            params![dataset_id, source_name, rows_ingested, warnings_count],
        )?;
        Ok(())
    }

    /// Check whether a dataset id is known
    pub fn dataset_exists(&self, dataset_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let row: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM datasets WHERE dataset_id = ? LIMIT 1",
                params![dataset_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(row.is_some())
    }

    /// List all datasets, newest first
    pub fn list_datasets(&self) -> Result<Vec<Dataset>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT dataset_id, source_name, created_at, rows_ingested, warnings_count
            FROM datasets
            ORDER BY created_at DESC, dataset_id
            "#,
        )?;

        let datasets = stmt
            .query_map([], |row| {
                Ok(Dataset {
                    dataset_id: row.get(0)?,
                    source_name: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                    rows_ingested: row.get(3)?,
                    warnings_count: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(datasets)
    }

    /// Number of stored transactions for a dataset
    pub fn count_transactions(&self, dataset_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE dataset_id = ?",
            params![dataset_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
