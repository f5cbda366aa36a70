//! Transaction storage and dataset queries

use rusqlite::params;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{MerchantSummary, NormalizedTransaction, Transaction};

impl Database {
    /// Insert a batch of normalized transactions for a dataset.
    /// All rows land in one SQLite transaction.
    pub fn insert_transactions(
        &self,
        dataset_id: &str,
        transactions: &[NormalizedTransaction],
    ) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO transactions (
                    dataset_id, row_number, txn_date, merchant, description,
                    amount_cents, currency, transaction_type, raw_json
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )?;
            for txn in transactions {
                stmt.execute(params![
                    dataset_id,
                    txn.row_number,
                    txn.txn_date.to_string(),
                    txn.merchant,
                    txn.description,
                    txn.amount_cents,
                    txn.currency,
                    txn.transaction_type.as_str(),
                    serde_json::to_string(&txn.raw)?,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Fetch a dataset's transactions, optionally filtered to one month,
    /// ordered by date descending then insertion descending.
    pub fn fetch_transactions(
        &self,
        dataset_id: &str,
        month: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut query = String::from(
            r#"
            SELECT txn_date, merchant, description, amount_cents, currency, transaction_type
            FROM transactions
            WHERE dataset_id = ?
            "#,
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(dataset_id.to_string())];
        if let Some(m) = month {
            query.push_str(" AND substr(txn_date, 1, 7) = ?");
            params.push(Box::new(m.to_string()));
        }
        query.push_str(" ORDER BY txn_date DESC, id DESC");

        let mut stmt = conn.prepare(&query)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(
                |(txn_date, merchant, description, amount_cents, currency, transaction_type)| {
                    Ok(Transaction {
                        txn_date: txn_date
                            .parse()
                            .map_err(|_| Error::InvalidData(format!("Bad date: {}", txn_date)))?,
                        merchant,
                        description: description.unwrap_or_default(),
                        amount_cents,
                        currency,
                        transaction_type: transaction_type
                            .parse()
                            .map_err(Error::InvalidData)?,
                    })
                },
            )
            .collect()
    }

    /// Rank merchants by total expense spend, optionally within one month
    pub fn fetch_top_merchants(
        &self,
        dataset_id: &str,
        month: Option<&str>,
        limit: i64,
    ) -> Result<Vec<MerchantSummary>> {
        let conn = self.conn()?;

        let mut query = String::from(
            r#"
            SELECT merchant, currency, SUM(ABS(amount_cents)) AS spend_cents, COUNT(*) AS txn_count
            FROM transactions
            WHERE dataset_id = ? AND amount_cents < 0
            "#,
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(dataset_id.to_string())];
        if let Some(m) = month {
            query.push_str(" AND substr(txn_date, 1, 7) = ?");
            params.push(Box::new(m.to_string()));
        }
        query.push_str(
            r#"
            GROUP BY merchant, currency
            ORDER BY spend_cents DESC
            LIMIT ?
            "#,
        );
        params.push(Box::new(limit));

        let mut stmt = conn.prepare(&query)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let merchants = stmt
            .query_map(params_refs.as_slice(), |row| {
                let spend_cents: i64 = row.get(2)?;
                Ok(MerchantSummary {
                    merchant: row.get(0)?,
                    currency: row.get(1)?,
                    total_spend: (spend_cents as f64 / 100.0 * 100.0).round() / 100.0,
                    transactions_count: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(merchants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use chrono::NaiveDate;

    fn txn(row_number: i64, date: &str, merchant: &str, amount_cents: i64) -> NormalizedTransaction {
        NormalizedTransaction {
            row_number,
            txn_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            merchant: merchant.to_string(),
            description: String::new(),
            amount_cents,
            currency: "USD".to_string(),
            transaction_type: TransactionType::from_amount_cents(amount_cents),
            raw: serde_json::json!({"merchant": merchant}),
        }
    }

    fn seeded_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.insert_dataset("ds-1", None, 4, 0).unwrap();
        db.insert_transactions(
            "ds-1",
            &[
                txn(2, "2026-01-03", "Whole Foods", -12845),
                txn(3, "2026-01-07", "Employer", 320000),
                txn(4, "2026-01-09", "Netflix", -1999),
                txn(5, "2025-12-15", "Shell", -5420),
            ],
        )
        .unwrap();
        db
    }

    #[test]
    fn test_fetch_ordered_date_desc_then_insertion_desc() {
        let db = seeded_db();
        let rows = db.fetch_transactions("ds-1", None).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].merchant, "Netflix");
        assert_eq!(rows[1].merchant, "Employer");
        assert_eq!(rows[2].merchant, "Whole Foods");
        assert_eq!(rows[3].merchant, "Shell");
        assert_eq!(rows[0].transaction_type, TransactionType::Expense);
        assert_eq!(rows[1].transaction_type, TransactionType::Income);
    }

    #[test]
    fn test_fetch_month_filter() {
        let db = seeded_db();
        let rows = db.fetch_transactions("ds-1", Some("2025-12")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].merchant, "Shell");
    }

    #[test]
    fn test_same_day_rows_ordered_by_insertion_desc() {
        let db = Database::in_memory().unwrap();
        db.insert_dataset("ds-1", None, 2, 0).unwrap();
        db.insert_transactions(
            "ds-1",
            &[
                txn(2, "2026-01-05", "First", -100),
                txn(3, "2026-01-05", "Second", -200),
            ],
        )
        .unwrap();
        let rows = db.fetch_transactions("ds-1", None).unwrap();
        assert_eq!(rows[0].merchant, "Second");
        assert_eq!(rows[1].merchant, "First");
    }

    #[test]
    fn test_top_merchants_expenses_only() {
        let db = seeded_db();
        let merchants = db.fetch_top_merchants("ds-1", None, 5).unwrap();
        assert_eq!(merchants.len(), 3);
        assert_eq!(merchants[0].merchant, "Whole Foods");
        assert_eq!(merchants[0].total_spend, 128.45);
        assert_eq!(merchants[0].transactions_count, 1);
        // Income rows never appear
        assert!(merchants.iter().all(|m| m.merchant != "Employer"));
    }

    #[test]
    fn test_top_merchants_limit_and_month() {
        let db = seeded_db();
        let merchants = db.fetch_top_merchants("ds-1", Some("2026-01"), 1).unwrap();
        assert_eq!(merchants.len(), 1);
        assert_eq!(merchants[0].merchant, "Whole Foods");
    }

    #[test]
    fn test_cascade_delete_via_dataset() {
        let db = seeded_db();
        let conn = db.conn().unwrap();
        conn.execute("DELETE FROM datasets WHERE dataset_id = 'ds-1'", [])
            .unwrap();
        let rows = db.fetch_transactions("ds-1", None).unwrap();
        assert!(rows.is_empty());
    }
}
