//! CSV import for bank transaction exports
//!
//! Banks disagree on header names, date formats, and amount conventions, so
//! columns are resolved through alias lists and every amount is normalized to
//! signed integer cents. Bad rows become warnings rather than failing the
//! whole import; an import with zero valid rows is an error.

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{NormalizedTransaction, TransactionType, UploadResult};

const DATE_ALIASES: &[&str] = &["date", "transaction_date", "posted_at", "posted_date"];
const MERCHANT_ALIASES: &[&str] = &["merchant", "payee", "vendor", "name"];
const DESCRIPTION_ALIASES: &[&str] = &["description", "memo", "note", "details"];
const AMOUNT_ALIASES: &[&str] = &["amount", "transaction_amount", "value"];
const DEBIT_ALIASES: &[&str] = &["debit", "withdrawal", "outflow"];
const CREDIT_ALIASES: &[&str] = &["credit", "deposit", "inflow"];
const TYPE_ALIASES: &[&str] = &["type", "transaction_type", "direction"];
const CURRENCY_ALIASES: &[&str] = &["currency", "ccy"];

/// Type-hint values that force an amount negative
const EXPENSE_TYPES: &[&str] = &["expense", "debit", "outflow", "purchase"];
/// Type-hint values that force an amount positive
const INCOME_TYPES: &[&str] = &["income", "credit", "inflow", "deposit"];

const SUPPORTED_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Parse raw CSV text into normalized transactions plus row-level warnings
pub fn parse_csv_text(csv_text: &str) -> Result<(Vec<NormalizedTransaction>, Vec<String>)> {
    if csv_text.trim().is_empty() {
        return Err(Error::Import("CSV payload is empty".into()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(Error::Import("CSV is missing header row".into()));
    }

    let resolve = |aliases: &[&str]| -> Option<usize> {
        aliases.iter().find_map(|alias| {
            headers
                .iter()
                .position(|name| name.trim().to_lowercase() == *alias)
        })
    };

    let date_col = resolve(DATE_ALIASES);
    let merchant_col = resolve(MERCHANT_ALIASES);
    let desc_col = resolve(DESCRIPTION_ALIASES);
    let amount_col = resolve(AMOUNT_ALIASES);
    let debit_col = resolve(DEBIT_ALIASES);
    let credit_col = resolve(CREDIT_ALIASES);
    let type_col = resolve(TYPE_ALIASES);
    let currency_col = resolve(CURRENCY_ALIASES);

    let Some(date_col) = date_col else {
        return Err(Error::Import("Missing required date column".into()));
    };
    if merchant_col.is_none() && desc_col.is_none() {
        return Err(Error::Import(
            "Missing required merchant column (or description alias)".into(),
        ));
    }
    if amount_col.is_none() && !(debit_col.is_some() && credit_col.is_some()) {
        return Err(Error::Import(
            "Missing amount column (or debit+credit columns)".into(),
        ));
    }

    let mut warnings: Vec<String> = Vec::new();
    let mut transactions: Vec<NormalizedTransaction> = Vec::new();

    // Row 1 is the header, so data rows are numbered from 2
    for (idx, record) in reader.records().enumerate() {
        let row_number = idx as i64 + 2;
        let record = record?;

        let parsed = (|| -> std::result::Result<NormalizedTransaction, String> {
            let txn_date = parse_date(cell(&record, Some(date_col)), row_number)?;

            let mut merchant = cell(&record, merchant_col).to_string();
            let description = cell(&record, desc_col).to_string();
            if merchant.is_empty() {
                merchant = description.clone();
            }
            if merchant.is_empty() {
                return Err(format!("row {}: merchant/description is required", row_number));
            }

            let mut amount_cents = match amount_col {
                Some(col) => parse_amount_to_cents(cell(&record, Some(col)), row_number, false)?,
                None => {
                    let debit = parse_amount_to_cents(cell(&record, debit_col), row_number, true)?;
                    let credit =
                        parse_amount_to_cents(cell(&record, credit_col), row_number, true)?;
                    credit - debit
                }
            };

            let type_hint = cell(&record, type_col).to_lowercase();
            if EXPENSE_TYPES.contains(&type_hint.as_str()) && amount_cents > 0 {
                amount_cents = -amount_cents;
            } else if INCOME_TYPES.contains(&type_hint.as_str()) && amount_cents < 0 {
                amount_cents = amount_cents.abs();
            }

            let currency = match cell(&record, currency_col) {
                "" => "USD".to_string(),
                c => c.to_uppercase(),
            };

            Ok(NormalizedTransaction {
                row_number,
                txn_date,
                merchant,
                description,
                amount_cents,
                currency,
                transaction_type: TransactionType::from_amount_cents(amount_cents),
                raw: record_to_json(&headers, &record),
            })
        })();

        match parsed {
            Ok(txn) => transactions.push(txn),
            Err(warning) => warnings.push(warning),
        }
    }

    if transactions.is_empty() {
        let preview = warnings
            .iter()
            .take(5)
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::Import(format!("No valid rows found. {}", preview)));
    }

    Ok((transactions, warnings))
}

/// Parse CSV text and store it as a new immutable dataset
pub fn upload_transactions(
    db: &Database,
    csv_text: &str,
    source_name: Option<&str>,
) -> Result<UploadResult> {
    let (transactions, warnings) = parse_csv_text(csv_text)?;

    let dataset_id = Uuid::new_v4().to_string();
    db.insert_dataset(
        &dataset_id,
        source_name,
        transactions.len() as i64,
        warnings.len() as i64,
    )?;
    db.insert_transactions(&dataset_id, &transactions)?;

    debug!(
        dataset_id = %dataset_id,
        rows = transactions.len(),
        warnings = warnings.len(),
        "Stored dataset"
    );

    Ok(UploadResult {
        dataset_id,
        rows_ingested: transactions.len(),
        warnings,
    })
}

fn cell<'r>(record: &'r csv::StringRecord, col: Option<usize>) -> &'r str {
    col.and_then(|i| record.get(i)).unwrap_or("").trim()
}

fn parse_date(value: &str, row_number: i64) -> std::result::Result<NaiveDate, String> {
    if value.is_empty() {
        return Err(format!("row {}: date is required", row_number));
    }
    for format in SUPPORTED_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }
    Err(format!(
        "row {}: unsupported date format '{}'",
        row_number, value
    ))
}

/// Parse an amount string into signed integer cents, rounding half-up at the
/// second decimal place. Accepts `$`, thousands commas, parenthesized
/// negatives, and a leading sign. Never goes through floating point.
fn parse_amount_to_cents(
    value: &str,
    row_number: i64,
    allow_empty: bool,
) -> std::result::Result<i64, String> {
    let mut cleaned = value.trim().to_string();
    if cleaned.is_empty() {
        if allow_empty {
            return Ok(0);
        }
        return Err(format!("row {}: amount is required", row_number));
    }

    let mut negative = false;
    if cleaned.starts_with('(') && cleaned.ends_with(')') {
        negative = true;
        cleaned = cleaned[1..cleaned.len() - 1].to_string();
    }

    cleaned = cleaned.replace('$', "").replace(',', "");
    let mut cleaned = cleaned.trim();
    if let Some(stripped) = cleaned.strip_prefix('-') {
        negative = true;
        cleaned = stripped;
    } else if let Some(stripped) = cleaned.strip_prefix('+') {
        cleaned = stripped;
    }

    let invalid = || format!("row {}: invalid amount '{}'", row_number, value);

    let (int_part, frac_part) = match cleaned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (cleaned, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| invalid())?
    };

    let digit = |i: usize| frac_part[i..i + 1].parse::<i64>().unwrap_or(0);
    let mut cents = whole * 100;
    if !frac_part.is_empty() {
        cents += digit(0) * 10;
    }
    if frac_part.len() >= 2 {
        cents += digit(1);
    }
    // Half-up at the cent boundary: a third fractional digit of 5+ rounds
    // the magnitude away from zero.
    if frac_part.len() >= 3 && digit(2) >= 5 {
        cents += 1;
    }

    Ok(if negative { -cents } else { cents })
}

/// Snapshot a CSV record as a JSON object using headers as keys
fn record_to_json(headers: &csv::StringRecord, record: &csv::StringRecord) -> Value {
    let mut map = serde_json::Map::new();
    for (i, header) in headers.iter().enumerate() {
        if let Some(value) = record.get(i) {
            map.insert(header.to_string(), Value::String(value.trim().to_string()));
        }
    }
    json!(map)
}
