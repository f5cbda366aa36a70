//! Integration tests for sift-core
//!
//! These tests exercise the full import → store → report → suggest workflow.

use sift_core::{
    generate_monthly_report, generate_top_merchants, models::AnomalyFinding,
    upload_transactions, CategorizationEngine, Database, SuggestionGenerator, SummaryClient,
};

/// One month of activity with a clear category mix plus a paycheck
fn single_month_csv() -> &'static str {
    "date,merchant,amount,currency\n\
     2026-01-03,Whole Foods,-128.45,USD\n\
     2026-01-07,Employer,3200.00,USD\n\
     2026-01-09,Netflix,-19.99,USD\n\
     2026-01-15,Shell,-54.20,USD\n"
}

/// Three months of Netflix charges at a fixed price, plus January noise
fn recurring_csv() -> &'static str {
    "date,merchant,amount\n\
     2025-11-05,Netflix,-19.99\n\
     2025-12-05,Netflix,-19.99\n\
     2026-01-05,Netflix,-19.99\n\
     2026-01-03,Whole Foods,-128.45\n\
     2026-01-15,Shell,-54.20\n"
}

#[test]
fn test_upload_then_report() {
    let db = Database::in_memory().unwrap();
    let upload = upload_transactions(&db, single_month_csv(), Some("checking")).unwrap();
    assert_eq!(upload.rows_ingested, 4);
    assert!(upload.warnings.is_empty());

    let engine = CategorizationEngine::with_defaults();
    let report =
        generate_monthly_report(&db, &engine, &upload.dataset_id, Some("2026-01")).unwrap();

    assert_eq!(report.total_spent, 202.64);
    assert_eq!(report.total_income, 3200.00);
    assert_eq!(report.net_balance, 2997.36);
    assert_eq!(report.rows_analyzed, 4);

    let categories: Vec<&str> = report
        .category_breakdown
        .iter()
        .map(|c| c.category.as_str())
        .collect();
    assert_eq!(categories, vec!["grocery", "transport", "subscriptions"]);
}

#[test]
fn test_upload_then_top_merchants() {
    let db = Database::in_memory().unwrap();
    let upload = upload_transactions(&db, single_month_csv(), None).unwrap();

    let report = generate_top_merchants(&db, &upload.dataset_id, Some("2026-01"), 5).unwrap();
    assert_eq!(report.top_merchants[0].merchant, "Whole Foods");
    assert_eq!(report.top_merchants[0].total_spend, 128.45);
    assert_eq!(report.top_merchants.len(), 3);
}

#[tokio::test]
async fn test_upload_then_suggestions_with_recurring_charge() {
    let db = Database::in_memory().unwrap();
    let upload = upload_transactions(&db, recurring_csv(), None).unwrap();

    let rows = db.fetch_transactions(&upload.dataset_id, None).unwrap();
    let engine = CategorizationEngine::with_defaults();
    let set = SuggestionGenerator::new(&engine)
        .generate(&rows, None, 5, None)
        .await
        .unwrap();

    assert_eq!(set.suggestions.len(), 5);
    assert!(set
        .suggestions
        .iter()
        .any(|s| s.title == "Audit recurring charge: Netflix"));

    let recurring = set
        .anomalies
        .iter()
        .find_map(|f| match f {
            AnomalyFinding::PossibleRecurringSubscription {
                merchant,
                months_detected,
                average_monthly_amount,
                ..
            } => Some((merchant.clone(), *months_detected, *average_monthly_amount)),
            _ => None,
        })
        .expect("recurring subscription finding");
    assert_eq!(recurring, ("Netflix".to_string(), 3, 19.99));
}

#[tokio::test]
async fn test_suggestions_idempotent_over_stored_data() {
    let db = Database::in_memory().unwrap();
    let upload = upload_transactions(&db, recurring_csv(), None).unwrap();
    let engine = CategorizationEngine::with_defaults();
    let generator = SuggestionGenerator::new(&engine);

    let rows = db.fetch_transactions(&upload.dataset_id, None).unwrap();
    let first = generator.generate(&rows, None, 5, None).await.unwrap();
    let rows = db.fetch_transactions(&upload.dataset_id, None).unwrap();
    let second = generator.generate(&rows, None, 5, None).await.unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_month_filter_scopes_suggestions() {
    let db = Database::in_memory().unwrap();
    let upload = upload_transactions(&db, recurring_csv(), None).unwrap();

    // Only January rows: the recurring pattern is invisible in a single month
    let rows = db
        .fetch_transactions(&upload.dataset_id, Some("2026-01"))
        .unwrap();
    let engine = CategorizationEngine::with_defaults();
    let set = SuggestionGenerator::new(&engine)
        .generate(&rows, Some("2026-01"), 3, None)
        .await
        .unwrap();

    assert_eq!(set.suggestions.len(), 3);
    assert!(!set
        .anomalies
        .iter()
        .any(|f| matches!(f, AnomalyFinding::PossibleRecurringSubscription { .. })));
}

#[tokio::test]
async fn test_summary_enrichment_via_mock_backend() {
    let db = Database::in_memory().unwrap();
    let upload = upload_transactions(&db, single_month_csv(), None).unwrap();
    let rows = db.fetch_transactions(&upload.dataset_id, None).unwrap();

    let engine = CategorizationEngine::with_defaults();
    let client = SummaryClient::mock();
    let set = SuggestionGenerator::new(&engine)
        .generate(&rows, Some("2026-01"), 3, Some(&client))
        .await
        .unwrap();
    assert!(set.summary.is_some());

    let failing = SummaryClient::failing_mock();
    let set = SuggestionGenerator::new(&engine)
        .generate(&rows, Some("2026-01"), 3, Some(&failing))
        .await
        .unwrap();
    assert!(set.summary.is_none());
}
