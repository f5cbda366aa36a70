//! Server command implementation

use std::sync::Arc;

use anyhow::Result;

use sift_core::{Config, SummaryBackend, SummaryClient};
use sift_server::AppState;

use super::open_db;

pub async fn cmd_serve(config: &Config, host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting Sift server...");
    println!("   Database: {}", config.db_path.display());
    if let Some(taxonomy) = config.taxonomy_path() {
        println!("   Taxonomy: {}", taxonomy.display());
    }
    println!("   Listening: http://{}:{}", host, port);

    let db = open_db(config)?;

    let summarizer = SummaryClient::from_env();
    match &summarizer {
        Some(client) => println!(
            "   🤖 Summary backend: {} (model: {})",
            client.host(),
            client.model()
        ),
        None => println!("   ℹ️  Summary backend not configured (set OPENAI_API_KEY to enable)"),
    }

    let state = Arc::new(AppState {
        db,
        taxonomy_path: config.taxonomy_path.clone(),
        summarizer,
    });

    sift_server::serve(state, host, port).await
}
