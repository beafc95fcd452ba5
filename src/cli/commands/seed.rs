use anyhow::Context;
use serde_json::json;
use std::path::PathBuf;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{DataStore, FallbackDocument, StoreError};

/// Replace the primary database tables with the contents of a fallback-shaped file.
///
/// Talks to `DATABASE_URL` directly; the API server does not need to be running.
pub async fn handle(file: PathBuf, output_format: OutputFormat) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let document = FallbackDocument::from_slice(&bytes)?;

    let config = AppConfig::from_env();
    let store = DataStore::from_config(&config.store);

    let report = store.seed(&document).await;
    store.close().await;
    let report = match report {
        Ok(report) => report,
        Err(StoreError::ConfigMissing(key)) => anyhow::bail!("{} must be set to seed the database", key),
        Err(e) => return Err(anyhow::Error::new(e).context("seeding failed")),
    };

    output_success(
        &output_format,
        &format!(
            "Base de dados populada: {} alunos, {} cursos.",
            report.alunos, report.cursos
        ),
        Some(json!({ "report": report })),
    )
}
