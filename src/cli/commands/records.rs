//! Entity-generic flows shared by `escola alunos` and `escola cursos`.

use anyhow::bail;
use serde_json::{json, Map, Value};
use std::io::{self, BufRead, Write};

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_json, output_success};
use crate::cli::views::{confirm, filter_records, render_listing, TableView};
use crate::cli::OutputFormat;
use crate::database::models::{parse_patch, RecordError};

fn collection_path<T: TableView>() -> String {
    format!("/{}", T::COLLECTION)
}

fn item_path<T: TableView>(id: i64) -> String {
    format!("/{}/{}", T::COLLECTION, id)
}

/// Fetch the whole collection and render it (filtered client-side).
pub async fn show<T: TableView>(client: &ApiClient, format: &OutputFormat, search: Option<&str>) -> anyhow::Result<()> {
    let records: Vec<T> = client.get(&collection_path::<T>()).await?;

    match format {
        OutputFormat::Json => output_json(&filter_records(&records, search)),
        OutputFormat::Text => {
            print!("{}", render_listing(&records, search));
            Ok(())
        }
    }
}

pub async fn add<T: TableView>(client: &ApiClient, format: &OutputFormat, body: Value) -> anyhow::Result<()> {
    let record = T::from_json(body).map_err(local_validation)?;

    let created: T = client.post(&collection_path::<T>(), &serde_json::to_value(&record)?).await?;
    output_success(
        format,
        &format!("{} {} adicionado com sucesso!", T::LABEL, created.id()),
        Some(json!({ "record": created })),
    )?;
    rerender::<T>(client, format).await
}

pub async fn update<T: TableView>(
    client: &ApiClient,
    format: &OutputFormat,
    id: i64,
    fields: Map<String, Value>,
) -> anyhow::Result<()> {
    if fields.is_empty() {
        bail!("Nada para atualizar: indique pelo menos um campo.");
    }
    let patch = parse_patch::<T>(Value::Object(fields)).map_err(local_validation)?;

    let updated: T = client.put(&item_path::<T>(id), &serde_json::to_value(&patch)?).await?;
    output_success(
        format,
        &format!("{} {} atualizado com sucesso!", T::LABEL, updated.id()),
        Some(json!({ "record": updated })),
    )?;
    rerender::<T>(client, format).await
}

pub async fn delete<T: TableView>(client: &ApiClient, format: &OutputFormat, id: i64, assume_yes: bool) -> anyhow::Result<()> {
    // Prompt and cancel notice go to stderr so --json output stays parseable.
    if !assume_yes && !confirm_delete::<T, _, _>(&mut io::stdin().lock(), &mut io::stderr(), id)? {
        return Ok(());
    }

    let response: Value = client.delete(&item_path::<T>(id)).await?;
    let message = response
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Registo removido.")
        .to_string();
    output_success(format, &message, None)?;
    rerender::<T>(client, format).await
}

fn confirm_delete<T: TableView, R: BufRead, W: Write>(input: &mut R, prompt: &mut W, id: i64) -> io::Result<bool> {
    let question = format!("Tem certeza que deseja deletar {} com ID {}?", T::NOUN, id);
    let confirmed = confirm(input, prompt, &question)?;
    if !confirmed {
        writeln!(prompt, "Operação cancelada.")?;
    }
    Ok(confirmed)
}

// After a mutation the table is rebuilt from a fresh GET, never patched locally.
async fn rerender<T: TableView>(client: &ApiClient, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => Ok(()),
        OutputFormat::Text => show::<T>(client, format, None).await,
    }
}

/// Build a request body from optional flag values, keyed by wire field name.
pub fn fields_from(pairs: &[(&str, Option<String>)]) -> Map<String, Value> {
    pairs
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), Value::String(v.clone()))))
        .collect()
}

fn local_validation(err: RecordError) -> anyhow::Error {
    match err {
        RecordError::InvalidFields(fields) => {
            let mut problems: Vec<String> = fields.into_iter().map(|(field, why)| format!("{} ({})", field, why)).collect();
            problems.sort();
            anyhow::anyhow!("Por favor, preencha todos os campos corretamente: {}", problems.join(", "))
        }
        other => anyhow::anyhow!(other),
    }
}
