use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use crate::database::models::Entity;
use crate::database::repository::RecordStore;
use crate::database::StoreError;

/// Contents of the fallback file: `{ "alunos": [...], "cursos": [...] }`.
///
/// Keys other than the known collections are preserved on rewrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackDocument(Map<String, Value>);

impl FallbackDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(StoreError::Corrupt("top level is not an object".to_string())),
            Err(e) => Err(StoreError::Corrupt(e.to_string())),
        }
    }

    pub fn to_pretty_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }

    /// Records of `E`; a missing or null array reads as empty.
    pub fn records<E: Entity>(&self) -> Result<Vec<E>, StoreError> {
        match self.0.get(E::COLLECTION) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .cloned()
                .map(serde_json::from_value)
                .collect::<Result<Vec<E>, _>>()
                .map_err(|e| StoreError::Corrupt(format!("'{}': {}", E::COLLECTION, e))),
            Some(_) => Err(StoreError::Corrupt(format!("'{}' is not an array", E::COLLECTION))),
        }
    }

    pub fn set_records<E: Entity>(&mut self, records: &[E]) -> Result<(), StoreError> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.0.insert(E::COLLECTION.to_string(), Value::Array(values));
        Ok(())
    }
}

/// JSON file used when the primary database is unreachable.
///
/// Every read-modify-write holds `lock`, and writes go through a temp file
/// plus rename, so one process never interleaves two mutations.
pub struct FallbackStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FallbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the whole document.
    pub async fn load(&self) -> Result<FallbackDocument, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_document().await
    }

    /// Replace the stored copy of a record, inserting it if absent.
    pub async fn upsert<E: Entity>(&self, record: E) -> Result<E, StoreError> {
        self.modify::<E, _, _>(|records| {
            match records.iter_mut().find(|r| r.id() == record.id()) {
                Some(existing) => *existing = record.clone(),
                None => records.push(record.clone()),
            }
            Ok(record)
        })
        .await
    }

    async fn read_document(&self) -> Result<FallbackDocument, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => FallbackDocument::from_slice(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Fallback file {} does not exist yet", self.path.display());
                Ok(FallbackDocument::default())
            }
            Err(e) => Err(StoreError::Unavailable(format!("reading {}: {}", self.path.display(), e))),
        }
    }

    async fn write_document(&self, document: &FallbackDocument) -> Result<(), StoreError> {
        let unavailable = |e: std::io::Error| StoreError::Unavailable(format!("writing {}: {}", self.path.display(), e));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(unavailable)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, document.to_pretty_json()?).await.map_err(unavailable)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(unavailable)?;
        Ok(())
    }

    async fn modify<E, T, F>(&self, change: F) -> Result<T, StoreError>
    where
        E: Entity,
        F: FnOnce(&mut Vec<E>) -> Result<T, StoreError> + Send,
    {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        let mut records = document.records::<E>()?;
        let outcome = change(&mut records)?;
        document.set_records(&records)?;
        self.write_document(&document).await?;
        Ok(outcome)
    }
}

#[async_trait]
impl RecordStore for FallbackStore {
    async fn list<E: Entity>(&self) -> Result<Vec<E>, StoreError> {
        let mut records = self.load().await?.records::<E>()?;
        records.sort_by_key(|r| r.id());
        Ok(records)
    }

    async fn insert<E: Entity>(&self, record: E) -> Result<E, StoreError> {
        self.modify::<E, _, _>(|records| {
            if records.iter().any(|r| r.id() == record.id()) {
                return Err(StoreError::Conflict { label: E::LABEL, id: record.id() });
            }
            records.push(record.clone());
            Ok(record)
        })
        .await
    }

    async fn update<E: Entity>(&self, id: i64, patch: E::Patch) -> Result<E, StoreError> {
        self.modify::<E, _, _>(|records| {
            let record = records
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or(StoreError::NotFound { label: E::LABEL, id })?;
            record.apply(patch);
            Ok(record.clone())
        })
        .await
    }

    async fn remove<E: Entity>(&self, id: i64) -> Result<(), StoreError> {
        self.modify::<E, _, _>(|records| {
            let before = records.len();
            records.retain(|r| r.id() != id);
            if records.len() == before {
                return Err(StoreError::NotFound { label: E::LABEL, id });
            }
            Ok(())
        })
        .await
    }
}
