use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::database::fallback::{FallbackDocument, FallbackStore};
use crate::database::manager::{DatabaseManager, SeedReport};
use crate::database::models::Entity;
use crate::database::repository::RecordStore;
use crate::database::StoreError;

/// Which store answered the last operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Primary,
    Fallback,
}

const MODE_UNKNOWN: u8 = 0;
const MODE_PRIMARY: u8 = 1;
const MODE_FALLBACK: u8 = 2;

/// Routes every operation to the primary database when it answers a probe,
/// and to the fallback file otherwise.
pub struct DataStore {
    primary: Option<DatabaseManager>,
    fallback: FallbackStore,
    mirror_writes: bool,
    last_mode: AtomicU8,
}

impl DataStore {
    pub fn new(primary: Option<DatabaseManager>, fallback: FallbackStore, mirror_writes: bool) -> Self {
        Self {
            primary,
            fallback,
            mirror_writes,
            last_mode: AtomicU8::new(MODE_UNKNOWN),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        let primary = match DatabaseManager::connect_lazy(config) {
            Ok(db) => Some(db),
            Err(StoreError::ConfigMissing(key)) => {
                warn!(
                    "{} not set; serving everything from {}",
                    key,
                    config.fallback_path.display()
                );
                None
            }
            Err(e) => {
                warn!("Primary database disabled: {}", e);
                None
            }
        };

        Self::new(primary, FallbackStore::new(config.fallback_path.clone()), config.mirror_writes)
    }

    pub fn fallback(&self) -> &FallbackStore {
        &self.fallback
    }

    /// Probe connectivity and report which store would serve a request right now.
    pub async fn mode(&self) -> StoreMode {
        match self.reachable_primary().await {
            Some(_) => StoreMode::Primary,
            None => StoreMode::Fallback,
        }
    }

    /// Replace the primary tables with a fallback-shaped document.
    pub async fn seed(&self, document: &FallbackDocument) -> Result<SeedReport, StoreError> {
        let db = self.primary.as_ref().ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;
        db.seed(document).await
    }

    pub async fn close(&self) {
        if let Some(db) = &self.primary {
            db.close().await;
        }
    }

    async fn reachable_primary(&self) -> Option<&DatabaseManager> {
        let Some(db) = self.primary.as_ref() else {
            self.record_mode(MODE_FALLBACK, None);
            return None;
        };

        match db.health_check().await {
            Ok(()) => {
                self.record_mode(MODE_PRIMARY, None);
                Some(db)
            }
            Err(e) => {
                self.record_mode(MODE_FALLBACK, Some(&e));
                None
            }
        }
    }

    // Logs only on transitions so a down database does not flood the log.
    fn record_mode(&self, mode: u8, cause: Option<&StoreError>) {
        let previous = self.last_mode.swap(mode, Ordering::Relaxed);
        if previous == mode {
            return;
        }
        match (mode, cause) {
            (MODE_PRIMARY, _) => info!("Primary database reachable; using it as source of truth"),
            (_, Some(e)) => warn!(
                "Primary database unreachable ({}); using fallback file {}",
                e,
                self.fallback.path().display()
            ),
            _ => info!("Using fallback file {}", self.fallback.path().display()),
        }
    }

    fn mirror_failed<E: Entity>(&self, action: &str, id: i64, err: StoreError) {
        warn!(
            "Mirror {} of {} {} to {} failed: {}",
            action,
            E::LABEL,
            id,
            self.fallback.path().display(),
            err
        );
    }
}

#[async_trait]
impl RecordStore for DataStore {
    async fn list<E: Entity>(&self) -> Result<Vec<E>, StoreError> {
        match self.reachable_primary().await {
            Some(db) => db.list::<E>().await,
            None => self.fallback.list::<E>().await,
        }
    }

    async fn insert<E: Entity>(&self, record: E) -> Result<E, StoreError> {
        let Some(db) = self.reachable_primary().await else {
            return self.fallback.insert(record).await;
        };

        let saved = db.insert(record).await?;
        if self.mirror_writes {
            if let Err(e) = self.fallback.insert(saved.clone()).await {
                self.mirror_failed::<E>("insert", saved.id(), e);
            }
        }
        Ok(saved)
    }

    async fn update<E: Entity>(&self, id: i64, patch: E::Patch) -> Result<E, StoreError> {
        let Some(db) = self.reachable_primary().await else {
            return self.fallback.update::<E>(id, patch).await;
        };

        let saved = db.update::<E>(id, patch).await?;
        if self.mirror_writes {
            if let Err(e) = self.fallback.upsert(saved.clone()).await {
                self.mirror_failed::<E>("update", id, e);
            }
        }
        Ok(saved)
    }

    async fn remove<E: Entity>(&self, id: i64) -> Result<(), StoreError> {
        let Some(db) = self.reachable_primary().await else {
            return self.fallback.remove::<E>(id).await;
        };

        db.remove::<E>(id).await?;
        if self.mirror_writes {
            if let Err(e) = self.fallback.remove::<E>(id).await {
                self.mirror_failed::<E>("delete", id, e);
            }
        }
        Ok(())
    }
}
