//! Persistencia del progreso: Supabase cuando está configurado, almacenamiento local siempre.
//!
//! El resto de la aplicación solo ve `ProgressStore`; nunca decide qué backend responde.

pub mod local;
#[cfg(not(target_arch = "wasm32"))]
pub mod remote;
pub mod worker;

use std::collections::HashMap;

use thiserror::Error;

use crate::config::BackendConfig;
use crate::data::{DataError, QuizSource};
use crate::model::{CatalogEntry, CompletionRecord, HistoryEntry, LocalResult, ProgressRecord};

pub use local::{KeyValueStorage, LocalStore, MemoryStorage, is_local_id};
pub use worker::{PersistenceWorker, StoreEvent, StoreJob};

/// Resultados que se muestran en el historial
pub const HISTORY_LIMIT: usize = 3;

#[derive(Error, Debug)]
pub enum StoreError {
    #[cfg(not(target_arch = "wasm32"))]
    #[error("Petición HTTP fallida: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Supabase respondió con el estado {status}")]
    Supabase { status: u16 },

    #[error("Respuesta JSON inválida: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Almacenamiento no disponible")]
    Unavailable,

    #[error("Respuesta vacía")]
    EmptyResponse,

    #[error(transparent)]
    Data(#[from] DataError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendStatus {
    pub remote: bool,
    pub local: bool,
    pub mode: BackendMode,
}

/// Operaciones de persistencia que usa la aplicación
pub trait ProgressStore: Send {
    fn name(&self) -> &'static str;

    /// El backend está configurado y se puede intentar usar
    fn available(&self) -> bool;

    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, StoreError>;

    /// Último borrador en curso del test
    fn find(&self, test_id: u32) -> Result<Option<ProgressRecord>, StoreError>;

    /// Crea (sin id) o actualiza (con id) un borrador; devuelve la fila guardada
    fn save(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError>;

    fn delete(&self, id: i64) -> Result<bool, StoreError>;

    fn complete(&self, record: &CompletionRecord) -> Result<ProgressRecord, StoreError>;

    /// Resultados completados, del más reciente al más antiguo
    fn history(&self, test_id: u32, limit: usize) -> Result<Vec<HistoryEntry>, StoreError>;

    /// Borrador más reciente de cada test
    fn all_progress(&self) -> Result<HashMap<u32, ProgressRecord>, StoreError>;
}

/// Supabase con respaldo local. Los fallos remotos se registran y se continúa en local.
pub struct HybridStore {
    remote: Option<Box<dyn ProgressStore>>,
    local: LocalStore,
}

impl HybridStore {
    pub fn new(remote: Option<Box<dyn ProgressStore>>, local: LocalStore) -> Self {
        Self { remote, local }
    }

    /// Backend según la configuración: remoto solo con credenciales (y fuera de wasm)
    pub fn from_config(backend: &BackendConfig, source: QuizSource, local: LocalStore) -> Self {
        let remote = remote_from_config(backend);
        let local = local.with_source(source);
        Self::new(remote, local)
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    pub fn status(&self) -> BackendStatus {
        let remote = self.remote.as_ref().is_some_and(|r| r.available());
        BackendStatus {
            remote,
            local: self.local.available(),
            mode: if remote {
                BackendMode::Online
            } else {
                BackendMode::Offline
            },
        }
    }

    pub fn save_result(&self, result: &LocalResult) -> Result<(), StoreError> {
        self.local.save_result(result)
    }

    /// Intenta el remoto; si falla o no hay, el local
    fn with_fallback<T>(
        &self,
        operation: &str,
        remote_op: impl FnOnce(&dyn ProgressStore) -> Result<T, StoreError>,
        local_op: impl FnOnce(&LocalStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        if let Some(remote) = self.remote.as_deref().filter(|r| r.available()) {
            match remote_op(remote) {
                Ok(value) => return Ok(value),
                Err(err) => log::warn!("{operation} en {} falló, se usa el local: {err}", remote.name()),
            }
        }
        local_op(&self.local)
    }

    /// Borra el borrador local que ya tiene fila en Supabase
    fn forget_local(&self, id: i64) {
        if let Err(err) = self.local.delete(id) {
            log::warn!("No se pudo borrar el borrador local {id}: {err}");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn remote_from_config(backend: &BackendConfig) -> Option<Box<dyn ProgressStore>> {
    let (url, key) = backend.remote_credentials()?;
    match remote::SupabaseStore::new(url, key) {
        Ok(store) => Some(Box::new(store)),
        Err(err) => {
            log::warn!("No se pudo crear el cliente de Supabase: {err}");
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn remote_from_config(backend: &BackendConfig) -> Option<Box<dyn ProgressStore>> {
    if backend.remote_credentials().is_some() {
        log::info!("Supabase configurado, pero en web solo se usa el almacenamiento local");
    }
    None
}

impl ProgressStore for HybridStore {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn available(&self) -> bool {
        true
    }

    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        if let Some(remote) = self.remote.as_deref().filter(|r| r.available()) {
            match remote.fetch_catalog() {
                Ok(tests) if !tests.is_empty() => {
                    log::info!("{} tests cargados desde {}", tests.len(), remote.name());
                    return Ok(tests);
                }
                Ok(_) => log::info!("{} no tiene tests, se usa el índice local", remote.name()),
                Err(err) => log::warn!("Error al cargar tests desde {}: {err}", remote.name()),
            }
        }
        let tests = self.local.fetch_catalog()?;
        log::info!("{} tests cargados desde el índice local", tests.len());
        Ok(tests)
    }

    fn find(&self, test_id: u32) -> Result<Option<ProgressRecord>, StoreError> {
        self.with_fallback("find", |r| r.find(test_id), |l| l.find(test_id))
    }

    /// Un id local nunca llega al remoto: allí el borrador se crea como fila nueva
    fn save(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError> {
        let local_id = record.id.filter(|&id| is_local_id(id));
        let saved = self.with_fallback(
            "save",
            |r| match local_id {
                Some(_) => r.save(&ProgressRecord {
                    id: None,
                    ..record.clone()
                }),
                None => r.save(record),
            },
            |l| l.save(record),
        )?;
        if let Some(id) = local_id
            && saved.id != Some(id)
        {
            log::info!("Borrador local {id} subido a Supabase con ID: {:?}", saved.id);
            self.forget_local(id);
        }
        Ok(saved)
    }

    fn delete(&self, id: i64) -> Result<bool, StoreError> {
        if is_local_id(id) {
            return self.local.delete(id);
        }
        self.with_fallback("delete", |r| r.delete(id), |l| l.delete(id))
    }

    fn complete(&self, record: &CompletionRecord) -> Result<ProgressRecord, StoreError> {
        let local_id = record.id.filter(|&id| is_local_id(id));
        let completed = self.with_fallback(
            "complete",
            |r| match local_id {
                Some(_) => r.complete(&CompletionRecord {
                    id: None,
                    ..record.clone()
                }),
                None => r.complete(record),
            },
            |l| l.complete(record),
        )?;
        if let Some(id) = local_id
            && completed.id != Some(id)
        {
            self.forget_local(id);
        }
        Ok(completed)
    }

    fn history(&self, test_id: u32, limit: usize) -> Result<Vec<HistoryEntry>, StoreError> {
        self.with_fallback(
            "history",
            |r| match r.history(test_id, limit)? {
                entries if entries.is_empty() => Err(StoreError::EmptyResponse),
                entries => Ok(entries),
            },
            |l| l.history(test_id, limit),
        )
    }

    fn all_progress(&self) -> Result<HashMap<u32, ProgressRecord>, StoreError> {
        self.with_fallback("all_progress", |r| r.all_progress(), |l| l.all_progress())
    }
}

/// Primer borrador de cada test en una lista ordenada del más reciente al más antiguo
pub(crate) fn latest_per_test(rows: impl IntoIterator<Item = ProgressRecord>) -> HashMap<u32, ProgressRecord> {
    let mut latest = HashMap::new();
    for row in rows {
        latest.entry(row.test_id).or_insert(row);
    }
    latest
}
