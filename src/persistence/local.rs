// src/persistence/local.rs

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{ProgressStore, StoreError, latest_per_test};
use crate::data::QuizSource;
use crate::model::{
    CatalogEntry, CompletionRecord, HistoryEntry, LocalResult, ProgressRecord, ProgressStatus,
};

const PROGRESS_KEY: &str = "quizProgress";
const RESULTS_KEY: &str = "testResultados";

/// Los borradores locales llevan ids negativos; los de Supabase son siempre positivos
pub fn is_local_id(id: i64) -> bool {
    id < 0
}

/// Almacenamiento clave/valor: ficheros en escritorio, `localStorage` en web
pub trait KeyValueStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    fn available(&self) -> bool {
        true
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Unavailable)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Unavailable)?;
        values.remove(key);
        Ok(())
    }
}

/// Un fichero `<clave>.json` por clave dentro de `dir`
#[cfg(not(target_arch = "wasm32"))]
pub struct FileStorage {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(key)) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// `window.localStorage`
#[cfg(target_arch = "wasm32")]
pub struct WebStorage;

#[cfg(target_arch = "wasm32")]
impl WebStorage {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStorage for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| StoreError::Unavailable)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| StoreError::Unavailable)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|_| StoreError::Unavailable)
    }

    fn available(&self) -> bool {
        Self::storage().is_ok()
    }
}

/// Progreso y copia de resultados en el almacenamiento local
pub struct LocalStore {
    storage: Box<dyn KeyValueStorage>,
    source: QuizSource,
}

impl LocalStore {
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            source: QuizSource::Embedded,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::default()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn in_dir(dir: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Box::new(FileStorage::new(dir)))
    }

    #[cfg(target_arch = "wasm32")]
    pub fn browser() -> Self {
        Self::new(Box::new(WebStorage))
    }

    pub fn with_source(mut self, source: QuizSource) -> Self {
        self.source = source;
        self
    }

    pub fn source(&self) -> &QuizSource {
        &self.source
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        match self.storage.get(key)? {
            Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(&text)?),
            _ => Ok(Vec::new()),
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string(items)?;
        self.storage.set(key, &json)
    }

    fn rows(&self) -> Result<Vec<ProgressRecord>, StoreError> {
        self.read_list(PROGRESS_KEY)
    }

    fn next_id(rows: &[ProgressRecord]) -> i64 {
        rows.iter().filter_map(|r| r.id).min().unwrap_or(0).min(0) - 1
    }

    fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }

    /// Inserta o sustituye la fila con el mismo id; devuelve la fila guardada
    fn upsert(&self, mut record: ProgressRecord) -> Result<ProgressRecord, StoreError> {
        let mut rows = self.rows()?;
        match record.id.and_then(|id| rows.iter().position(|r| r.id == Some(id))) {
            Some(position) => {
                record.created_at = rows[position].created_at.clone();
                rows[position] = record.clone();
            }
            None => {
                record.id = Some(record.id.unwrap_or_else(|| Self::next_id(&rows)));
                record.created_at = Some(Self::now());
                rows.push(record.clone());
            }
        }
        self.write_list(PROGRESS_KEY, &rows)?;
        Ok(record)
    }

    pub fn save_result(&self, result: &LocalResult) -> Result<(), StoreError> {
        let mut results: Vec<LocalResult> = self.read_list(RESULTS_KEY)?;
        results.push(result.clone());
        self.write_list(RESULTS_KEY, &results)
    }

    pub fn results(&self) -> Result<Vec<LocalResult>, StoreError> {
        self.read_list(RESULTS_KEY)
    }

    pub fn results_for(&self, test_id: u32) -> Result<Vec<LocalResult>, StoreError> {
        Ok(self
            .results()?
            .into_iter()
            .filter(|r| r.test_id == test_id)
            .collect())
    }

    pub fn clear_results(&self) -> Result<(), StoreError> {
        self.storage.remove(RESULTS_KEY)
    }
}

impl ProgressStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn available(&self) -> bool {
        self.storage.available()
    }

    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        Ok(self.source.catalog()?)
    }

    fn find(&self, test_id: u32) -> Result<Option<ProgressRecord>, StoreError> {
        Ok(self
            .rows()?
            .into_iter()
            .rev()
            .find(|r| r.test_id == test_id && r.status == ProgressStatus::InProgress))
    }

    fn save(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError> {
        let mut draft = record.clone();
        draft.status = ProgressStatus::InProgress;
        draft.total_questions = draft.answers.len();
        self.upsert(draft)
    }

    fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut rows = self.rows()?;
        let before = rows.len();
        rows.retain(|r| r.id != Some(id));
        let deleted = rows.len() != before;
        if deleted {
            self.write_list(PROGRESS_KEY, &rows)?;
        }
        Ok(deleted)
    }

    fn complete(&self, record: &CompletionRecord) -> Result<ProgressRecord, StoreError> {
        self.upsert(record.clone().into_progress())
    }

    fn history(&self, test_id: u32, limit: usize) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self
            .results_for(test_id)?
            .iter()
            .rev()
            .take(limit)
            .map(HistoryEntry::from_local)
            .collect())
    }

    fn all_progress(&self) -> Result<HashMap<u32, ProgressRecord>, StoreError> {
        let rows = self.rows()?;
        Ok(latest_per_test(
            rows.into_iter()
                .rev()
                .filter(|r| r.status == ProgressStatus::InProgress),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(test_id: u32, correct: usize, date: &str) -> LocalResult {
        LocalResult {
            test_id,
            title: format!("Test {test_id}"),
            date: date.to_string(),
            correct,
            errors: 4 - correct,
            blanks: 0,
            total: 4,
            answers: vec![Some(1); 4],
            detail: None,
        }
    }

    #[test]
    fn drafts_are_created_then_updated_in_place() {
        let store = LocalStore::in_memory();
        let first = store.save(&ProgressRecord::in_progress(None, 2, vec![Some(1), None])).unwrap();
        let id = first.id.unwrap();
        assert!(is_local_id(id));
        assert!(first.created_at.is_some());

        let second = store
            .save(&ProgressRecord::in_progress(Some(id), 2, vec![Some(1), Some(3)]))
            .unwrap();
        assert_eq!(second.id, Some(id));
        assert_eq!(second.created_at, first.created_at);

        let found = store.find(2).unwrap().unwrap();
        assert_eq!(found.answers, vec![Some(1), Some(3)]);
        assert_eq!(store.all_progress().unwrap().len(), 1);
    }

    #[test]
    fn completing_a_draft_removes_it_from_progress() {
        let store = LocalStore::in_memory();
        let draft = store.save(&ProgressRecord::in_progress(None, 5, vec![Some(2)])).unwrap();

        store
            .complete(&CompletionRecord {
                id: draft.id,
                test_id: 5,
                answers: vec![Some(2)],
                total_correct: 1,
                total_questions: 1,
                score_percentage: 100.0,
            })
            .unwrap();

        assert!(store.find(5).unwrap().is_none());
        assert!(store.all_progress().unwrap().is_empty());
    }

    #[test]
    fn local_ids_count_down_from_minus_one() {
        let store = LocalStore::in_memory();
        let a = store.save(&ProgressRecord::in_progress(None, 1, vec![Some(1)])).unwrap();
        let b = store.save(&ProgressRecord::in_progress(None, 2, vec![Some(2)])).unwrap();
        assert_eq!(a.id, Some(-1));
        assert_eq!(b.id, Some(-2));

        store.delete(-1).unwrap();
        let c = store.save(&ProgressRecord::in_progress(None, 3, vec![Some(3)])).unwrap();
        assert_eq!(c.id, Some(-3));
    }

    #[test]
    fn delete_reports_whether_a_row_existed() {
        let store = LocalStore::in_memory();
        let draft = store.save(&ProgressRecord::in_progress(None, 1, vec![Some(1)])).unwrap();
        assert!(store.delete(draft.id.unwrap()).unwrap());
        assert!(!store.delete(draft.id.unwrap()).unwrap());
    }

    #[test]
    fn history_is_newest_first_and_limited() {
        let store = LocalStore::in_memory();
        store.save_result(&result(1, 1, "2024-01-01")).unwrap();
        store.save_result(&result(2, 4, "2024-01-02")).unwrap();
        store.save_result(&result(1, 2, "2024-01-03")).unwrap();
        store.save_result(&result(1, 3, "2024-01-04")).unwrap();
        store.save_result(&result(1, 4, "2024-01-05")).unwrap();

        let history = store.history(1, 3).unwrap();
        let dates: Vec<_> = history.iter().map(|h| h.date.as_str()).collect();
        assert_eq!(dates, ["2024-01-05", "2024-01-04", "2024-01-03"]);
        assert_eq!(history[0].percentage, 100.0);

        assert_eq!(store.results_for(2).unwrap().len(), 1);
        store.clear_results().unwrap();
        assert!(store.results().unwrap().is_empty());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn results_backup_survives_reopening_file_storage() {
        let dir = std::env::temp_dir().join(format!("quiz_slider_store_{}", std::process::id()));
        {
            let store = LocalStore::in_dir(&dir);
            store.save_result(&result(3, 2, "2024-02-01")).unwrap();
        }

        let reopened = LocalStore::in_dir(&dir);
        let results = reopened.results().unwrap();
        assert_eq!(results, vec![result(3, 2, "2024-02-01")]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
