// src/persistence/worker.rs

use std::collections::{HashMap, VecDeque};
#[cfg(not(target_arch = "wasm32"))]
use std::sync::mpsc::{Receiver, Sender, channel};

use super::{BackendStatus, HISTORY_LIMIT, HybridStore, ProgressStore};
use crate::model::{
    CatalogEntry, CompletionRecord, HistoryEntry, LocalResult, ProgressRecord, QuizFile,
};

/// Trabajo de persistencia que la UI no puede esperar
#[derive(Debug, Clone)]
pub enum StoreJob {
    LoadCatalog,
    /// Con `discard_draft`, borra ese borrador y abre el test vacío
    OpenQuiz {
        entry: CatalogEntry,
        discard_draft: Option<i64>,
    },
    Save(ProgressRecord),
    Complete {
        record: CompletionRecord,
        backup: LocalResult,
    },
}

#[derive(Debug, Clone)]
pub enum StoreEvent {
    CatalogLoaded {
        catalog: Result<Vec<CatalogEntry>, String>,
        progress: HashMap<u32, ProgressRecord>,
        status: BackendStatus,
    },
    QuizOpened {
        entry: CatalogEntry,
        quiz: Result<QuizFile, String>,
        draft: Option<ProgressRecord>,
    },
    /// `None` si no se pudo guardar en ningún sitio
    Saved { id: Option<i64> },
    Completed {
        stored: bool,
        history: Vec<HistoryEntry>,
    },
}

/// Ejecuta un trabajo. Los errores se registran aquí y nunca llegan a la UI como fallo,
/// salvo el catálogo y el fichero de preguntas.
pub fn run_job(store: &HybridStore, job: StoreJob) -> StoreEvent {
    match job {
        StoreJob::LoadCatalog => {
            let catalog = store.fetch_catalog().map_err(|err| {
                log::error!("Error al cargar tests: {err}");
                err.to_string()
            });
            let progress = store.all_progress().unwrap_or_else(|err| {
                log::warn!("No se pudo cargar el progreso: {err}");
                HashMap::new()
            });
            StoreEvent::CatalogLoaded {
                catalog,
                progress,
                status: store.status(),
            }
        }
        StoreJob::OpenQuiz {
            entry,
            discard_draft,
        } => {
            if let Some(id) = discard_draft {
                if let Err(err) = store.delete(id) {
                    log::warn!("No se pudo eliminar el progreso {id}: {err}");
                }
            }
            let quiz = store.local().source().load_entry(&entry).map_err(|err| {
                log::error!("Error al cargar el test {}: {err}", entry.id);
                err.to_string()
            });
            let draft = match discard_draft {
                Some(_) => None,
                None => store.find(entry.id).unwrap_or_else(|err| {
                    log::warn!("Error al buscar progreso: {err}");
                    None
                }),
            };
            StoreEvent::QuizOpened { entry, quiz, draft }
        }
        StoreJob::Save(record) => match store.save(&record) {
            Ok(saved) => StoreEvent::Saved { id: saved.id },
            Err(err) => {
                log::warn!("Autoguardado fallido: {err}");
                StoreEvent::Saved { id: None }
            }
        },
        StoreJob::Complete { record, backup } => {
            let stored = match store.complete(&record) {
                Ok(_) => true,
                Err(err) => {
                    log::error!("No se pudo guardar el resultado: {err}");
                    false
                }
            };
            if let Err(err) = store.save_result(&backup) {
                log::error!("No se pudo guardar la copia local del resultado: {err}");
            }
            let history = store
                .history(record.test_id, HISTORY_LIMIT)
                .unwrap_or_else(|err| {
                    log::warn!("Error al cargar historial: {err}");
                    Vec::new()
                });
            StoreEvent::Completed { stored, history }
        }
    }
}

enum WorkerMode {
    #[cfg(not(target_arch = "wasm32"))]
    Thread {
        jobs: Sender<(u64, StoreJob)>,
        events: Receiver<(u64, StoreEvent)>,
    },
    Inline {
        store: Box<HybridStore>,
        ready: VecDeque<(u64, StoreEvent)>,
    },
}

/// Cola de trabajos de persistencia. Cada evento vuelve con la generación de la sesión
/// que lo pidió, para que la app descarte respuestas de sesiones ya cerradas.
pub struct PersistenceWorker {
    mode: WorkerMode,
    in_flight: usize,
}

impl PersistenceWorker {
    /// Hilo propio en escritorio; en web los trabajos corren en línea
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn(store: HybridStore) -> Self {
        let (job_tx, job_rx) = channel::<(u64, StoreJob)>();
        let (event_tx, event_rx) = channel();

        std::thread::spawn(move || {
            for (generation, job) in job_rx {
                let event = run_job(&store, job);
                if event_tx.send((generation, event)).is_err() {
                    break;
                }
            }
        });

        Self {
            mode: WorkerMode::Thread {
                jobs: job_tx,
                events: event_rx,
            },
            in_flight: 0,
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn spawn(store: HybridStore) -> Self {
        Self::inline(store)
    }

    pub fn inline(store: HybridStore) -> Self {
        Self {
            mode: WorkerMode::Inline {
                store: Box::new(store),
                ready: VecDeque::new(),
            },
            in_flight: 0,
        }
    }

    pub fn submit(&mut self, generation: u64, job: StoreJob) {
        self.in_flight += 1;
        match &mut self.mode {
            #[cfg(not(target_arch = "wasm32"))]
            WorkerMode::Thread { jobs, .. } => {
                if jobs.send((generation, job)).is_err() {
                    log::error!("El hilo de persistencia terminó");
                    self.in_flight -= 1;
                }
            }
            WorkerMode::Inline { store, ready } => {
                let event = run_job(store, job);
                ready.push_back((generation, event));
            }
        }
    }

    /// Eventos listos, sin bloquear
    pub fn poll(&mut self) -> Vec<(u64, StoreEvent)> {
        let events: Vec<_> = match &mut self.mode {
            #[cfg(not(target_arch = "wasm32"))]
            WorkerMode::Thread { events, .. } => events.try_iter().collect(),
            WorkerMode::Inline { ready, .. } => ready.drain(..).collect(),
        };
        self.in_flight = self.in_flight.saturating_sub(events.len());
        events
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}
