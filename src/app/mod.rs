use crate::config::AppConfig;
use crate::grading::GradeResult;
use crate::model::{CatalogEntry, HistoryEntry, OptionIndex, ProgressRecord, Screen};
use crate::persistence::{BackendStatus, PersistenceWorker, StoreEvent, StoreJob};
use crate::session::QuizSession;
use crate::slider::{NavButton, NavOutcome, ViewMode, ViewState};
use crate::ui::surface::EguiSurface;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Submódulos
pub mod completion;
pub mod navigation;
pub mod progress;
pub mod view_models;

pub use view_models::{CatalogRow, HistoryRow};

/// Lo único que sobrevive entre ejecuciones (almacenamiento de eframe)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Preferences {
    pub dark_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { dark_mode: true }
    }
}

/// Resultado del último test corregido
#[derive(Clone, Debug)]
pub struct LastResult {
    pub entry_id: u32,
    pub title: String,
    pub grade: GradeResult,
    pub history: Vec<HistoryEntry>,
    /// `None` mientras se guarda
    pub stored: Option<bool>,
    pub generation: u64,
}

pub struct QuizApp {
    pub config: AppConfig,
    pub preferences: Preferences,
    pub screen: Screen,
    pub catalog: Vec<CatalogEntry>,
    pub progress: HashMap<u32, ProgressRecord>,
    pub catalog_loading: bool,
    pub catalog_error: Option<String>,
    pub backend: Option<BackendStatus>,
    pub session: Option<QuizSession>,
    pub view: ViewState,
    pub surface: EguiSurface,
    pub last_result: Option<LastResult>,
    /// Test cuyo borrador se va a descartar (ventana de confirmación abierta)
    pub confirm_reset: Option<CatalogEntry>,
    pub message: String,
    worker: PersistenceWorker,
    generation: u64,
}

impl QuizApp {
    pub fn new(config: AppConfig, worker: PersistenceWorker, preferences: Preferences) -> Self {
        let view = ViewState::new(0, config.view.clone());
        let mut app = Self {
            config,
            preferences,
            screen: Screen::Catalog,
            catalog: Vec::new(),
            progress: HashMap::new(),
            catalog_loading: false,
            catalog_error: None,
            backend: None,
            session: None,
            view,
            surface: EguiSurface::default(),
            last_result: None,
            confirm_reset: None,
            message: String::new(),
            worker,
            generation: 0,
        };
        app.reload_catalog();
        app
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_busy(&self) -> bool {
        self.worker.is_busy()
    }

    fn submit(&mut self, job: StoreJob) {
        self.worker.submit(self.generation, job);
    }

    /// Invalida las respuestas pendientes de la sesión anterior
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Recoge los eventos de persistencia listos. Llamar una vez por frame.
    pub fn poll_worker(&mut self, now_ms: u64) {
        for (generation, event) in self.worker.poll() {
            self.apply_event(generation, event, now_ms);
        }
    }

    fn apply_event(&mut self, generation: u64, event: StoreEvent, now_ms: u64) {
        match event {
            StoreEvent::CatalogLoaded {
                catalog,
                progress,
                status,
            } => self.on_catalog_loaded(catalog, progress, status),
            StoreEvent::QuizOpened { entry, quiz, draft } => {
                if generation != self.generation || self.screen != Screen::Loading {
                    log::debug!("test {} abierto para una sesión ya cerrada", entry.id);
                    return;
                }
                self.on_quiz_opened(entry, quiz, draft, now_ms);
            }
            StoreEvent::Saved { id } => match self.session.as_mut() {
                Some(session) if session.generation() == generation => {
                    session.record_save_result(id, now_ms);
                }
                _ => log::debug!("guardado de una sesión ya cerrada descartado"),
            },
            StoreEvent::Completed { stored, history } => match self.last_result.as_mut() {
                Some(result) if result.generation == generation => {
                    result.stored = Some(stored);
                    result.history = history;
                }
                _ => log::debug!("resultado de una sesión anterior descartado"),
            },
        }
    }

    /// Trabajo por frame del test en curso: scrolls aplazados y autoguardado
    pub fn before_frame(&mut self, now_ms: u64) {
        self.poll_worker(now_ms);
        if self.screen == Screen::Quiz {
            self.view.animation_frame(&mut self.surface);
            self.poll_autosave(now_ms);
        }
    }

    /// Con la página ya medida: observer y temporizadores de asentamiento
    pub fn after_frame(&mut self, now_ms: u64) {
        if self.screen == Screen::Quiz {
            self.view.observe(&mut self.surface, now_ms);
            self.view.tick(now_ms, &mut self.surface);
        }
    }

    /// Próximo instante en el que hay algo que hacer sin interacción del usuario
    pub fn next_wakeup_ms(&self) -> Option<u64> {
        let session = self.session.as_ref().and_then(QuizSession::next_wakeup_ms);
        match (session, self.view.next_timer_due_ms()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn needs_repaint(&self) -> bool {
        self.is_busy() || self.view.has_pending_work() || self.surface.is_animating()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view.mode()
    }

    pub fn toggle_view_mode(&mut self) {
        if self.session.is_none() {
            return;
        }
        let sync_index = self.view.toggle_mode(&mut self.surface);
        log::info!("vista {:?} en la pregunta {sync_index}", self.view.mode());
    }

    /// Botones del slider. "Finalizar" corrige el test.
    pub fn press(&mut self, button: NavButton, now_ms: u64) {
        if let NavOutcome::Finish = self.view.press(button, &mut self.surface, now_ms) {
            self.finish_quiz(now_ms);
        }
    }

    pub fn answer(&mut self, question: usize, value: OptionIndex, now_ms: u64) {
        if let Some(session) = self.session.as_mut() {
            session.answer(question, value, now_ms);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::app_with;
    use super::*;
    use crate::persistence::testing::RecordingStore;

    #[test]
    fn starts_on_loaded_catalog() {
        let remote = RecordingStore::default();
        let app = app_with(&remote);
        assert_eq!(app.screen, Screen::Catalog);
        assert!(!app.catalog_loading);
        assert!(!app.catalog.is_empty());
        assert!(app.backend.is_some_and(|b| b.remote));
    }

    #[test]
    fn stale_save_is_dropped() {
        let remote = RecordingStore::default();
        let mut app = app_with(&remote);
        let entry = app.catalog[0].clone();
        app.open_quiz(&entry, false);
        app.poll_worker(0);
        let old_generation = app.session.as_ref().map(QuizSession::generation);

        app.back_to_catalog();
        app.open_quiz(&entry, false);
        app.poll_worker(10);

        app.apply_event(old_generation.unwrap_or(0), StoreEvent::Saved { id: Some(77) }, 20);
        assert_eq!(app.session.as_ref().and_then(QuizSession::progress_id), None);
    }
}
