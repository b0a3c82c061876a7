use super::*;
use crate::model::QuizFile;

impl QuizApp {
    pub fn reload_catalog(&mut self) {
        self.catalog_loading = true;
        self.submit(StoreJob::LoadCatalog);
    }

    pub(super) fn on_catalog_loaded(
        &mut self,
        catalog: Result<Vec<CatalogEntry>, String>,
        progress: HashMap<u32, ProgressRecord>,
        status: BackendStatus,
    ) {
        self.catalog_loading = false;
        if self.backend != Some(status) {
            log::info!(
                "Modo {:?} (Supabase: {}, local: {})",
                status.mode,
                if status.remote { "sí" } else { "no" },
                if status.local { "sí" } else { "no" }
            );
        }
        self.backend = Some(status);
        self.progress = progress;

        match catalog {
            Ok(catalog) if catalog.is_empty() => {
                self.catalog.clear();
                self.catalog_error = Some("No hay tests disponibles.".to_owned());
            }
            Ok(catalog) => {
                log::info!("{} tests en el catálogo", catalog.len());
                self.catalog = catalog;
                self.catalog_error = None;
            }
            Err(err) => {
                self.catalog.clear();
                self.catalog_error = Some(format!("Error al cargar los tests: {err}"));
            }
        }
    }

    /// "Comenzar"/"Continuar" (`fresh == false`) o "Empezar de nuevo" (`fresh == true`)
    pub fn open_quiz(&mut self, entry: &CatalogEntry, fresh: bool) {
        self.close_session();
        let discard_draft = if fresh {
            self.progress.get(&entry.id).and_then(|p| p.id)
        } else {
            None
        };
        if fresh {
            self.progress.remove(&entry.id);
        }

        self.next_generation();
        self.screen = Screen::Loading;
        self.message.clear();
        self.submit(StoreJob::OpenQuiz {
            entry: entry.clone(),
            discard_draft,
        });
    }

    pub(super) fn on_quiz_opened(
        &mut self,
        entry: CatalogEntry,
        quiz: Result<QuizFile, String>,
        draft: Option<ProgressRecord>,
        now_ms: u64,
    ) {
        let quiz = match quiz {
            Ok(quiz) => quiz,
            Err(err) => {
                self.catalog_error = Some(format!("No se pudo abrir \"{}\": {err}", entry.title));
                self.screen = Screen::Catalog;
                return;
            }
        };

        let autosave = &self.config.autosave;
        let session = match draft {
            Some(draft) => {
                log::info!(
                    "Reanudando test {} ({} respuestas)",
                    entry.id,
                    draft.answered_count()
                );
                QuizSession::resume(self.generation, quiz, &draft, autosave, now_ms)
            }
            None => {
                log::info!("Comenzando test {}", entry.id);
                QuizSession::start(self.generation, quiz, autosave, now_ms)
            }
        };

        self.view = ViewState::new(session.questions().len(), self.config.view.clone());
        self.surface.reset();
        let resume_index = session.resume_index();
        if session.answers().answered_count() > 0 {
            self.view.resume_at(resume_index);
            self.message = format!("Progreso recuperado: pregunta {}", resume_index + 1);
        } else {
            self.view.resume_at(0);
        }

        self.session = Some(session);
        self.screen = Screen::Quiz;
    }

    /// Cancela los temporizadores y deja la vista en modo lista. Solo una vez por sesión.
    fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop_autosave();
            log::debug!("sesión del test {} cerrada", session.test_id());
        }
        self.view.teardown(&mut self.surface);
    }

    pub fn back_to_catalog(&mut self) {
        self.close_session();
        self.next_generation();
        self.screen = Screen::Catalog;
        self.message.clear();
        self.reload_catalog();
    }

    /// Desde la pantalla de resultados: el mismo test, sin borrador
    pub fn retry_last(&mut self) {
        let entry = self
            .last_result
            .as_ref()
            .and_then(|r| self.catalog.iter().find(|e| e.id == r.entry_id))
            .cloned();
        match entry {
            Some(entry) => self.open_quiz(&entry, false),
            None => self.back_to_catalog(),
        }
    }

    pub fn request_reset(&mut self, entry: &CatalogEntry) {
        self.confirm_reset = Some(entry.clone());
    }

    pub fn confirm_reset(&mut self, ctx: &egui::Context) {
        let Some(entry) = self.confirm_reset.clone() else {
            return;
        };
        egui::Window::new("Empezar de nuevo")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "¿Seguro que quieres borrar el progreso de \"{}\"? Esta acción no se puede deshacer.",
                    entry.title
                ));
                ui.horizontal(|ui| {
                    if ui.button("Sí, empezar de nuevo").clicked() {
                        self.confirm_reset = None;
                        self.open_quiz(&entry, true);
                    }
                    if ui.button("No").clicked() {
                        self.confirm_reset = None;
                    }
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::app_with;
    use super::*;
    use crate::persistence::ProgressStore;
    use crate::persistence::testing::RecordingStore;

    #[test]
    fn resuming_positions_on_first_unanswered() {
        let remote = RecordingStore::default();
        let mut app = app_with(&remote);
        let entry = app.catalog[0].clone();
        remote
            .save(&ProgressRecord::in_progress(None, entry.id, vec![Some(1), Some(2), None]))
            .unwrap();

        app.open_quiz(&entry, false);
        assert_eq!(app.screen, Screen::Loading);
        app.poll_worker(0);

        assert_eq!(app.screen, Screen::Quiz);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.progress_id(), Some(100));
        assert_eq!(session.answers().len(), entry.question_count);
        assert_eq!(app.view.active_index(), 2);
        assert!(app.message.contains('3'));
    }

    #[test]
    fn fresh_start_discards_the_draft() {
        let remote = RecordingStore::default();
        let entry = {
            let app = app_with(&remote);
            app.catalog[0].clone()
        };
        remote
            .save(&ProgressRecord::in_progress(None, entry.id, vec![Some(1)]))
            .unwrap();
        let mut app = app_with(&remote);
        assert!(app.progress.contains_key(&entry.id));

        app.request_reset(&entry);
        app.confirm_reset = None;
        app.open_quiz(&entry, true);
        app.poll_worker(0);

        let session = app.session.as_ref().unwrap();
        assert_eq!(session.progress_id(), None);
        assert_eq!(session.answers().answered_count(), 0);
        assert!(remote.calls().contains(&"delete 100".to_string()));
    }

    #[test]
    fn back_to_catalog_stops_autosave_and_resets_view() {
        let remote = RecordingStore::default();
        let mut app = app_with(&remote);
        let entry = app.catalog[0].clone();
        app.open_quiz(&entry, false);
        app.poll_worker(0);
        app.answer(0, 1, 100);
        app.toggle_view_mode();
        assert_eq!(app.view_mode(), ViewMode::Slider);

        app.back_to_catalog();
        assert!(app.session.is_none());
        assert_eq!(app.view_mode(), ViewMode::List);

        // ni el debounce ni el intervalo llegan a guardar
        app.before_frame(60_000);
        assert!(!remote.calls().iter().any(|c| c.starts_with("save")));
    }

    #[test]
    fn unknown_quiz_file_returns_to_catalog_with_error() {
        let remote = RecordingStore::default();
        let mut app = app_with(&remote);
        let mut entry = app.catalog[0].clone();
        entry.file_reference = "tests/no_existe.json".into();

        app.open_quiz(&entry, false);
        app.poll_worker(0);
        assert_eq!(app.screen, Screen::Catalog);
        assert!(app.catalog_error.is_some());
    }
}
