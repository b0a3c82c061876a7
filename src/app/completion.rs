use super::*;

impl QuizApp {
    /// "Finalizar": corrige, guarda el resultado y muestra la pantalla de resultados.
    pub fn finish_quiz(&mut self, now_ms: u64) {
        let Some(mut session) = self.session.take() else {
            log::error!("Finalizar sin test en curso");
            return;
        };

        session.stop_autosave();
        let grade = session.grade();
        let record = session.completion_record(&grade);
        let backup = session.local_result(&grade, chrono::Utc::now().to_rfc3339());
        log::info!(
            "Test {} finalizado: {}/{} ({:.1}%)",
            session.test_id(),
            grade.correct_count,
            grade.total,
            grade.score
        );

        self.submit(StoreJob::Complete { record, backup });
        self.last_result = Some(LastResult {
            entry_id: session.test_id(),
            title: session.title().to_owned(),
            grade,
            history: Vec::new(),
            stored: None,
            generation: self.generation,
        });

        session.clear_progress_id();
        self.progress.remove(&session.test_id());
        self.view.teardown(&mut self.surface);
        self.message.clear();
        self.screen = Screen::Result;
        log::debug!("sesión cerrada a los {now_ms} ms");
    }
}
