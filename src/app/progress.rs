use super::*;

impl QuizApp {
    /// Lanza el autoguardado si algún temporizador ha vencido
    pub fn poll_autosave(&mut self, now_ms: u64) {
        let Some(record) = self.session.as_mut().and_then(|s| s.poll_autosave(now_ms)) else {
            return;
        };
        log::debug!(
            "autoguardado del test {} ({} respuestas)",
            record.test_id,
            record.answered_count()
        );
        self.submit(StoreJob::Save(record));
    }

    pub fn shows_saved_indicator(&self, now_ms: u64) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.shows_saved_indicator(now_ms))
    }

    /// "respondidas / total" del test abierto
    pub fn answered_summary(&self) -> Option<(usize, usize)> {
        let session = self.session.as_ref()?;
        Some((session.answers().answered_count(), session.answers().len()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::app_with;
    use super::*;
    use crate::persistence::is_local_id;
    use crate::persistence::testing::RecordingStore;

    fn saves(remote: &RecordingStore) -> Vec<String> {
        remote
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("save"))
            .collect()
    }

    #[test]
    fn debounced_answers_create_then_update_one_draft() {
        let remote = RecordingStore::default();
        let mut app = app_with(&remote);
        let entry = app.catalog[0].clone();
        app.open_quiz(&entry, false);
        app.poll_worker(0);

        app.answer(0, 2, 1_000);
        app.before_frame(2_999);
        assert!(saves(&remote).is_empty());

        app.before_frame(3_000);
        app.poll_worker(3_010);
        assert_eq!(saves(&remote), vec!["save None"]);
        assert_eq!(app.session.as_ref().and_then(QuizSession::progress_id), Some(100));
        assert!(app.shows_saved_indicator(4_000));

        app.answer(1, 1, 5_000);
        app.before_frame(7_000);
        app.poll_worker(7_010);
        assert_eq!(saves(&remote), vec!["save None", "save Some(100)"]);
        assert_eq!(app.answered_summary(), Some((2, entry.question_count)));
    }

    #[test]
    fn interval_without_answers_saves_nothing() {
        let remote = RecordingStore::default();
        let mut app = app_with(&remote);
        let entry = app.catalog[0].clone();
        app.open_quiz(&entry, false);
        app.poll_worker(0);

        app.before_frame(30_000);
        app.before_frame(60_000);
        assert!(saves(&remote).is_empty());
    }

    #[test]
    fn failed_remote_save_falls_back_to_local_draft() {
        let remote = RecordingStore::default();
        let mut app = app_with(&remote);
        let entry = app.catalog[0].clone();
        app.open_quiz(&entry, false);
        app.poll_worker(0);
        remote.set_failing(true);

        app.answer(0, 1, 0);
        app.before_frame(2_000);
        app.poll_worker(2_010);

        // el id lo asigna el almacenamiento local
        let id = app.session.as_ref().and_then(QuizSession::progress_id);
        assert!(id.is_some_and(is_local_id));
    }

    #[test]
    fn recovered_remote_never_receives_a_local_id() {
        let remote = RecordingStore::default();
        remote
            .rows
            .lock()
            .unwrap()
            .push(ProgressRecord::in_progress(Some(1), 999, vec![Some(3)]));
        let mut app = app_with(&remote);
        let entry = app.catalog[0].clone();
        app.open_quiz(&entry, false);
        app.poll_worker(0);

        remote.set_failing(true);
        app.answer(0, 1, 0);
        app.before_frame(2_000);
        app.poll_worker(2_010);
        assert!(app.session.as_ref().and_then(QuizSession::progress_id).is_some_and(is_local_id));

        remote.set_failing(false);
        app.answer(1, 2, 3_000);
        app.before_frame(5_000);
        app.poll_worker(5_010);

        assert_eq!(saves(&remote), vec!["save None", "save None"]);
        let id = app.session.as_ref().and_then(QuizSession::progress_id);
        assert!(id.is_some_and(|id| !is_local_id(id)));

        let rows = remote.rows.lock().unwrap();
        let other = rows.iter().find(|r| r.id == Some(1)).unwrap();
        assert_eq!(other.test_id, 999);
        assert_eq!(other.answers, vec![Some(3)]);
        assert!(rows.iter().any(|r| r.id == id && r.test_id == entry.id));
    }
}
