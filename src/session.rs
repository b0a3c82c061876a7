// src/session.rs

use crate::answers::AnswerStore;
use crate::config::AutosaveConfig;
use crate::grading::{GradeResult, evaluate};
use crate::model::{CompletionRecord, LocalResult, OptionIndex, ProgressRecord, Question, QuizFile};
use crate::renderer::{RenderedQuiz, render_questions};

/// Temporizadores del autoguardado: debounce tras cada respuesta e intervalo fijo.
///
/// Los dos convergen en el mismo guardado; `cancel` los desactiva a la vez.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveTimers {
    debounce_ms: u64,
    interval_ms: u64,
    debounce_due: Option<u64>,
    interval_due: Option<u64>,
}

impl AutosaveTimers {
    pub fn new(config: &AutosaveConfig) -> Self {
        Self {
            debounce_ms: config.debounce_ms,
            interval_ms: config.interval_ms,
            debounce_due: None,
            interval_due: None,
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.debounce_due = None;
        self.interval_due = Some(now_ms + self.interval_ms);
    }

    /// Reinicia el debounce
    pub fn answer_changed(&mut self, now_ms: u64) {
        if self.is_running() {
            self.debounce_due = Some(now_ms + self.debounce_ms);
        }
    }

    /// Guardado inmediato en el siguiente `poll`
    pub fn trigger_now(&mut self, now_ms: u64) {
        if self.is_running() {
            self.debounce_due = Some(now_ms);
        }
    }

    /// `true` si toca guardar. Debounce e intervalo vencidos a la vez cuentan una sola vez.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let mut fire = false;
        if self.debounce_due.is_some_and(|due| due <= now_ms) {
            self.debounce_due = None;
            fire = true;
        }
        if self.interval_due.is_some_and(|due| due <= now_ms) {
            self.interval_due = Some(now_ms + self.interval_ms);
            fire = true;
        }
        fire
    }

    pub fn cancel(&mut self) {
        self.debounce_due = None;
        self.interval_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.interval_due.is_some()
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        match (self.debounce_due, self.interval_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Un test abierto: preguntas, respuestas y el borrador persistido.
#[derive(Debug, Clone)]
pub struct QuizSession {
    generation: u64,
    test_id: u32,
    title: String,
    questions: Vec<Question>,
    rendered: RenderedQuiz,
    answers: AnswerStore,
    progress_id: Option<i64>,
    timers: AutosaveTimers,
    save_in_flight: bool,
    resave_pending: bool,
    indicator_ms: u64,
    saved_until_ms: Option<u64>,
}

impl QuizSession {
    pub fn start(generation: u64, quiz: QuizFile, config: &AutosaveConfig, now_ms: u64) -> Self {
        let answers = AnswerStore::new(quiz.questions.len());
        Self::build(generation, quiz, answers, None, config, now_ms)
    }

    /// Reanuda un borrador: respuestas ajustadas al número de preguntas y mismo id
    pub fn resume(
        generation: u64,
        quiz: QuizFile,
        draft: &ProgressRecord,
        config: &AutosaveConfig,
        now_ms: u64,
    ) -> Self {
        let answers = AnswerStore::restore(&draft.answers, quiz.questions.len());
        Self::build(generation, quiz, answers, draft.id, config, now_ms)
    }

    fn build(
        generation: u64,
        quiz: QuizFile,
        answers: AnswerStore,
        progress_id: Option<i64>,
        config: &AutosaveConfig,
        now_ms: u64,
    ) -> Self {
        let rendered = render_questions(&quiz.questions);
        let mut timers = AutosaveTimers::new(config);
        timers.start(now_ms);
        Self {
            generation,
            test_id: quiz.id,
            title: quiz.title,
            questions: quiz.questions,
            rendered,
            answers,
            progress_id,
            timers,
            save_in_flight: false,
            resave_pending: false,
            indicator_ms: config.indicator_ms,
            saved_until_ms: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn test_id(&self) -> u32 {
        self.test_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn rendered(&self) -> &RenderedQuiz {
        &self.rendered
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn progress_id(&self) -> Option<i64> {
        self.progress_id
    }

    pub fn timers(&self) -> &AutosaveTimers {
        &self.timers
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight
    }

    /// Pregunta donde reanudar: la primera sin responder
    pub fn resume_index(&self) -> usize {
        self.answers.first_unanswered()
    }

    /// Activación de un radio de la pregunta `question`
    pub fn answer(&mut self, question: usize, value: OptionIndex, now_ms: u64) -> bool {
        let answers = &mut self.answers;
        let accepted = self
            .rendered
            .dispatch_change(question, value, |q, v| answers.set(q, Some(v)));
        if accepted {
            self.timers.answer_changed(now_ms);
        }
        accepted
    }

    /// Borrador a guardar; `None` si no hay ninguna respuesta
    pub fn autosave_record(&self) -> Option<ProgressRecord> {
        if self.answers.answered_count() == 0 {
            return None;
        }
        Some(ProgressRecord::in_progress(
            self.progress_id,
            self.test_id,
            self.answers.to_vec(),
        ))
    }

    /// Consulta los temporizadores. Devuelve el borrador si hay que lanzar un guardado.
    pub fn poll_autosave(&mut self, now_ms: u64) -> Option<ProgressRecord> {
        if !self.timers.poll(now_ms) {
            return None;
        }
        if self.save_in_flight {
            self.resave_pending = true;
            return None;
        }
        let record = self.autosave_record()?;
        self.save_in_flight = true;
        Some(record)
    }

    /// Respuesta del guardado lanzado por `poll_autosave`
    pub fn record_save_result(&mut self, saved_id: Option<i64>, now_ms: u64) {
        self.save_in_flight = false;

        match saved_id {
            Some(id) => {
                match self.progress_id {
                    None => log::info!("borrador del test {} creado con id {id}", self.test_id),
                    Some(old) if old != id => {
                        log::info!("borrador del test {} pasa del id {old} al {id}", self.test_id)
                    }
                    Some(_) => {}
                }
                self.progress_id = Some(id);
                self.saved_until_ms = Some(now_ms + self.indicator_ms);
            }
            None => log::warn!("autoguardado del test {} sin confirmar", self.test_id),
        }

        if self.resave_pending {
            self.resave_pending = false;
            self.timers.trigger_now(now_ms);
        }
    }

    /// Indicador "Guardado"
    pub fn shows_saved_indicator(&self, now_ms: u64) -> bool {
        self.saved_until_ms.is_some_and(|until| now_ms < until)
    }

    pub fn next_wakeup_ms(&self) -> Option<u64> {
        let indicator = self.saved_until_ms;
        match (self.timers.next_due_ms(), indicator) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Detiene el autoguardado. Se llama una sola vez al cerrar la sesión.
    pub fn stop_autosave(&mut self) {
        self.timers.cancel();
        self.resave_pending = false;
    }

    pub fn grade(&self) -> GradeResult {
        evaluate(&self.questions, self.answers.as_slice())
    }

    pub fn completion_record(&self, result: &GradeResult) -> CompletionRecord {
        CompletionRecord {
            id: self.progress_id,
            test_id: self.test_id,
            answers: self.answers.to_vec(),
            total_correct: result.correct_count,
            total_questions: result.total,
            score_percentage: result.score,
        }
    }

    pub fn local_result(&self, result: &GradeResult, date: String) -> LocalResult {
        LocalResult {
            test_id: self.test_id,
            title: self.title.clone(),
            date,
            correct: result.correct_count,
            errors: result.error_count,
            blanks: result.blank_count,
            total: result.total,
            answers: self.answers.to_vec(),
            detail: Some(result.details.clone()),
        }
    }

    /// El borrador ya se ha convertido en resultado
    pub fn clear_progress_id(&mut self) {
        self.progress_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> QuizFile {
        let question = |correct| Question {
            statement: "¿?".to_string(),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_option: correct,
            is_generated: false,
        };
        QuizFile {
            id: 7,
            title: "Test 7".to_string(),
            questions: vec![question(1), question(2), question(1)],
            law: None,
        }
    }

    fn config() -> AutosaveConfig {
        AutosaveConfig::default()
    }

    #[test]
    fn nothing_answered_means_no_save() {
        let mut session = QuizSession::start(1, quiz(), &config(), 0);
        assert_eq!(session.autosave_record(), None);

        // vence el intervalo: sigue sin haber nada que guardar
        assert_eq!(session.poll_autosave(30_000), None);
        assert!(!session.is_saving());
    }

    #[test]
    fn debounce_waits_for_quiet_period() {
        let mut session = QuizSession::start(1, quiz(), &config(), 0);
        session.answer(0, 1, 1_000);
        session.answer(1, 3, 2_500);

        assert_eq!(session.poll_autosave(4_000), None);
        let record = session.poll_autosave(4_500).expect("debounce vencido");
        assert_eq!(record.answers, vec![Some(1), Some(3), None]);
        assert_eq!(record.id, None);
        assert_eq!(record.total_questions, 3);
    }

    #[test]
    fn first_save_adopts_id_and_later_saves_update_in_place() {
        let mut session = QuizSession::start(1, quiz(), &config(), 0);
        session.answer(0, 1, 0);
        session.poll_autosave(2_000).expect("primer guardado");
        session.record_save_result(Some(42), 2_100);
        assert_eq!(session.progress_id(), Some(42));
        assert!(session.shows_saved_indicator(3_000));
        assert!(!session.shows_saved_indicator(4_100));

        session.answer(1, 2, 5_000);
        let record = session.poll_autosave(7_000).expect("segundo guardado");
        assert_eq!(record.id, Some(42));
        session.record_save_result(Some(42), 7_050);
        assert_eq!(session.progress_id(), Some(42));
    }

    #[test]
    fn local_id_is_replaced_by_the_remote_one() {
        let mut session = QuizSession::start(1, quiz(), &config(), 0);
        session.answer(0, 1, 0);
        session.poll_autosave(2_000).expect("primer guardado");
        session.record_save_result(Some(-1), 2_100);
        assert_eq!(session.progress_id(), Some(-1));

        session.answer(1, 2, 5_000);
        let record = session.poll_autosave(7_000).expect("segundo guardado");
        assert_eq!(record.id, Some(-1));
        session.record_save_result(Some(108), 7_050);
        assert_eq!(session.progress_id(), Some(108));
    }

    #[test]
    fn triggers_during_flight_resave_afterwards() {
        let mut session = QuizSession::start(1, quiz(), &config(), 0);
        session.answer(0, 1, 0);
        assert!(session.poll_autosave(2_000).is_some());

        session.answer(1, 1, 2_100);
        assert_eq!(session.poll_autosave(4_100), None);

        session.record_save_result(Some(5), 4_200);
        let record = session.poll_autosave(4_200).expect("reguardado");
        assert_eq!(record.id, Some(5));
        assert_eq!(record.answers[1], Some(1));
    }

    #[test]
    fn failed_save_keeps_id_empty() {
        let mut session = QuizSession::start(1, quiz(), &config(), 0);
        session.answer(2, 2, 0);
        session.poll_autosave(2_000);
        session.record_save_result(None, 2_100);
        assert_eq!(session.progress_id(), None);
        assert!(!session.is_saving());
        assert!(!session.shows_saved_indicator(2_200));
    }

    #[test]
    fn stopped_timers_never_fire() {
        let mut session = QuizSession::start(1, quiz(), &config(), 0);
        session.answer(0, 1, 0);
        session.stop_autosave();
        assert_eq!(session.poll_autosave(60_000), None);

        session.answer(1, 1, 61_000);
        assert_eq!(session.poll_autosave(120_000), None);
    }

    #[test]
    fn invalid_option_does_not_touch_answers() {
        let mut session = QuizSession::start(1, quiz(), &config(), 0);
        assert!(!session.answer(0, 9, 0));
        assert_eq!(session.answers().answered_count(), 0);
    }

    #[test]
    fn resume_restores_answers_and_first_unanswered() {
        let draft = ProgressRecord::in_progress(Some(3), 7, vec![Some(1), None]);
        let session = QuizSession::resume(2, quiz(), &draft, &config(), 0);
        assert_eq!(session.answers().as_slice(), &[Some(1), None, None]);
        assert_eq!(session.progress_id(), Some(3));
        assert_eq!(session.resume_index(), 1);
    }

    #[test]
    fn completion_carries_totals_and_progress_id() {
        let draft = ProgressRecord::in_progress(Some(9), 7, vec![Some(1), None, Some(2)]);
        let mut session = QuizSession::resume(2, quiz(), &draft, &config(), 0);
        let result = session.grade();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.blank_count, 1);

        let record = session.completion_record(&result);
        assert_eq!(record.id, Some(9));
        assert_eq!(record.total_correct, 1);
        assert_eq!(record.total_questions, 3);

        let local = session.local_result(&result, "2024-05-01".to_string());
        assert_eq!(local.errors, 1);
        assert_eq!(local.detail.map(|d| d.len()), Some(3));

        session.clear_progress_id();
        assert_eq!(session.progress_id(), None);
    }
}
