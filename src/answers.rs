// src/answers.rs

use crate::model::OptionIndex;

/// Respuestas del usuario, una por pregunta (`None` = en blanco).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    answers: Vec<Option<OptionIndex>>,
}

impl AnswerStore {
    pub fn new(question_count: usize) -> Self {
        Self {
            answers: vec![None; question_count],
        }
    }

    /// Restaura respuestas guardadas ajustando la longitud al número de preguntas
    pub fn restore(saved: &[Option<OptionIndex>], question_count: usize) -> Self {
        let mut answers = saved.to_vec();
        answers.resize(question_count, None);
        Self { answers }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<OptionIndex> {
        self.answers.get(index).copied().flatten()
    }

    /// Índices fuera de rango se ignoran
    pub fn set(&mut self, index: usize, answer: Option<OptionIndex>) {
        if let Some(slot) = self.answers.get_mut(index) {
            *slot = answer;
        }
    }

    pub fn reset(&mut self) {
        self.answers.iter_mut().for_each(|a| *a = None);
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    /// Primer hueco sin responder; 0 si no hay respuestas o están todas
    pub fn first_unanswered(&self) -> usize {
        if self.answered_count() == 0 {
            return 0;
        }
        self.answers.iter().position(Option::is_none).unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[Option<OptionIndex>] {
        &self.answers
    }

    pub fn to_vec(&self) -> Vec<Option<OptionIndex>> {
        self.answers.clone()
    }
}
