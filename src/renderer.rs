// src/renderer.rs

use crate::model::{OptionIndex, Question};
use crate::slider::Slide;

#[derive(Clone, Debug, PartialEq)]
pub struct OptionInput {
    pub value: OptionIndex, // 1-based, igual que el radio de la página
    pub label: String,
}

/// Bloque de una pregunta tal y como se pinta
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionBlock {
    pub index: usize,
    pub dom_id: String,
    pub group: String, // nombre compartido por los radios de la pregunta
    pub number: usize, // número "humano" (1,2,3…)
    pub statement: String,
    pub options: Vec<OptionInput>,
    pub is_generated: bool,
}

/// Bloques en el mismo orden que las preguntas: el resto de la aritmética de índices
/// (ancho de slide, posición en el observer) depende de ello.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedQuiz {
    blocks: Vec<QuestionBlock>,
}

pub fn render_questions(questions: &[Question]) -> RenderedQuiz {
    let blocks = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let dom_id = Slide::Question(index).dom_id();
            QuestionBlock {
                index,
                group: dom_id.clone(),
                dom_id,
                number: index + 1,
                statement: question.statement.clone(),
                options: question
                    .options
                    .iter()
                    .enumerate()
                    .map(|(i, label)| OptionInput {
                        value: i as OptionIndex + 1,
                        label: label.clone(),
                    })
                    .collect(),
                is_generated: question.is_generated,
            }
        })
        .collect();

    RenderedQuiz { blocks }
}

impl RenderedQuiz {
    pub fn blocks(&self) -> &[QuestionBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Activación de un radio. Solo pares (pregunta, valor) existentes llegan al callback,
    /// una vez cada uno.
    pub fn dispatch_change(
        &self,
        question: usize,
        value: OptionIndex,
        on_answer_change: impl FnOnce(usize, OptionIndex),
    ) -> bool {
        let known = self
            .blocks
            .get(question)
            .is_some_and(|block| block.options.iter().any(|o| o.value == value));
        if known {
            on_answer_change(question, value);
        } else {
            log::debug!("cambio ignorado: pregunta {question}, opción {value}");
        }
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(statement: &str, options: &[&str], correct: OptionIndex, generated: bool) -> Question {
        Question {
            statement: statement.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_option: correct,
            is_generated: generated,
        }
    }

    #[test]
    fn blocks_follow_question_order_with_stable_ids() {
        let rendered = render_questions(&[
            question("uno", &["a", "b"], 1, false),
            question("dos", &["a", "b", "c"], 3, true),
        ]);

        let ids: Vec<_> = rendered.blocks().iter().map(|b| b.dom_id.as_str()).collect();
        assert_eq!(ids, ["question-0", "question-1"]);
        assert_eq!(rendered.blocks()[1].statement, "dos");
        assert_eq!(rendered.blocks()[1].number, 2);
        assert!(rendered.blocks()[1].is_generated);
    }

    #[test]
    fn option_values_are_one_based_and_grouped_per_question() {
        let rendered = render_questions(&[question("uno", &["a", "b", "c"], 2, false)]);
        let block = &rendered.blocks()[0];
        let values: Vec<_> = block.options.iter().map(|o| o.value).collect();
        assert_eq!(values, [1, 2, 3]);
        assert_eq!(block.group, "question-0");
    }

    #[test]
    fn dispatch_reaches_callback_once_for_known_pairs() {
        let rendered = render_questions(&[question("uno", &["a", "b"], 1, false)]);

        let mut calls = Vec::new();
        assert!(rendered.dispatch_change(0, 2, |q, v| calls.push((q, v))));
        assert!(!rendered.dispatch_change(0, 3, |q, v| calls.push((q, v))));
        assert!(!rendered.dispatch_change(4, 1, |q, v| calls.push((q, v))));
        assert_eq!(calls, vec![(0, 2)]);
    }
}
