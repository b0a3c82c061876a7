use serde::{Deserialize, Serialize};

use crate::model::{OptionIndex, Question};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuestionDetail {
    pub statement: String,
    pub options: Vec<String>,
    pub user_answer: Option<OptionIndex>,
    pub correct_answer: OptionIndex,
    pub is_correct: bool,
    pub is_blank: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GradeResult {
    pub correct_count: usize,
    pub error_count: usize,
    pub blank_count: usize,
    pub total: usize,
    /// Porcentaje 0–100
    pub score: f64,
    pub details: Vec<QuestionDetail>,
}

/// Corrige un intento. Las respuestas que faltan cuentan como en blanco.
pub fn evaluate(questions: &[Question], answers: &[Option<OptionIndex>]) -> GradeResult {
    let mut correct_count = 0;
    let mut error_count = 0;
    let mut blank_count = 0;

    let details = questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let user_answer = answers.get(i).copied().flatten();
            let is_blank = user_answer.is_none();
            let is_correct = user_answer == Some(q.correct_option);

            if is_blank {
                blank_count += 1;
            } else if is_correct {
                correct_count += 1;
            } else {
                error_count += 1;
            }

            QuestionDetail {
                statement: q.statement.clone(),
                options: q.options.clone(),
                user_answer,
                correct_answer: q.correct_option,
                is_correct,
                is_blank,
            }
        })
        .collect();

    let total = questions.len();
    let score = if total == 0 {
        0.0
    } else {
        correct_count as f64 / total as f64 * 100.0
    };

    GradeResult {
        correct_count,
        error_count,
        blank_count,
        total,
        score,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: OptionIndex) -> Question {
        Question {
            statement: format!("correcta {correct}"),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_option: correct,
            is_generated: false,
        }
    }

    #[test]
    fn counts_correct_wrong_and_blank() {
        let questions = vec![question(1), question(2), question(1)];
        let result = evaluate(&questions, &[Some(1), None, Some(2)]);

        assert_eq!(result.correct_count, 1);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.blank_count, 1);
        assert_eq!(result.total, 3);
        assert!((result.score - 100.0 / 3.0).abs() < 1e-9);

        assert!(result.details[0].is_correct);
        assert!(result.details[1].is_blank);
        assert!(!result.details[1].is_correct);
        assert_eq!(result.details[2].user_answer, Some(2));
        assert_eq!(result.details[2].correct_answer, 1);
    }

    #[test]
    fn empty_quiz_scores_zero() {
        let result = evaluate(&[], &[]);
        assert_eq!(result.total, 0);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn short_answer_array_counts_as_blank() {
        let result = evaluate(&[question(1), question(1)], &[Some(1)]);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.blank_count, 1);
    }
}
