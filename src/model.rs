use serde::{Deserialize, Serialize};

use crate::grading::QuestionDetail;

/// Índice 1-based de opción (opción N ↔ radio con valor N).
pub type OptionIndex = u32;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(alias = "enunciado")]
    pub statement: String,
    #[serde(alias = "opciones")]
    pub options: Vec<String>,
    #[serde(alias = "respuesta_correcta")]
    pub correct_option: OptionIndex,
    #[serde(default, alias = "autogenerado")]
    pub is_generated: bool,
}

impl Question {
    /// `correct_option` apunta a una opción existente
    pub fn is_valid(&self) -> bool {
        self.correct_option >= 1 && (self.correct_option as usize) <= self.options.len()
    }
}

/// Fichero de preguntas de un test
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuizFile {
    /// 0 = sin id; el índice asigna uno por posición
    #[serde(default)]
    pub id: u32,
    #[serde(default, alias = "titulo")]
    pub title: String,
    #[serde(alias = "preguntas")]
    pub questions: Vec<Question>,
    #[serde(default, alias = "ley", skip_serializing_if = "Option::is_none")]
    pub law: Option<String>,
}

/// Entrada del índice de tests
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: u32,
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(alias = "fichero")]
    pub file_reference: String,
    #[serde(alias = "num_preguntas")]
    pub question_count: usize,
    #[serde(default, alias = "ley", skip_serializing_if = "Option::is_none")]
    pub law: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    InProgress,
    Completed,
}

/// Fila de la tabla `results`: borrador en curso o resultado final.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub test_id: u32,
    #[serde(rename = "answers_data", alias = "answers")]
    pub answers: Vec<Option<OptionIndex>>,
    pub total_questions: usize,
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_correct: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ProgressRecord {
    pub fn in_progress(id: Option<i64>, test_id: u32, answers: Vec<Option<OptionIndex>>) -> Self {
        let total_questions = answers.len();
        Self {
            id,
            test_id,
            answers,
            total_questions,
            status: ProgressStatus::InProgress,
            score_percentage: None,
            total_correct: None,
            created_at: None,
        }
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }
}

/// Datos que se envían al completar un test
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompletionRecord {
    pub id: Option<i64>,
    pub test_id: u32,
    pub answers: Vec<Option<OptionIndex>>,
    pub total_correct: usize,
    pub total_questions: usize,
    pub score_percentage: f64,
}

impl CompletionRecord {
    pub fn into_progress(self) -> ProgressRecord {
        ProgressRecord {
            id: self.id,
            test_id: self.test_id,
            answers: self.answers,
            total_questions: self.total_questions,
            status: ProgressStatus::Completed,
            score_percentage: Some(self.score_percentage),
            total_correct: Some(self.total_correct),
            created_at: None,
        }
    }
}

/// Copia local de un resultado (respaldo offline)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LocalResult {
    pub test_id: u32,
    pub title: String,
    pub date: String,
    pub correct: usize,
    pub errors: usize,
    pub blanks: usize,
    pub total: usize,
    pub answers: Vec<Option<OptionIndex>>,
    #[serde(default)]
    pub detail: Option<Vec<QuestionDetail>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub date: String,
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
}

impl HistoryEntry {
    pub fn from_local(result: &LocalResult) -> Self {
        let percentage = if result.total == 0 {
            0.0
        } else {
            result.correct as f64 / result.total as f64 * 100.0
        };
        Self {
            date: result.date.clone(),
            correct: result.correct,
            total: result.total,
            percentage,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Catalog,
    Loading,
    Quiz,
    Result,
}
