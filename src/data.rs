// src/data.rs

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{CatalogEntry, QuizFile};

pub const INDEX_FILE: &str = "tests_index.json";
pub const TESTS_SUBDIR: &str = "tests";

/// Tests de demostración embebidos en el binario (sin directorio de datos)
const EMBEDDED_TESTS: &[(&str, &str)] = &[
    ("test1.yaml", include_str!("data/tests/test1.yaml")),
    ("test2.yaml", include_str!("data/tests/test2.yaml")),
    ("bloque1.yaml", include_str!("data/tests/bloque1.yaml")),
];

#[derive(Error, Debug)]
pub enum DataError {
    #[error("No se pudo leer {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML inválido: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{file}: la pregunta {index} no tiene una respuesta correcta válida")]
    InvalidQuestion { file: String, index: usize },

    #[error("{0}: el test no tiene preguntas")]
    NoQuestions(String),

    #[error("Test desconocido: {0}")]
    UnknownQuiz(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DataError + '_ {
    move |source| DataError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Lee un fichero de preguntas; YAML o JSON según la extensión
pub fn parse_quiz(name: &str, text: &str) -> Result<QuizFile, DataError> {
    let quiz: QuizFile = if is_yaml(name) {
        serde_yaml::from_str(text)?
    } else {
        serde_json::from_str(text)?
    };
    validate_quiz(name, &quiz)?;
    Ok(quiz)
}

pub fn validate_quiz(name: &str, quiz: &QuizFile) -> Result<(), DataError> {
    if quiz.questions.is_empty() {
        return Err(DataError::NoQuestions(name.to_string()));
    }
    match quiz.questions.iter().position(|q| !q.is_valid()) {
        Some(index) => Err(DataError::InvalidQuestion {
            file: name.to_string(),
            index,
        }),
        None => Ok(()),
    }
}

fn is_yaml(name: &str) -> bool {
    name.ends_with(".yaml") || name.ends_with(".yml")
}

/// Ficheros que entran en el índice: `test*` o `bloque*`, JSON o YAML
pub fn is_test_file(name: &str) -> bool {
    let supported = name.ends_with(".json") || is_yaml(name);
    supported && name != INDEX_FILE && (name.starts_with("test") || name.starts_with("bloque"))
}

/// Resultado de indexar un directorio de tests
#[derive(Debug, Default)]
pub struct IndexReport {
    pub entries: Vec<CatalogEntry>,
    /// (fichero, motivo)
    pub skipped: Vec<(String, String)>,
}

/// Construye el índice a partir de `(nombre, contenido)` ya filtrados y en orden.
///
/// Los ficheros sin id o sin título reciben uno por posición; el índice sale ordenado por id.
pub fn index_entries<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> IndexReport {
    let mut report = IndexReport::default();

    for (position, (name, text)) in files.into_iter().enumerate() {
        match parse_quiz(name, text) {
            Ok(quiz) => {
                let number = position as u32 + 1;
                let id = if quiz.id == 0 { number } else { quiz.id };
                let title = if quiz.title.trim().is_empty() {
                    format!("Test {number}")
                } else {
                    quiz.title
                };
                report.entries.push(CatalogEntry {
                    id,
                    title,
                    file_reference: format!("{TESTS_SUBDIR}/{name}"),
                    question_count: quiz.questions.len(),
                    law: quiz.law.filter(|l| !l.trim().is_empty()),
                });
            }
            Err(err) => {
                log::warn!("{name} fuera del índice: {err}");
                report.skipped.push((name.to_string(), err.to_string()));
            }
        }
    }

    report.entries.sort_by_key(|e| e.id);
    report
}

/// Indexa `<tests_dir>/test*|bloque*`
pub fn build_index(tests_dir: &Path) -> Result<IndexReport, DataError> {
    let mut names: Vec<String> = fs::read_dir(tests_dir)
        .map_err(io_error(tests_dir))?
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_test_file(name))
        .collect();
    names.sort();

    let mut files = Vec::with_capacity(names.len());
    for name in names {
        let path = tests_dir.join(&name);
        let text = fs::read_to_string(&path).map_err(io_error(&path))?;
        files.push((name, text));
    }

    Ok(index_entries(files.iter().map(|(n, t)| (n.as_str(), t.as_str()))))
}

pub fn write_index(path: &Path, entries: &[CatalogEntry]) -> Result<(), DataError> {
    let json = serde_json::to_string_pretty(entries)?;
    fs::write(path, json).map_err(io_error(path))
}

/// De dónde salen el catálogo local y los ficheros de preguntas
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QuizSource {
    #[default]
    Embedded,
    Directory(PathBuf),
}

impl QuizSource {
    pub fn from_data_dir(data_dir: Option<&Path>) -> Self {
        match data_dir {
            Some(dir) => QuizSource::Directory(dir.to_path_buf()),
            None => QuizSource::Embedded,
        }
    }

    /// Catálogo local. En un directorio usa `tests_index.json` si existe; si no, indexa al vuelo.
    pub fn catalog(&self) -> Result<Vec<CatalogEntry>, DataError> {
        match self {
            QuizSource::Embedded => Ok(index_entries(EMBEDDED_TESTS.iter().copied()).entries),
            QuizSource::Directory(dir) => {
                let index_path = dir.join(INDEX_FILE);
                if index_path.exists() {
                    let text = fs::read_to_string(&index_path).map_err(io_error(&index_path))?;
                    Ok(serde_json::from_str(&text)?)
                } else {
                    Ok(build_index(&dir.join(TESTS_SUBDIR))?.entries)
                }
            }
        }
    }

    /// `file_reference` tal y como aparece en el catálogo (`tests/<fichero>`)
    pub fn load_quiz(&self, file_reference: &str) -> Result<QuizFile, DataError> {
        match self {
            QuizSource::Embedded => {
                let name = file_reference
                    .strip_prefix(&format!("{TESTS_SUBDIR}/"))
                    .unwrap_or(file_reference);
                let (name, text) = EMBEDDED_TESTS
                    .iter()
                    .find(|(n, _)| *n == name)
                    .ok_or_else(|| DataError::UnknownQuiz(file_reference.to_string()))?;
                parse_quiz(name, text)
            }
            QuizSource::Directory(dir) => {
                let path = dir.join(file_reference);
                if !path.is_file() {
                    return Err(DataError::UnknownQuiz(file_reference.to_string()));
                }
                let text = fs::read_to_string(&path).map_err(io_error(&path))?;
                parse_quiz(file_reference, &text)
            }
        }
    }

    /// Carga el test de una entrada del catálogo. Sin id propio, hereda el del catálogo.
    pub fn load_entry(&self, entry: &CatalogEntry) -> Result<QuizFile, DataError> {
        let mut quiz = self.load_quiz(&entry.file_reference)?;
        if quiz.id == 0 {
            quiz.id = entry.id;
        }
        if quiz.title.trim().is_empty() {
            quiz.title = entry.title.clone();
        }
        Ok(quiz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"id": 3, "titulo": "Constitución", "ley": "CE", "preguntas": [
        {"enunciado": "¿?", "opciones": ["a", "b"], "respuesta_correcta": 2}
    ]}"#;

    #[test]
    fn embedded_catalog_is_sorted_and_loadable() {
        let source = QuizSource::Embedded;
        let catalog = source.catalog().unwrap();
        assert_eq!(catalog.len(), EMBEDDED_TESTS.len());
        assert!(catalog.windows(2).all(|w| w[0].id <= w[1].id));

        for entry in &catalog {
            let quiz = source.load_entry(entry).unwrap();
            assert_eq!(quiz.questions.len(), entry.question_count);
        }
    }

    #[test]
    fn index_sorts_by_id_and_skips_invalid_files() {
        let broken = r#"{"preguntas": [{"enunciado": "x", "opciones": ["a"], "respuesta_correcta": 4}]}"#;
        let unnamed = r#"{"preguntas": [{"enunciado": "x", "opciones": ["a"], "respuesta_correcta": 1}]}"#;
        let report = index_entries([
            ("test_a.json", VALID),
            ("test_b.json", "{no es json"),
            ("test_c.json", broken),
            ("test_d.json", unnamed),
        ]);

        let ids: Vec<_> = report.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, [3, 4]);
        assert_eq!(report.entries[1].title, "Test 4");
        assert_eq!(report.entries[0].file_reference, "tests/test_a.json");
        assert_eq!(report.entries[0].law.as_deref(), Some("CE"));
        assert_eq!(report.skipped.len(), 2);
    }

    #[test]
    fn only_test_and_bloque_files_are_indexed() {
        assert!(is_test_file("test12.json"));
        assert!(is_test_file("bloque2.yaml"));
        assert!(!is_test_file("tests_index.json"));
        assert!(!is_test_file("notas.json"));
        assert!(!is_test_file("test1.txt"));
    }

    #[test]
    fn directory_source_indexes_on_the_fly() {
        let dir = std::env::temp_dir().join(format!("quiz_slider_data_{}", std::process::id()));
        let tests = dir.join(TESTS_SUBDIR);
        fs::create_dir_all(&tests).unwrap();
        fs::write(tests.join("test9.json"), VALID).unwrap();

        let source = QuizSource::Directory(dir.clone());
        let catalog = source.catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        let quiz = source.load_entry(&catalog[0]).unwrap();
        assert_eq!(quiz.title, "Constitución");

        write_index(&dir.join(INDEX_FILE), &catalog).unwrap();
        assert_eq!(source.catalog().unwrap(), catalog);
        assert!(matches!(
            source.load_quiz("tests/nada.json"),
            Err(DataError::UnknownQuiz(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }
}
