use super::*;

/// Fila del catálogo con el estado del borrador
#[derive(Clone, Debug)]
pub struct CatalogRow {
    pub entry: CatalogEntry,
    pub answered: usize,
    pub total: usize,
    pub progress_id: Option<i64>,
}

impl CatalogRow {
    pub fn in_progress(&self) -> bool {
        self.answered > 0
    }

    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.answered as f32 / self.total as f32
        }
    }

    pub fn label(&self) -> String {
        if self.in_progress() {
            format!("{} ({}/{} respondidas)", self.entry.title, self.answered, self.total)
        } else {
            format!("{} ({} preguntas)", self.entry.title, self.entry.question_count)
        }
    }

    pub fn action_label(&self) -> &'static str {
        if self.in_progress() { "Continuar" } else { "Comenzar" }
    }
}

#[derive(Clone, Debug)]
pub struct HistoryRow {
    pub date: String,
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
}

impl HistoryRow {
    /// Fecha RFC3339 a `dd/mm/aaaa hh:mm`; si no se puede parsear, tal cual
    fn format_date(raw: &str) -> String {
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|d| d.with_timezone(&chrono::Local).format("%d/%m/%Y %H:%M").to_string())
            .unwrap_or_else(|_| raw.to_owned())
    }

    pub fn label(&self) -> String {
        format!(
            "{}: {}/{} ({:.1}%)",
            self.date, self.correct, self.total, self.percentage
        )
    }
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            date: Self::format_date(&entry.date),
            correct: entry.correct,
            total: entry.total,
            percentage: entry.percentage,
        }
    }
}

impl QuizApp {
    pub fn catalog_rows(&self) -> Vec<CatalogRow> {
        self.catalog
            .iter()
            .map(|entry| {
                let draft = self.progress.get(&entry.id);
                CatalogRow {
                    entry: entry.clone(),
                    answered: draft.map_or(0, ProgressRecord::answered_count),
                    total: draft.map_or(entry.question_count, |d| d.total_questions.max(entry.question_count)),
                    progress_id: draft.and_then(|d| d.id),
                }
            })
            .collect()
    }

    pub fn history_rows(&self) -> Vec<HistoryRow> {
        self.last_result
            .as_ref()
            .map(|r| r.history.iter().map(HistoryRow::from).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::app_with;
    use super::*;
    use crate::persistence::ProgressStore;
    use crate::persistence::testing::RecordingStore;

    #[test]
    fn catalog_rows_show_draft_progress() {
        let remote = RecordingStore::default();
        let first_id = app_with(&remote).catalog[0].id;
        remote
            .save(&ProgressRecord::in_progress(None, first_id, vec![Some(1), None, Some(3)]))
            .unwrap();

        let app = app_with(&remote);
        let rows = app.catalog_rows();
        assert_eq!(rows.len(), app.catalog.len());

        let first = &rows[0];
        assert!(first.in_progress());
        assert_eq!(first.answered, 2);
        assert_eq!(first.action_label(), "Continuar");
        assert_eq!(first.progress_id, Some(100));
        assert!(first.fraction() > 0.0);

        assert!(rows[1..].iter().all(|r| !r.in_progress()));
    }

    #[test]
    fn history_row_keeps_unparseable_dates() {
        let row = HistoryRow::from(&HistoryEntry {
            date: "ayer".into(),
            correct: 3,
            total: 4,
            percentage: 75.0,
        });
        assert_eq!(row.label(), "ayer: 3/4 (75.0%)");
    }
}
