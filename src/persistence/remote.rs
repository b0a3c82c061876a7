// src/persistence/remote.rs

use std::collections::HashMap;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;

use super::{ProgressStore, StoreError, latest_per_test};
use crate::model::{
    CatalogEntry, CompletionRecord, HistoryEntry, OptionIndex, ProgressRecord, ProgressStatus,
};

const TESTS_TABLE: &str = "tests";
const RESULTS_TABLE: &str = "results";

#[derive(Debug, Serialize)]
struct DraftUpdate<'a> {
    answers_data: &'a [Option<OptionIndex>],
    total_questions: usize,
}

/// Fila nueva o actualización completa de `results`. Los `None` viajan como `null`.
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    test_id: Option<u32>,
    status: ProgressStatus,
    answers_data: &'a [Option<OptionIndex>],
    total_questions: usize,
    score_percentage: Option<f64>,
    total_correct: Option<usize>,
}

/// Tablas `tests` y `results` a través de la API REST de Supabase
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, StoreError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self.authorized(request).send()?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().unwrap_or_default();
            log::debug!("Supabase HTTP {status}: {}", body.trim());
            Err(StoreError::Supabase {
                status: status.as_u16(),
            })
        }
    }

    fn select(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<ProgressRecord>, StoreError> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(query);
        Ok(self.send(request)?.json()?)
    }

    /// Insert/update con `Prefer: return=representation`: devuelve la fila resultante
    fn write_one<T: Serialize>(&self, request: RequestBuilder, body: &T) -> Result<ProgressRecord, StoreError> {
        let request = request.header("Prefer", "return=representation").json(body);
        let rows: Vec<ProgressRecord> = self.send(request)?.json()?;
        rows.into_iter().next().ok_or(StoreError::EmptyResponse)
    }

    fn insert_result(&self, row: &ResultRow) -> Result<ProgressRecord, StoreError> {
        self.write_one(self.client.post(self.table_url(RESULTS_TABLE)), row)
    }

    fn update_result<T: Serialize>(&self, id: i64, body: &T) -> Result<ProgressRecord, StoreError> {
        let request = self
            .client
            .patch(self.table_url(RESULTS_TABLE))
            .query(&[("id", format!("eq.{id}"))]);
        self.write_one(request, body)
    }
}

fn history_entry(row: &ProgressRecord) -> HistoryEntry {
    HistoryEntry {
        date: row.created_at.clone().unwrap_or_default(),
        correct: row.total_correct.unwrap_or(0),
        total: row.total_questions,
        percentage: row.score_percentage.unwrap_or(0.0),
    }
}

impl ProgressStore for SupabaseStore {
    fn name(&self) -> &'static str {
        "supabase"
    }

    fn available(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let request = self
            .client
            .get(self.table_url(TESTS_TABLE))
            .query(&[("select", "*"), ("order", "id.asc")]);
        Ok(self.send(request)?.json()?)
    }

    fn find(&self, test_id: u32) -> Result<Option<ProgressRecord>, StoreError> {
        let rows = self.select(
            RESULTS_TABLE,
            &[
                ("test_id", format!("eq.{test_id}")),
                ("status", "eq.in_progress".to_string()),
                ("order", "id.desc".to_string()),
                ("limit", "1".to_string()),
            ],
        )?;
        if let Some(row) = rows.first() {
            log::info!("Test {test_id} tiene progreso guardado ({} respuestas)", row.answered_count());
        }
        Ok(rows.into_iter().next())
    }

    fn save(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError> {
        match record.id {
            Some(id) => {
                let saved = self.update_result(
                    id,
                    &DraftUpdate {
                        answers_data: &record.answers,
                        total_questions: record.answers.len(),
                    },
                )?;
                log::debug!("Progreso actualizado para resultado ID: {id}");
                Ok(saved)
            }
            None => {
                let saved = self.insert_result(&ResultRow {
                    test_id: Some(record.test_id),
                    status: ProgressStatus::InProgress,
                    answers_data: &record.answers,
                    total_questions: record.answers.len(),
                    score_percentage: None,
                    total_correct: None,
                })?;
                log::info!("Nuevo progreso creado con ID: {:?}", saved.id);
                Ok(saved)
            }
        }
    }

    fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let request = self
            .client
            .delete(self.table_url(RESULTS_TABLE))
            .query(&[("id", format!("eq.{id}"))]);
        self.send(request)?;
        log::info!("Progreso eliminado (ID: {id})");
        Ok(true)
    }

    fn complete(&self, record: &CompletionRecord) -> Result<ProgressRecord, StoreError> {
        let row = ResultRow {
            test_id: match record.id {
                Some(_) => None,
                None => Some(record.test_id),
            },
            status: ProgressStatus::Completed,
            answers_data: &record.answers,
            total_questions: record.total_questions,
            score_percentage: Some(record.score_percentage),
            total_correct: Some(record.total_correct),
        };
        match record.id {
            Some(id) => self.update_result(id, &row),
            None => self.insert_result(&row),
        }
    }

    fn history(&self, test_id: u32, limit: usize) -> Result<Vec<HistoryEntry>, StoreError> {
        let rows = self.select(
            RESULTS_TABLE,
            &[
                ("test_id", format!("eq.{test_id}")),
                ("status", "eq.completed".to_string()),
                ("order", "id.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )?;
        Ok(rows.iter().map(history_entry).collect())
    }

    fn all_progress(&self) -> Result<HashMap<u32, ProgressRecord>, StoreError> {
        let rows = self.select(
            RESULTS_TABLE,
            &[
                ("status", "eq.in_progress".to_string()),
                ("order", "id.desc".to_string()),
            ],
        )?;
        Ok(latest_per_test(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_urls_ignore_trailing_slash() {
        let store = SupabaseStore::new("https://demo.supabase.co/", "anon").unwrap();
        assert_eq!(store.table_url("results"), "https://demo.supabase.co/rest/v1/results");
        assert!(store.available());
    }

    #[test]
    fn new_draft_sends_explicit_nulls() {
        let answers = [Some(2), None];
        let row = ResultRow {
            test_id: Some(4),
            status: ProgressStatus::InProgress,
            answers_data: &answers,
            total_questions: 2,
            score_percentage: None,
            total_correct: None,
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["status"], "in_progress");
        assert_eq!(value["answers_data"], serde_json::json!([2, null]));
        assert!(value["score_percentage"].is_null());
        assert!(value.as_object().unwrap().contains_key("total_correct"));
    }

    #[test]
    fn completed_rows_map_to_history() {
        let row: ProgressRecord = serde_json::from_value(serde_json::json!({
            "id": 8,
            "test_id": 1,
            "answers_data": [1, 2, null],
            "total_questions": 3,
            "status": "completed",
            "score_percentage": 66.7,
            "total_correct": 2,
            "created_at": "2024-03-01T09:00:00+00:00"
        }))
        .unwrap();

        let entry = history_entry(&row);
        assert_eq!(entry.correct, 2);
        assert_eq!(entry.total, 3);
        assert_eq!(entry.percentage, 66.7);
        assert_eq!(entry.date, "2024-03-01T09:00:00+00:00");
    }
}
