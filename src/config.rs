// src/config.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Constantes del slider; ajustadas empíricamente, por eso son configurables.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// Ventana (ms) en la que un retroceso del observer se trata como eco
    pub echo_window_ms: u64,
    /// Espera (ms) antes de ajustar la altura del formulario
    pub settle_delay_ms: u64,
    /// Distancia (px) entre la parte superior del viewport y la tarjeta activa
    pub header_offset: f32,
    /// Margen (px) que se suma a la altura de la tarjeta activa
    pub form_padding: f32,
    /// Fracción visible para considerar dominante una tarjeta
    pub intersection_threshold: f32,
    /// Línea de lectura como fracción de la altura del viewport
    pub focus_ratio: f32,
    /// Por debajo de este scroll (px) la pregunta enfocada es siempre la 0
    pub top_fast_path: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            echo_window_ms: 1000,
            settle_delay_ms: 300,
            header_offset: 100.0,
            form_padding: 150.0,
            intersection_threshold: 0.6,
            focus_ratio: 0.5,
            top_fast_path: 150.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AutosaveConfig {
    pub debounce_ms: u64,
    pub interval_ms: u64,
    /// Tiempo que se muestra el indicador "Guardado"
    pub indicator_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 2_000,
            interval_ms: 30_000,
            indicator_ms: 2_000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct BackendConfig {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
}

impl BackendConfig {
    /// Ambos valores presentes y no vacíos
    pub fn remote_credentials(&self) -> Option<(&str, &str)> {
        let url = self.supabase_url.as_deref().map(str::trim)?;
        let key = self.supabase_key.as_deref().map(str::trim)?;
        if url.is_empty() || key.is_empty() {
            None
        } else {
            Some((url.trim_end_matches('/'), key))
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub view: ViewConfig,
    pub autosave: AutosaveConfig,
    pub backend: BackendConfig,
    /// Carpeta con `tests_index.json` y los ficheros de preguntas
    pub data_dir: Option<PathBuf>,
}

fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_CONFIG_FILE: &str = "quiz_slider.yaml";

impl AppConfig {
    /// Parsea la configuración YAML; los campos ausentes toman su valor por defecto
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// `.env` + fichero YAML opcional + variables de entorno
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        let path = std::env::var("QUIZ_SLIDER_CONFIG")
            .ok()
            .and_then(|p| normalize(&p))
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => match Self::from_yaml(&text) {
                Ok(config) => {
                    log::info!("Configuración cargada desde {path}");
                    config
                }
                Err(err) => {
                    log::warn!("Configuración {path} inválida, usando valores por defecto: {err}");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Endpoint y clave desde build env, querystring, `<meta>` o localStorage
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let mut config = Self::default();
        config.backend.supabase_url = option_env!("SUPABASE_URL")
            .and_then(normalize)
            .or_else(|| web::from_querystring("supabase_url"))
            .or_else(|| web::from_meta("quiz-slider-supabase-url"))
            .or_else(|| web::from_local_storage("quiz_slider_supabase_url"));
        config.backend.supabase_key = option_env!("SUPABASE_ANON_KEY")
            .and_then(normalize)
            .or_else(|| web::from_meta("quiz-slider-supabase-key"))
            .or_else(|| web::from_local_storage("quiz_slider_supabase_key"));
        config
    }

    /// Las variables de entorno tienen prioridad sobre el fichero
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SUPABASE_URL").and_then(|v| normalize(&v)) {
            self.backend.supabase_url = Some(url);
        }
        if let Some(key) = lookup("SUPABASE_ANON_KEY").and_then(|v| normalize(&v)) {
            self.backend.supabase_key = Some(key);
        }
        if let Some(dir) = lookup("QUIZ_DATA_DIR").and_then(|v| normalize(&v)) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::normalize;

    pub fn from_querystring(name: &str) -> Option<String> {
        let window = web_sys::window()?;
        let search = window.location().search().ok()?;
        let query = search.strip_prefix('?').unwrap_or(search.as_str());

        for pair in query.split('&') {
            let (key, value) = match pair.split_once('=') {
                Some((k, v)) => (k, v),
                None => (pair, ""),
            };

            if key == name {
                let decoded = js_sys::decode_uri_component(value).ok()?;
                let decoded = decoded.as_string()?;
                return normalize(&decoded);
            }
        }

        None
    }

    pub fn from_meta(name: &str) -> Option<String> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let meta = document
            .query_selector(&format!("meta[name='{name}']"))
            .ok()??;

        meta.get_attribute("content")
            .as_deref()
            .and_then(normalize)
    }

    pub fn from_local_storage(key: &str) -> Option<String> {
        let window = web_sys::window()?;
        let storage = window.local_storage().ok()??;
        storage.get_item(key).ok()?.as_deref().and_then(normalize)
    }
}
