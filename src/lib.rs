pub mod answers;
pub mod app;
pub mod config;
pub mod data;
pub mod grading;
pub mod model;
pub mod persistence;
pub mod renderer;
pub mod session;
pub mod slider;
pub mod ui;

pub use app::QuizApp;

use app::Preferences;
use config::AppConfig;
use data::QuizSource;
use persistence::{HybridStore, LocalStore, PersistenceWorker};

/// Construye la app a partir de la configuración y de las preferencias guardadas por eframe
pub fn build_app(cc: &eframe::CreationContext<'_>, config: AppConfig, local: LocalStore) -> QuizApp {
    let preferences: Preferences = cc
        .storage
        .and_then(|s| eframe::get_value(s, eframe::APP_KEY))
        .unwrap_or_default();
    ui::apply_theme(&cc.egui_ctx, preferences.dark_mode);

    let source = QuizSource::from_data_dir(config.data_dir.as_deref());
    let store = HybridStore::from_config(&config.backend, source, local);
    let status = store.status();
    log::info!(
        "Persistencia: {:?} (Supabase: {}, local: {})",
        status.mode,
        status.remote,
        status.local
    );

    QuizApp::new(config, PersistenceWorker::spawn(store), preferences)
}

// ===== SOLO PARA WEB =====
#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        eframe::WebLogger::init(log::LevelFilter::Info).ok();

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("sin document"))?;
        let canvas = document
            .get_element_by_id("quiz_canvas")
            .ok_or_else(|| JsValue::from_str("falta el canvas #quiz_canvas"))?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;

        wasm_bindgen_futures::spawn_local(async move {
            let result = eframe::WebRunner::new()
                .start(
                    canvas,
                    eframe::WebOptions::default(),
                    Box::new(|cc| {
                        let config = crate::config::AppConfig::load();
                        let local = crate::persistence::LocalStore::browser();
                        Ok(Box::new(crate::build_app(cc, config, local)))
                    }),
                )
                .await;
            if let Err(err) = result {
                log::error!("No se pudo arrancar la app: {err:?}");
            }
        });
        Ok(())
    }
}
