#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    use quiz_slider::config::AppConfig;
    use quiz_slider::persistence::LocalStore;

    dotenv::dotenv().ok();
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load();

    let local_dir = config
        .data_dir
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".quiz_slider");
    let local = LocalStore::in_dir(local_dir);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 720.0])
            .with_min_inner_size([480.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Quiz Slider",
        options,
        Box::new(|cc| Ok(Box::new(quiz_slider::build_app(cc, config, local)))),
    )
}

// En web arranca `#[wasm_bindgen(start)]` desde la librería
#[cfg(target_arch = "wasm32")]
fn main() {}
