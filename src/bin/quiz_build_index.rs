// Regenera `tests_index.json` a partir de los ficheros `test*`/`bloque*` de `<data>/tests`.
//
// Uso: quiz_build_index [carpeta de datos]   (por defecto QUIZ_DATA_DIR o ".")

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use quiz_slider::data::{INDEX_FILE, TESTS_SUBDIR, build_index, write_index};
    use std::path::PathBuf;

    dotenv::dotenv().ok();
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let data_dir = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("QUIZ_DATA_DIR").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let report = build_index(&data_dir.join(TESTS_SUBDIR))?;
    for (file, reason) in &report.skipped {
        log::warn!("omitido {file}: {reason}");
    }
    for entry in &report.entries {
        log::info!(
            "{:>3}  {}  ({} preguntas)  {}",
            entry.id,
            entry.title,
            entry.question_count,
            entry.file_reference
        );
    }

    let index_path = data_dir.join(INDEX_FILE);
    write_index(&index_path, &report.entries)?;
    log::info!(
        "{} tests indexados en {} ({} omitidos)",
        report.entries.len(),
        index_path.display(),
        report.skipped.len()
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
