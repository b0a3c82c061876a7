// src/slider/focus.rs

use super::surface::SlideGeometry;
use crate::config::ViewConfig;

/// Pregunta que se está leyendo en modo lista.
///
/// `geometries` son las tarjetas de pregunta en orden de documento, relativas al viewport.
/// Cerca del inicio del documento devuelve 0 sin mirar la geometría; si no, la primera
/// tarjeta cuyo borde inferior queda por debajo de la línea de lectura.
pub fn resolve_focus_index(
    geometries: &[SlideGeometry],
    viewport_height: f32,
    scroll_y: f32,
    config: &ViewConfig,
) -> usize {
    if scroll_y < config.top_fast_path || geometries.is_empty() {
        return 0;
    }

    let focus_line = viewport_height * config.focus_ratio;
    geometries
        .iter()
        .position(|g| g.bottom > focus_line)
        .unwrap_or(geometries.len() - 1)
}

/// Ancho de paso entre slides: diferencia de offset entre las dos primeras (incluye el
/// hueco entre tarjetas). Con menos de dos slides, el ancho del contenedor.
pub fn slide_unit_width(offsets: &[f32], container_width: f32) -> f32 {
    match offsets {
        [first, second, ..] => second - first,
        _ => container_width,
    }
}

/// Slide visible a partir del scroll horizontal
pub fn resolve_slider_index(scroll_left: f32, unit: f32) -> usize {
    if unit <= 0.0 || !scroll_left.is_finite() {
        return 0;
    }
    (scroll_left / unit).round().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bottoms(values: &[f32]) -> Vec<SlideGeometry> {
        values
            .iter()
            .map(|&bottom| SlideGeometry {
                top: bottom - 100.0,
                bottom,
            })
            .collect()
    }

    #[test]
    fn first_bottom_below_reading_line_wins() {
        let config = ViewConfig::default();
        let geometries = bottoms(&[100.0, 650.0, 1200.0, 1500.0]);
        // línea de lectura = 500
        assert_eq!(resolve_focus_index(&geometries, 1000.0, 900.0, &config), 1);
    }

    #[test]
    fn near_top_is_always_first_question() {
        let config = ViewConfig::default();
        let geometries = bottoms(&[-300.0, -100.0, 900.0]);
        assert_eq!(resolve_focus_index(&geometries, 1000.0, 149.0, &config), 0);
    }

    #[test]
    fn everything_scrolled_past_returns_last() {
        let config = ViewConfig::default();
        let geometries = bottoms(&[100.0, 200.0, 300.0]);
        assert_eq!(resolve_focus_index(&geometries, 1000.0, 2000.0, &config), 2);
    }

    #[test]
    fn no_questions_returns_zero() {
        assert_eq!(resolve_focus_index(&[], 1000.0, 2000.0, &ViewConfig::default()), 0);
    }

    #[test]
    fn unit_accounts_for_gap() {
        assert_eq!(slide_unit_width(&[0.0, 1080.0, 2160.0], 1000.0), 1080.0);
        assert_eq!(slide_unit_width(&[0.0], 1000.0), 1000.0);
        assert_eq!(resolve_slider_index(1080.0, 1080.0), 1);
        assert_eq!(resolve_slider_index(1700.0, 1080.0), 2);
    }

    #[test]
    fn degenerate_unit_resolves_to_first_slide() {
        assert_eq!(resolve_slider_index(500.0, 0.0), 0);
        assert_eq!(resolve_slider_index(-20.0, 100.0), 0);
    }
}
