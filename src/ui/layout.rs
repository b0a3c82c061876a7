use egui::{CentralPanel, Context, Frame, RichText, Ui};

use crate::QuizApp;
use crate::model::Screen;
use crate::persistence::BackendMode;
use crate::slider::ViewMode;

pub fn top_panel(app: &mut QuizApp, ctx: &Context, now_ms: u64) {
    egui::TopBottomPanel::top("menu_panel").show(ctx, |ui| {
        ui.horizontal_centered(|ui| {
            match app.screen {
                Screen::Quiz => {
                    if ui.button("📋 Volver al catálogo").clicked() {
                        app.back_to_catalog();
                        return;
                    }

                    let toggle_label = match app.view_mode() {
                        ViewMode::List => "🎞 Vista slider",
                        ViewMode::Slider => "📜 Vista lista",
                    };
                    if ui.button(toggle_label).clicked() {
                        app.toggle_view_mode();
                        ctx.request_repaint();
                    }

                    if let Some((answered, total)) = app.answered_summary() {
                        ui.label(format!("{answered}/{total} respondidas"));
                    }

                    if app.session.as_ref().is_some_and(|s| s.is_saving()) {
                        ui.spinner();
                        ui.label("Guardando…");
                    } else if app.shows_saved_indicator(now_ms) {
                        ui.label(RichText::new("💾 Guardado").color(egui::Color32::LIGHT_GREEN));
                    }
                }
                Screen::Result | Screen::Loading => {
                    if ui.button("📋 Volver al catálogo").clicked() {
                        app.back_to_catalog();
                    }
                }
                Screen::Catalog => {
                    if ui.button("🔄 Recargar").clicked() {
                        app.reload_catalog();
                    }
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(status) = app.backend {
                    match status.mode {
                        BackendMode::Online => ui.label("🌐 Online"),
                        BackendMode::Offline => ui
                            .label("📴 Offline")
                            .on_hover_text("Sin Supabase: el progreso se guarda en este equipo"),
                    };
                }
            });
        });
    });
}

pub fn bottom_panel(app: &mut QuizApp, ctx: &Context) {
    egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
        // ----------- BOTONES DE TEMA -----------
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("🌙 Modo oscuro").clicked() {
                app.preferences.dark_mode = true;
                super::apply_theme(ctx, true);
            }
            if ui.button("☀Modo claro").clicked() {
                app.preferences.dark_mode = false;
                super::apply_theme(ctx, false);
            }
        });
    });
}

/// Panel centrado tanto vertical como horizontalmente,
/// con un tamaño de contenido máximo y un bloque interior `inner`.
pub fn centered_panel(ctx: &Context, est_height: f32, max_width: f32, inner: impl FnOnce(&mut Ui)) {
    CentralPanel::default().show(ctx, |ui| {
        // Espacio vertical para centrar
        let extra = ((ui.available_height() - est_height) / 2.0).max(0.0);
        ui.add_space(extra);
        ui.vertical_centered(|ui| {
            Frame::default()
                .fill(ui.visuals().window_fill())
                .inner_margin(egui::Margin::symmetric(16, 16))
                .show(ui, |ui| {
                    let w = ui.available_width().min(max_width);
                    ui.set_width(w);
                    inner(ui);
                });
        });
        ui.add_space(extra);
    });
}
