use crate::QuizApp;
use crate::app::CatalogRow;
use egui::{Button, CentralPanel, Color32, Context, ProgressBar, RichText, ScrollArea, Vec2};

enum CatalogAction {
    Open(CatalogRow),
    Reset(CatalogRow),
    Retry,
    Dismiss,
}

pub fn ui_catalog(app: &mut QuizApp, ctx: &Context) {
    let rows = app.catalog_rows();
    let mut action = None;

    CentralPanel::default().show(ctx, |ui| {
        let max_width = 640.0;
        let content_width = ui.available_width().min(max_width);

        ui.vertical_centered(|ui| {
            ui.heading("📚 Tests disponibles");
            ui.add_space(12.0);

            if app.catalog_loading && rows.is_empty() {
                ui.spinner();
                ui.label("Cargando tests…");
                return;
            }

            if let Some(error) = &app.catalog_error {
                ui.label(RichText::new(error).color(Color32::LIGHT_RED));
                ui.horizontal(|ui| {
                    if ui.button("Reintentar").clicked() {
                        action = Some(CatalogAction::Retry);
                    }
                    if ui.button("Cerrar").clicked() {
                        action = Some(CatalogAction::Dismiss);
                    }
                });
                ui.add_space(12.0);
            }
        });

        ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
            ui.vertical_centered(|ui| {
                for row in &rows {
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(content_width);
                        ui.label(RichText::new(row.label()).strong());
                        if let Some(law) = &row.entry.law {
                            ui.label(RichText::new(law).small().weak());
                        }
                        if row.in_progress() {
                            ui.add(
                                ProgressBar::new(row.fraction())
                                    .desired_width(content_width)
                                    .text(format!("{}/{}", row.answered, row.total)),
                            );
                        }

                        ui.horizontal(|ui| {
                            let open = Button::new(row.action_label()).min_size(Vec2::new(140.0, 32.0));
                            if ui.add(open).clicked() {
                                action = Some(CatalogAction::Open(row.clone()));
                            }
                            if row.in_progress() {
                                let reset = Button::new("⟲ Empezar de nuevo")
                                    .min_size(Vec2::new(140.0, 32.0))
                                    .fill(Color32::DARK_RED);
                                if ui.add(reset).clicked() {
                                    action = Some(CatalogAction::Reset(row.clone()));
                                }
                            }
                        });
                    });
                    ui.add_space(8.0);
                }
            });
        });
    });

    match action {
        Some(CatalogAction::Open(row)) => app.open_quiz(&row.entry, false),
        Some(CatalogAction::Reset(row)) => app.request_reset(&row.entry),
        Some(CatalogAction::Retry) => app.reload_catalog(),
        Some(CatalogAction::Dismiss) => app.catalog_error = None,
        None => {}
    }
}
