use crate::QuizApp;
use crate::ui::layout::centered_panel;
use egui::Context;

pub fn ui_loading(app: &mut QuizApp, ctx: &Context) {
    if app.is_busy() {
        ctx.request_repaint();
    }
    centered_panel(ctx, 80.0, 320.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.spinner();
            ui.add_space(8.0);
            ui.label("Cargando test…");
        });
    });
}
