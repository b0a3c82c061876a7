use crate::QuizApp;
use crate::ui::layout::centered_panel;
use egui::{Color32, Context, RichText, ScrollArea};

pub fn ui_result(app: &mut QuizApp, ctx: &Context) {
    let Some(result) = app.last_result.clone() else {
        app.back_to_catalog();
        return;
    };
    let history = app.history_rows();
    let mut retry = false;
    let mut back = false;

    centered_panel(ctx, 560.0, 640.0, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("¡Test finalizado!");
            ui.label(&result.title);
            ui.add_space(10.0);

            let grade = &result.grade;
            ui.label(RichText::new(format!("{:.1}%", grade.score)).heading().strong());
            ui.label(format!(
                "✅ {} correctas   ❌ {} errores   ⬜ {} en blanco   ({} preguntas)",
                grade.correct_count, grade.error_count, grade.blank_count, grade.total
            ));

            match result.stored {
                None => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Guardando resultado…");
                    });
                }
                Some(false) => {
                    ui.label(RichText::new("No se pudo guardar el resultado").color(Color32::LIGHT_RED));
                }
                Some(true) => {}
            }
        });

        ui.add_space(10.0);
        ui.separator();
        ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
            for (i, detail) in result.grade.details.iter().enumerate() {
                let (mark, color) = if detail.is_blank {
                    ("⬜", ui.visuals().weak_text_color())
                } else if detail.is_correct {
                    ("✅", Color32::LIGHT_GREEN)
                } else {
                    ("❌", Color32::LIGHT_RED)
                };
                ui.label(RichText::new(format!("{mark} {}. {}", i + 1, detail.statement)).color(color));

                let option = |n: u32| {
                    (n as usize)
                        .checked_sub(1)
                        .and_then(|i| detail.options.get(i))
                        .cloned()
                        .unwrap_or_default()
                };
                if let Some(answer) = detail.user_answer.filter(|_| !detail.is_correct) {
                    ui.label(format!("    Tu respuesta: {}", option(answer)));
                }
                ui.label(format!("    Correcta: {}", option(detail.correct_answer)));
                ui.add_space(4.0);
            }
        });

        if !history.is_empty() {
            ui.separator();
            ui.label(RichText::new("Últimos intentos").strong());
            for row in &history {
                ui.label(row.label());
            }
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            retry = ui.button("🔁 Repetir test").clicked();
            back = ui.button("📋 Volver al catálogo").clicked();
        });
    });

    if retry {
        app.retry_last();
    } else if back {
        app.back_to_catalog();
    }
}
