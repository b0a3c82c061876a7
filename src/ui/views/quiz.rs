use crate::QuizApp;
use crate::answers::AnswerStore;
use crate::renderer::QuestionBlock;
use crate::slider::{ControlsVisibility, FinishPlacement, NavButton};
use crate::ui::surface::EguiSurface;
use egui::scroll_area::ScrollBarVisibility;
use egui::{Align, Button, CentralPanel, Color32, Context, Layout, RichText, ScrollArea, Ui, Vec2, vec2};

/// Lo que el usuario ha pulsado en este frame; se aplica después de pintar
enum QuizAction {
    Answer(usize, u32),
    Nav(NavButton),
    Finish,
}

pub fn ui_quiz(app: &mut QuizApp, ctx: &Context, now_ms: u64) {
    let mut actions = Vec::new();

    CentralPanel::default().show(ctx, |ui| {
        let Some(session) = app.session.as_ref() else {
            ui.spinner();
            return;
        };
        let surface = &mut app.surface;
        let blocks = session.rendered().blocks();
        let answers = session.answers();
        let controls = app.view.controls();
        let active = app.view.active_index();

        let mut page = ScrollArea::vertical()
            .id_salt("quiz_page")
            .auto_shrink([false; 2]);
        if let Some(y) = surface.take_scroll_y() {
            page = page.vertical_scroll_offset(y);
        }

        let output = page.show(ui, |ui| {
            surface.begin_page(ui.clip_rect(), blocks.len());
            ui.heading(session.title());
            if !app.message.is_empty() {
                ui.label(RichText::new(&app.message).color(Color32::LIGHT_BLUE));
            }
            ui.add_space(8.0);

            if surface.is_slider_layout() {
                slider_form(ui, surface, blocks, answers, &mut actions);
            } else {
                list_form(ui, surface, blocks, answers, &mut actions);
            }
        });
        surface.end_page(output.state.offset.y, output.inner_rect);

        if surface.is_slider_layout() {
            ui.separator();
            slider_controls(ui, controls, active, blocks.len(), &mut actions);
        }
    });

    for action in actions {
        match action {
            QuizAction::Answer(question, value) => app.answer(question, value, now_ms),
            QuizAction::Nav(button) => app.press(button, now_ms),
            QuizAction::Finish => app.finish_quiz(now_ms),
        }
    }
}

fn question_card(ui: &mut Ui, block: &QuestionBlock, answer: Option<u32>, actions: &mut Vec<QuizAction>) {
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::symmetric(12, 10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal_wrapped(|ui| {
                ui.label(RichText::new(format!("{}.", block.number)).strong());
                ui.label(RichText::new(&block.statement).strong());
            });
            if block.is_generated {
                ui.label(RichText::new("🤖 Pregunta autogenerada").small().weak());
            }
            ui.add_space(6.0);
            for option in &block.options {
                if ui.radio(answer == Some(option.value), &option.label).clicked() {
                    actions.push(QuizAction::Answer(block.index, option.value));
                }
            }
        });
}

fn list_form(
    ui: &mut Ui,
    surface: &mut EguiSurface,
    blocks: &[QuestionBlock],
    answers: &AnswerStore,
    actions: &mut Vec<QuizAction>,
) {
    for block in blocks {
        let rect = ui
            .scope(|ui| question_card(ui, block, answers.get(block.index), actions))
            .response
            .rect;
        surface.record_question(block.index, rect);
        ui.add_space(10.0);
    }

    if surface.finish_placement() == FinishPlacement::AfterForm {
        let response = ui.add_sized([220.0, 40.0], Button::new("🏁 Finalizar test"));
        surface.record_finish(response.rect);
        if response.clicked() {
            actions.push(QuizAction::Finish);
        }
    }
}

fn slider_form(
    ui: &mut Ui,
    surface: &mut EguiSurface,
    blocks: &[QuestionBlock],
    answers: &AnswerStore,
    actions: &mut Vec<QuizAction>,
) {
    let width = ui.available_width();
    let mut area = ScrollArea::horizontal()
        .id_salt("quiz_slider")
        .auto_shrink([false, true])
        .scroll_bar_visibility(ScrollBarVisibility::AlwaysHidden);
    if let Some(height) = surface.form_height() {
        area = area.max_height(height);
    }
    if let Some(x) = surface.take_scroll_left() {
        area = area.horizontal_scroll_offset(x);
    }

    let output = area.show(ui, |ui| {
        surface.begin_slider(ui.max_rect().left(), width);
        ui.horizontal_top(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            for block in blocks {
                let rect = ui
                    .allocate_ui_with_layout(vec2(width, 0.0), Layout::top_down(Align::Min), |ui| {
                        ui.set_width(width);
                        question_card(ui, block, answers.get(block.index), actions);
                    })
                    .response
                    .rect;
                surface.record_question(block.index, rect);
                surface.record_slide(rect);
            }

            if surface.finish_placement() == FinishPlacement::TrailingSlide {
                let rect = ui
                    .allocate_ui_with_layout(vec2(width, 0.0), Layout::top_down(Align::Center), |ui| {
                        ui.set_width(width);
                        ui.add_space(24.0);
                        ui.label("Has llegado al final del test.");
                        ui.add_space(8.0);
                        if ui.add_sized([220.0, 40.0], Button::new("🏁 Finalizar test")).clicked() {
                            actions.push(QuizAction::Finish);
                        }
                    })
                    .response
                    .rect;
                surface.record_finish(rect);
                surface.record_slide(rect);
            }
        });
    });
    surface.end_slider(output.state.offset.x, output.inner_rect.width());

    let user_scrolling = ui.input(|i| i.pointer.any_down() || i.smooth_scroll_delta != Vec2::ZERO);
    surface.snap(user_scrolling);
}

fn slider_controls(
    ui: &mut Ui,
    controls: ControlsVisibility,
    active: usize,
    question_count: usize,
    actions: &mut Vec<QuizAction>,
) {
    ui.horizontal(|ui| {
        let size = Vec2::new(140.0, 36.0);
        if controls.prev && ui.add(Button::new("⬅ Anterior").min_size(size)).clicked() {
            actions.push(QuizAction::Nav(NavButton::Prev));
        }
        if controls.next && ui.add(Button::new("Siguiente ➡").min_size(size)).clicked() {
            actions.push(QuizAction::Nav(NavButton::Next));
        }
        if controls.finish && ui.add(Button::new("🏁 Finalizar").min_size(size)).clicked() {
            actions.push(QuizAction::Nav(NavButton::Finish));
        }

        let shown = (active + 1).min(question_count);
        ui.label(format!("Pregunta {shown} de {question_count}"));
    });
}
