pub mod layout;
pub mod surface;
pub mod views;

use std::time::Duration;

use crate::app::QuizApp;
use crate::model::Screen;
use eframe::{APP_KEY, App, Frame, set_value};
use egui::{Context, Visuals};
use layout::{bottom_panel, top_panel};

pub fn apply_theme(ctx: &Context, dark_mode: bool) {
    ctx.set_visuals(if dark_mode {
        Visuals::dark()
    } else {
        Visuals::light()
    });
}

impl App for QuizApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        let time = ctx.input(|i| i.time);
        let now_ms = (time * 1000.0) as u64;

        self.surface.begin_frame(time);
        self.before_frame(now_ms);

        top_panel(self, ctx, now_ms);
        // PANEL INFERIOR TEMA OSCURO O CLARO
        bottom_panel(self, ctx);

        match self.screen {
            Screen::Catalog => views::catalog::ui_catalog(self, ctx),
            Screen::Loading => views::loading::ui_loading(self, ctx),
            Screen::Quiz => views::quiz::ui_quiz(self, ctx, now_ms),
            Screen::Result => views::result::ui_result(self, ctx),
        }

        if self.confirm_reset.is_some() {
            self.confirm_reset(ctx);
        }

        self.after_frame(now_ms);

        if self.needs_repaint() {
            ctx.request_repaint();
        } else if let Some(due) = self.next_wakeup_ms() {
            ctx.request_repaint_after(Duration::from_millis(due.saturating_sub(now_ms)));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        set_value(storage, APP_KEY, &self.preferences);
    }
}
