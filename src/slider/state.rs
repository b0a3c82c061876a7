// src/slider/state.rs

use super::controls::{ControlsVisibility, NavButton, render_controls};
use super::focus::{resolve_focus_index, resolve_slider_index, slide_unit_width};
use super::observer::PositionObserver;
use super::surface::{FinishPlacement, ScrollBehavior, ViewSurface};
use super::{Slide, SlideList, ViewMode};
use crate::config::ViewConfig;

/// Quién propone el cambio de índice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrigin {
    Observer,
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexChange {
    Committed { from: usize, to: usize },
    Unchanged,
    /// Eco de un scroll programático reciente
    Suppressed,
}

impl IndexChange {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, IndexChange::Suppressed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved(IndexChange),
    /// El botón de finalizar: quien llama corrige el test
    Finish,
    /// Botones del slider pulsados fuera del modo slider
    Ignored,
}

/// Trabajo aplazado al siguiente frame (equivalente a `requestAnimationFrame`)
#[derive(Debug, Clone, Copy, PartialEq)]
enum FrameTask {
    RestoreScrollY(f32),
    ScrollSliderTo(usize),
    AlignSlideToHeader(usize),
}

#[derive(Debug, Clone, Copy)]
struct QueuedFrameTask {
    task: FrameTask,
    ready: bool,
}

/// Redimensionado del formulario pendiente tras el asentamiento del scroll
#[derive(Debug, Clone, Copy)]
struct SettleTimer {
    due_ms: u64,
    index: usize,
}

/// Memoria de la vista de un test: modo, índice activo y sincronización con la página.
#[derive(Debug, Clone)]
pub struct ViewState {
    mode: ViewMode,
    active_index: usize,
    slides: SlideList,
    last_programmatic_scroll_ms: Option<u64>,
    controls: ControlsVisibility,
    observer: Option<PositionObserver>,
    config: ViewConfig,
    frame_tasks: Vec<QueuedFrameTask>,
    settle_timers: Vec<SettleTimer>,
}

impl ViewState {
    pub fn new(question_count: usize, config: ViewConfig) -> Self {
        let slides = SlideList::new(question_count);
        let controls = render_controls(0, slides.len());
        Self {
            mode: ViewMode::List,
            active_index: 0,
            slides,
            last_programmatic_scroll_ms: None,
            controls,
            observer: None,
            config,
            frame_tasks: Vec::new(),
            settle_timers: Vec::new(),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> &SlideList {
        &self.slides
    }

    pub fn active_slide(&self) -> Option<Slide> {
        self.slides.get(self.active_index)
    }

    pub fn controls(&self) -> ControlsVisibility {
        self.controls
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn last_programmatic_scroll_ms(&self) -> Option<u64> {
        self.last_programmatic_scroll_ms
    }

    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    /// Hay scrolls aplazados o redimensionados pendientes: la UI debe pedir otro frame
    pub fn has_pending_work(&self) -> bool {
        !self.frame_tasks.is_empty() || !self.settle_timers.is_empty()
    }

    pub fn next_timer_due_ms(&self) -> Option<u64> {
        self.settle_timers.iter().map(|t| t.due_ms).min()
    }

    pub fn mark_programmatic_scroll(&mut self, now_ms: u64) {
        self.last_programmatic_scroll_ms = Some(now_ms);
    }

    /// Único punto que modifica el índice activo durante la navegación.
    /// Fuera de ella solo `seed_index` lo reescribe.
    pub fn set_active_index(&mut self, proposed: i64, origin: IndexOrigin, now_ms: u64) -> IndexChange {
        let last = self.slide_count().saturating_sub(1) as i64;
        let index = proposed.clamp(0, last) as usize;

        if origin == IndexOrigin::Observer && index < self.active_index && self.within_echo_window(now_ms) {
            log::debug!("eco descartado: {} -> {index}", self.active_index);
            return IndexChange::Suppressed;
        }

        if index == self.active_index {
            return IndexChange::Unchanged;
        }

        let from = self.active_index;
        self.active_index = index;
        self.controls = render_controls(index, self.slide_count());
        log::debug!("índice activo {from} -> {index} ({origin:?})");
        IndexChange::Committed { from, to: index }
    }

    fn within_echo_window(&self, now_ms: u64) -> bool {
        self.last_programmatic_scroll_ms
            .is_some_and(|stamp| now_ms.saturating_sub(stamp) < self.config.echo_window_ms)
    }

    /// Siembra el índice y vuelve a pintar los controles sin pasar por la supresión de ecos.
    /// Solo al entrar o salir del slider, al reanudar y al cerrar la sesión.
    fn seed_index(&mut self, index: usize) {
        self.active_index = index.min(self.slide_count().saturating_sub(1));
        self.controls = render_controls(self.active_index, self.slide_count());
    }

    /// Cambia de modo y devuelve el índice con el que se sincronizó la nueva vista.
    pub fn toggle_mode(&mut self, surface: &mut dyn ViewSurface) -> usize {
        match self.mode {
            ViewMode::List => {
                let sync_index = resolve_focus_index(
                    &surface.question_geometries(),
                    surface.viewport_height(),
                    surface.scroll_y(),
                    &self.config,
                );
                self.enter_slider(surface, sync_index);
                sync_index
            }
            ViewMode::Slider => {
                let unit = slide_unit_width(&surface.slide_offsets(), surface.container_width());
                let sync_index = resolve_slider_index(surface.scroll_left(), unit)
                    .min(self.slide_count().saturating_sub(1));
                self.enter_list(surface, sync_index);
                sync_index
            }
        }
    }

    fn enter_slider(&mut self, surface: &mut dyn ViewSurface, sync_index: usize) {
        let saved_scroll_y = surface.scroll_y();

        self.mode = ViewMode::Slider;
        self.frame_tasks.clear();
        self.settle_timers.clear();

        surface.set_slider_layout(true);
        surface.set_scroll_y(saved_scroll_y);
        surface.place_finish_control(FinishPlacement::TrailingSlide);

        self.seed_index(sync_index);
        self.observer = Some(PositionObserver::install(
            self.slides.clone(),
            self.config.intersection_threshold,
            self.active_index,
        ));

        // el reflow puede volver a perder el scroll vertical
        self.defer(FrameTask::RestoreScrollY(saved_scroll_y));
        self.defer(FrameTask::ScrollSliderTo(self.active_index));
        log::debug!("modo slider en {}", self.active_index);
    }

    fn enter_list(&mut self, surface: &mut dyn ViewSurface, sync_index: usize) {
        self.mode = ViewMode::List;
        self.observer = None;
        self.frame_tasks.clear();
        self.settle_timers.clear();

        surface.set_slider_layout(false);
        surface.place_finish_control(FinishPlacement::AfterForm);
        surface.set_form_height(None);

        self.seed_index(sync_index);
        self.defer(FrameTask::AlignSlideToHeader(sync_index));
        log::debug!("modo lista en {sync_index}");
    }

    fn defer(&mut self, task: FrameTask) {
        self.frame_tasks.push(QueuedFrameTask { task, ready: false });
    }

    /// Llamar una vez al principio de cada frame. Ejecuta lo aplazado antes del frame
    /// anterior, cuando la página ya refleja el nuevo layout.
    pub fn animation_frame(&mut self, surface: &mut dyn ViewSurface) {
        let (due, waiting): (Vec<_>, Vec<_>) = self.frame_tasks.drain(..).partition(|t| t.ready);
        self.frame_tasks = waiting
            .into_iter()
            .map(|t| QueuedFrameTask { ready: true, ..t })
            .collect();

        for queued in due {
            self.run_frame_task(queued.task, surface);
        }
    }

    fn run_frame_task(&mut self, task: FrameTask, surface: &mut dyn ViewSurface) {
        match task {
            FrameTask::RestoreScrollY(y) => surface.set_scroll_y(y),
            FrameTask::ScrollSliderTo(index) => {
                let unit = slide_unit_width(&surface.slide_offsets(), surface.container_width());
                surface.scroll_left_to(index as f32 * unit, ScrollBehavior::Instant);
            }
            FrameTask::AlignSlideToHeader(index) => {
                if let Some(slide) = self.slides.get(index) {
                    self.align_to_header(surface, slide);
                }
            }
        }
    }

    fn align_to_header(&self, surface: &mut dyn ViewSurface, slide: Slide) {
        match surface.slide_geometry(slide) {
            Some(geometry) => {
                let target = geometry.top + surface.scroll_y() - self.config.header_offset;
                surface.set_scroll_y(target);
            }
            None => log::debug!("sin geometría para {}", slide.dom_id()),
        }
    }

    /// Lee las intersecciones del slider y propone los índices dominantes.
    ///
    /// No observa mientras queden scrolls aplazados: la página aún no está en su sitio.
    pub fn observe(&mut self, surface: &mut dyn ViewSurface, now_ms: u64) -> Vec<IndexChange> {
        if self.mode != ViewMode::Slider || !self.frame_tasks.is_empty() {
            return Vec::new();
        }
        let Some(observer) = self.observer.as_mut() else {
            return Vec::new();
        };

        let dominant = observer.collect(&surface.intersections());
        let mut changes = Vec::with_capacity(dominant.len());

        for index in dominant {
            let change = self.set_active_index(index as i64, IndexOrigin::Observer, now_ms);
            if !change.is_suppressed() {
                if let Some(slide) = self.slides.get(index) {
                    self.align_to_header(surface, slide);
                }
                self.settle_timers.push(SettleTimer {
                    due_ms: now_ms + self.config.settle_delay_ms,
                    index,
                });
            }
            changes.push(change);
        }

        changes
    }

    /// Dispara los temporizadores vencidos (equivalente a `setTimeout`)
    pub fn tick(&mut self, now_ms: u64, surface: &mut dyn ViewSurface) {
        let (due, pending): (Vec<_>, Vec<_>) = self
            .settle_timers
            .drain(..)
            .partition(|timer| timer.due_ms <= now_ms);
        self.settle_timers = pending;

        for timer in due {
            if self.mode != ViewMode::Slider || timer.index != self.active_index {
                continue;
            }
            let Some(slide) = self.slides.get(timer.index) else {
                continue;
            };
            if let Some(geometry) = surface.slide_geometry(slide) {
                surface.set_form_height(Some(geometry.height() + self.config.form_padding));
            }
        }
    }

    /// Botones del slider
    pub fn press(&mut self, button: NavButton, surface: &mut dyn ViewSurface, now_ms: u64) -> NavOutcome {
        if self.mode != ViewMode::Slider {
            return NavOutcome::Ignored;
        }

        let step = match button {
            NavButton::Prev => -1,
            NavButton::Next => 1,
            NavButton::Finish => return NavOutcome::Finish,
        };

        self.mark_programmatic_scroll(now_ms);
        let change = self.set_active_index(self.active_index as i64 + step, IndexOrigin::Direct, now_ms);

        let unit = slide_unit_width(&surface.slide_offsets(), surface.container_width());
        surface.scroll_left_to(self.active_index as f32 * unit, ScrollBehavior::Smooth);

        NavOutcome::Moved(change)
    }

    /// Coloca una sesión reanudada en la pregunta indicada
    pub fn resume_at(&mut self, index: usize) {
        self.seed_index(index);
        match self.mode {
            ViewMode::List => self.defer(FrameTask::AlignSlideToHeader(self.active_index)),
            ViewMode::Slider => self.defer(FrameTask::ScrollSliderTo(self.active_index)),
        }
    }

    /// Fin de sesión: la página vuelve a lista y no queda trabajo pendiente.
    pub fn teardown(&mut self, surface: &mut dyn ViewSurface) {
        if self.mode == ViewMode::Slider {
            surface.set_slider_layout(false);
            surface.place_finish_control(FinishPlacement::AfterForm);
        }
        surface.set_form_height(None);

        self.mode = ViewMode::List;
        self.observer = None;
        self.frame_tasks.clear();
        self.settle_timers.clear();
        self.last_programmatic_scroll_ms = None;
        self.seed_index(0);
    }
}
