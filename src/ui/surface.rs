// src/ui/surface.rs

use egui::Rect;

use crate::slider::{
    FinishPlacement, Intersection, ScrollBehavior, Slide, SlideGeometry, ViewSurface,
    resolve_slider_index, slide_unit_width,
};

/// Duración del scroll suave horizontal, en segundos
const SMOOTH_SCROLL_SECS: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
struct HorizontalAnimation {
    from: f32,
    to: f32,
    start: f64,
}

impl HorizontalAnimation {
    /// Posición en `time` y si ya ha terminado (ease-out cúbico)
    fn sample(&self, time: f64) -> (f32, bool) {
        let t = ((time - self.start) / SMOOTH_SCROLL_SECS).clamp(0.0, 1.0) as f32;
        let eased = 1.0 - (1.0 - t).powi(3);
        (self.from + (self.to - self.from) * eased, t >= 1.0)
    }
}

/// La página del test pintada con egui.
///
/// Las vistas registran aquí lo que dibujan (rectángulos en pantalla y offsets de los
/// `ScrollArea`) y leen las escrituras pendientes al construir el siguiente frame.
#[derive(Debug, Default)]
pub struct EguiSurface {
    time: f64,

    // medidas del último frame
    viewport: Option<Rect>,
    scroll_y: f32,
    questions: Vec<Option<Rect>>,
    finish: Option<Rect>,
    content_left: f32,
    slide_lefts: Vec<f32>,
    scroll_left: f32,
    container_width: f32,

    // estado de layout
    slider_layout: bool,
    finish_placement: FinishPlacement,
    form_height: Option<f32>,

    // escrituras pendientes
    pending_scroll_y: Option<f32>,
    pending_scroll_left: Option<f32>,
    animation: Option<HorizontalAnimation>,
}

impl EguiSurface {
    /// Olvida las medidas y el layout de la sesión anterior
    pub fn reset(&mut self) {
        *self = Self {
            time: self.time,
            ..Self::default()
        };
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some() || self.pending_scroll_y.is_some() || self.pending_scroll_left.is_some()
    }

    pub fn is_slider_layout(&self) -> bool {
        self.slider_layout
    }

    pub fn finish_placement(&self) -> FinishPlacement {
        self.finish_placement
    }

    pub fn form_height(&self) -> Option<f32> {
        self.form_height
    }

    /// Avanza el scroll suave. Llamar antes de pintar la página.
    pub fn begin_frame(&mut self, time: f64) {
        self.time = time;
        if let Some(animation) = self.animation {
            let (x, done) = animation.sample(time);
            self.pending_scroll_left = Some(x);
            if done {
                self.animation = None;
            }
        }
    }

    /// Offset vertical a forzar en el `ScrollArea` de la página
    pub fn take_scroll_y(&mut self) -> Option<f32> {
        self.pending_scroll_y.take()
    }

    /// Offset horizontal a forzar en el contenedor del slider
    pub fn take_scroll_left(&mut self) -> Option<f32> {
        self.pending_scroll_left.take()
    }

    /// Inicio del contenido de la página: `viewport` es el rectángulo visible
    pub fn begin_page(&mut self, viewport: Rect, question_count: usize) {
        self.viewport = Some(viewport);
        self.questions.clear();
        self.questions.resize(question_count, None);
        self.finish = None;
        self.slide_lefts.clear();
    }

    pub fn end_page(&mut self, scroll_y: f32, viewport: Rect) {
        self.scroll_y = scroll_y;
        self.viewport = Some(viewport);
    }

    pub fn record_question(&mut self, index: usize, rect: Rect) {
        if let Some(slot) = self.questions.get_mut(index) {
            *slot = Some(rect);
        }
    }

    pub fn record_finish(&mut self, rect: Rect) {
        self.finish = Some(rect);
    }

    /// Inicio del contenido desplazable del slider (`ui.max_rect().left()` dentro del área)
    pub fn begin_slider(&mut self, content_left: f32, container_width: f32) {
        self.content_left = content_left;
        self.container_width = container_width;
        self.slide_lefts.clear();
    }

    /// Cada slide en orden de documento
    pub fn record_slide(&mut self, rect: Rect) {
        self.slide_lefts.push(rect.left() - self.content_left);
    }

    pub fn end_slider(&mut self, scroll_left: f32, container_width: f32) {
        self.scroll_left = scroll_left;
        self.container_width = container_width;
    }

    /// Imita `scroll-snap`: sin interacción del usuario, el slider acaba en una slide entera.
    pub fn snap(&mut self, user_scrolling: bool) {
        if !self.slider_layout || user_scrolling || self.is_animating() {
            return;
        }
        let unit = slide_unit_width(&self.slide_lefts, self.container_width);
        if unit <= 0.0 {
            return;
        }
        let last = self.slide_lefts.len().saturating_sub(1);
        let nearest = resolve_slider_index(self.scroll_left, unit).min(last);
        let target = nearest as f32 * unit;
        if (target - self.scroll_left).abs() > 0.5 {
            self.start_animation(target);
        }
    }

    fn start_animation(&mut self, to: f32) {
        self.animation = Some(HorizontalAnimation {
            from: self.scroll_left,
            to,
            start: self.time,
        });
    }

    fn relative(&self, rect: Rect) -> SlideGeometry {
        let top = self.viewport.map_or(0.0, |v| v.top());
        SlideGeometry {
            top: rect.top() - top,
            bottom: rect.bottom() - top,
        }
    }
}

impl ViewSurface for EguiSurface {
    fn scroll_y(&self) -> f32 {
        self.pending_scroll_y.unwrap_or(self.scroll_y)
    }

    fn set_scroll_y(&mut self, y: f32) {
        self.pending_scroll_y = Some(y.max(0.0));
    }

    fn viewport_height(&self) -> f32 {
        self.viewport.map_or(0.0, |v| v.height())
    }

    fn question_geometries(&self) -> Vec<SlideGeometry> {
        self.questions
            .iter()
            .map_while(|rect| rect.map(|r| self.relative(r)))
            .collect()
    }

    fn slide_geometry(&self, slide: Slide) -> Option<SlideGeometry> {
        let rect = match slide {
            Slide::Question(i) => self.questions.get(i).copied().flatten(),
            Slide::FinishControl => self.finish,
        }?;
        Some(self.relative(rect))
    }

    fn scroll_left(&self) -> f32 {
        self.scroll_left
    }

    fn slide_offsets(&self) -> Vec<f32> {
        self.slide_lefts.clone()
    }

    fn container_width(&self) -> f32 {
        self.container_width
    }

    fn scroll_left_to(&mut self, x: f32, behavior: ScrollBehavior) {
        let x = x.max(0.0);
        match behavior {
            ScrollBehavior::Instant => {
                self.animation = None;
                self.scroll_left = x;
                self.pending_scroll_left = Some(x);
            }
            ScrollBehavior::Smooth => self.start_animation(x),
        }
    }

    fn set_slider_layout(&mut self, enabled: bool) {
        self.slider_layout = enabled;
        if !enabled {
            self.animation = None;
            self.pending_scroll_left = None;
            self.scroll_left = 0.0;
            self.slide_lefts.clear();
        }
    }

    fn place_finish_control(&mut self, placement: FinishPlacement) {
        self.finish_placement = placement;
    }

    fn set_form_height(&mut self, height: Option<f32>) {
        self.form_height = height;
    }

    fn intersections(&self) -> Vec<Intersection> {
        if !self.slider_layout || self.container_width <= 0.0 {
            return Vec::new();
        }
        let width = self.container_width;
        let view_start = self.scroll_left;
        let view_end = view_start + width;
        let questions = self.questions.len();

        self.slide_lefts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let overlap = ((start + width).min(view_end) - start.max(view_start)).max(0.0);
                let slide = if i < questions {
                    Slide::Question(i)
                } else {
                    Slide::FinishControl
                };
                Intersection {
                    slide,
                    ratio: overlap / width,
                }
            })
            .collect()
    }
}
