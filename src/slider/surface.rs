// src/slider/surface.rs

use super::Slide;

/// Bordes verticales de un bloque, relativos a la parte superior del viewport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlideGeometry {
    pub top: f32,
    pub bottom: f32,
}

impl SlideGeometry {
    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }
}

/// Fracción visible de una slide dentro del contenedor del slider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub slide: Slide,
    pub ratio: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinishPlacement {
    /// Debajo del formulario (modo lista)
    #[default]
    AfterForm,
    /// Última slide del contenedor horizontal
    TrailingSlide,
}

/// La página tal y como la ve la máquina de estados.
///
/// Las lecturas devuelven lo medido en el último frame; las escrituras se aplican en el
/// siguiente. Un bloque que no existe es `None` y quien llama lo trata como no-op.
pub trait ViewSurface {
    fn scroll_y(&self) -> f32;
    fn set_scroll_y(&mut self, y: f32);
    fn viewport_height(&self) -> f32;

    /// Tarjetas de pregunta en orden de documento
    fn question_geometries(&self) -> Vec<SlideGeometry>;
    fn slide_geometry(&self, slide: Slide) -> Option<SlideGeometry>;

    fn scroll_left(&self) -> f32;
    /// Offset horizontal de cada slide dentro del contenedor, en orden
    fn slide_offsets(&self) -> Vec<f32>;
    fn container_width(&self) -> f32;
    fn scroll_left_to(&mut self, x: f32, behavior: ScrollBehavior);

    fn set_slider_layout(&mut self, enabled: bool);
    fn place_finish_control(&mut self, placement: FinishPlacement);
    fn set_form_height(&mut self, height: Option<f32>);

    fn intersections(&self) -> Vec<Intersection>;
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Página simulada: tarjetas de altura fija en lista, páginas de ancho fijo en slider.
    #[derive(Debug, Clone)]
    pub struct FakeSurface {
        pub question_count: usize,
        pub card_height: f32,
        pub gap: f32,
        pub viewport_height: f32,
        pub container_width: f32,
        pub scroll_y: f32,
        pub scroll_left: f32,
        pub slider: bool,
        pub finish: FinishPlacement,
        pub form_height: Option<f32>,
        pub scroll_y_writes: Vec<f32>,
        pub scroll_left_writes: Vec<(f32, ScrollBehavior)>,
        /// Altura de cada slide en modo slider
        pub slide_heights: Vec<f32>,
        /// Fuerza los ratios de intersección en lugar de calcularlos
        pub ratios: Option<Vec<Intersection>>,
    }

    impl FakeSurface {
        pub fn new(question_count: usize) -> Self {
            Self {
                question_count,
                card_height: 600.0,
                gap: 0.0,
                viewport_height: 1000.0,
                container_width: 1000.0,
                scroll_y: 0.0,
                scroll_left: 0.0,
                slider: false,
                finish: FinishPlacement::AfterForm,
                form_height: None,
                scroll_y_writes: Vec::new(),
                scroll_left_writes: Vec::new(),
                slide_heights: vec![420.0; question_count + 1],
                ratios: None,
            }
        }

        pub fn unit(&self) -> f32 {
            self.container_width + self.gap
        }

        fn slide_index(&self, slide: Slide) -> Option<usize> {
            match slide {
                Slide::Question(i) if i < self.question_count => Some(i),
                Slide::Question(_) => None,
                Slide::FinishControl => Some(self.question_count),
            }
        }
    }

    impl ViewSurface for FakeSurface {
        fn scroll_y(&self) -> f32 {
            self.scroll_y
        }

        fn set_scroll_y(&mut self, y: f32) {
            self.scroll_y = y.max(0.0);
            self.scroll_y_writes.push(self.scroll_y);
        }

        fn viewport_height(&self) -> f32 {
            self.viewport_height
        }

        fn question_geometries(&self) -> Vec<SlideGeometry> {
            (0..self.question_count)
                .filter_map(|i| self.slide_geometry(Slide::Question(i)))
                .collect()
        }

        fn slide_geometry(&self, slide: Slide) -> Option<SlideGeometry> {
            let index = self.slide_index(slide)?;
            if self.slider {
                let height = self.slide_heights.get(index).copied().unwrap_or(0.0);
                Some(SlideGeometry {
                    top: -self.scroll_y,
                    bottom: height - self.scroll_y,
                })
            } else {
                let top = index as f32 * (self.card_height + self.gap);
                Some(SlideGeometry {
                    top: top - self.scroll_y,
                    bottom: top + self.card_height - self.scroll_y,
                })
            }
        }

        fn scroll_left(&self) -> f32 {
            self.scroll_left
        }

        fn slide_offsets(&self) -> Vec<f32> {
            if !self.slider {
                return vec![0.0; self.question_count + 1];
            }
            (0..=self.question_count)
                .map(|i| i as f32 * self.unit())
                .collect()
        }

        fn container_width(&self) -> f32 {
            self.container_width
        }

        fn scroll_left_to(&mut self, x: f32, behavior: ScrollBehavior) {
            self.scroll_left = x.max(0.0);
            self.scroll_left_writes.push((self.scroll_left, behavior));
        }

        fn set_slider_layout(&mut self, enabled: bool) {
            // el reflow del navegador puede perder el scroll vertical
            self.slider = enabled;
            self.scroll_y = 0.0;
            if !enabled {
                self.scroll_left = 0.0;
            }
        }

        fn place_finish_control(&mut self, placement: FinishPlacement) {
            self.finish = placement;
        }

        fn set_form_height(&mut self, height: Option<f32>) {
            self.form_height = height;
        }

        fn intersections(&self) -> Vec<Intersection> {
            if let Some(ratios) = &self.ratios {
                return ratios.clone();
            }
            if !self.slider {
                return Vec::new();
            }
            let view_start = self.scroll_left;
            let view_end = self.scroll_left + self.container_width;
            (0..=self.question_count)
                .map(|i| {
                    let start = i as f32 * self.unit();
                    let end = start + self.container_width;
                    let overlap = (end.min(view_end) - start.max(view_start)).max(0.0);
                    let slide = if i == self.question_count {
                        Slide::FinishControl
                    } else {
                        Slide::Question(i)
                    };
                    Intersection {
                        slide,
                        ratio: overlap / self.container_width,
                    }
                })
                .collect()
        }
    }
}
