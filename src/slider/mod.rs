//! Modo de vista de un test en curso: lista vertical o slider horizontal.
//!
//! `ViewState` es la única fuente de verdad de `{modo, índice activo}`. Los botones y el
//! observer solo proponen índices; la página (`ViewSurface`) solo se toca desde aquí.

pub mod controls;
pub mod focus;
pub mod observer;
pub mod state;
pub mod surface;

pub use controls::{ControlsVisibility, NavButton, render_controls};
pub use focus::{resolve_focus_index, resolve_slider_index, slide_unit_width};
pub use observer::PositionObserver;
pub use state::{IndexChange, IndexOrigin, NavOutcome, ViewState};
pub use surface::{FinishPlacement, Intersection, ScrollBehavior, SlideGeometry, ViewSurface};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Slider,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Slider,
            ViewMode::Slider => ViewMode::List,
        }
    }
}

/// Unidad navegable del slider. El control de finalizar es la última.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slide {
    Question(usize),
    FinishControl,
}

impl Slide {
    /// Identificador estable del bloque en la página
    pub fn dom_id(&self) -> String {
        match self {
            Slide::Question(i) => format!("question-{i}"),
            Slide::FinishControl => "test-controls".to_string(),
        }
    }
}

/// Slides en orden de documento: preguntas y, al final, el control de finalizar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlideList {
    slides: Vec<Slide>,
}

impl SlideList {
    pub fn new(question_count: usize) -> Self {
        let mut slides: Vec<Slide> = (0..question_count).map(Slide::Question).collect();
        slides.push(Slide::FinishControl);
        Self { slides }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn question_count(&self) -> usize {
        self.slides
            .iter()
            .filter(|s| matches!(s, Slide::Question(_)))
            .count()
    }

    pub fn get(&self, index: usize) -> Option<Slide> {
        self.slides.get(index).copied()
    }

    /// Posición de la slide en la lista (nunca a partir del id)
    pub fn position(&self, slide: Slide) -> Option<usize> {
        self.slides.iter().position(|s| *s == slide)
    }

    pub fn iter(&self) -> impl Iterator<Item = Slide> + '_ {
        self.slides.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_list_ends_with_finish_control() {
        let slides = SlideList::new(3);
        assert_eq!(slides.len(), 4);
        assert_eq!(slides.question_count(), 3);
        assert_eq!(slides.get(3), Some(Slide::FinishControl));
        assert_eq!(slides.position(Slide::FinishControl), Some(3));
        assert_eq!(slides.position(Slide::Question(1)), Some(1));
        assert_eq!(slides.position(Slide::Question(9)), None);
    }

    #[test]
    fn dom_ids_follow_page_contract() {
        assert_eq!(Slide::Question(0).dom_id(), "question-0");
        assert_eq!(Slide::FinishControl.dom_id(), "test-controls");
    }
}
