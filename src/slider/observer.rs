// src/slider/observer.rs

use std::collections::HashMap;

use super::surface::Intersection;
use super::{Slide, SlideList};

/// Detecta qué slide pasa a ser dominante dentro del contenedor del slider.
///
/// Se comporta como un IntersectionObserver con un único umbral: solo informa de las slides
/// que cruzan el umbral hacia arriba. La primera observación informa del estado actual.
#[derive(Debug, Clone)]
pub struct PositionObserver {
    slides: SlideList,
    threshold: f32,
    start_index: usize,
    last_ratios: HashMap<Slide, f32>,
}

impl PositionObserver {
    pub fn install(slides: SlideList, threshold: f32, start_index: usize) -> Self {
        Self {
            slides,
            threshold,
            start_index,
            last_ratios: HashMap::new(),
        }
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn observed(&self) -> &SlideList {
        &self.slides
    }

    /// Posiciones (en la lista de slides) que se han vuelto dominantes desde la última
    /// llamada, en el orden de las entradas.
    pub fn collect(&mut self, entries: &[Intersection]) -> Vec<usize> {
        let mut dominant = Vec::new();

        for entry in entries {
            let was_intersecting = self
                .last_ratios
                .get(&entry.slide)
                .is_some_and(|ratio| *ratio >= self.threshold);
            let is_intersecting = entry.ratio >= self.threshold;
            self.last_ratios.insert(entry.slide, entry.ratio);

            if !is_intersecting || was_intersecting {
                continue;
            }

            match self.slides.position(entry.slide) {
                Some(index) => dominant.push(index),
                None => log::debug!("slide {} fuera de la lista observada", entry.slide.dom_id()),
            }
        }

        dominant
    }
}
