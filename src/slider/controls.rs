/// Visibilidad de los botones del slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlsVisibility {
    pub prev: bool,
    pub next: bool,
    pub finish: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavButton {
    Prev,
    Next,
    Finish,
}

/// Función pura de `(activo, total)`: la última pregunta y la slide de control muestran
/// "Finalizar" en lugar de "Siguiente".
pub fn render_controls(active_index: usize, slide_count: usize) -> ControlsVisibility {
    let finish = active_index + 2 >= slide_count;
    ControlsVisibility {
        prev: active_index > 0,
        next: !finish,
        finish,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_idempotent() {
        let first = render_controls(1, 5);
        let second = render_controls(1, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn finish_replaces_next_on_last_question() {
        // 3 preguntas + slide de control
        let at_last_question = render_controls(2, 4);
        assert!(at_last_question.finish);
        assert!(!at_last_question.next);

        let before = render_controls(1, 4);
        assert!(before.next);
        assert!(!before.finish);

        let at_control = render_controls(3, 4);
        assert!(at_control.finish);
    }

    #[test]
    fn prev_hidden_on_first_slide() {
        assert!(!render_controls(0, 4).prev);
        assert!(render_controls(1, 4).prev);
    }

    #[test]
    fn single_question_shows_finish_immediately() {
        let controls = render_controls(0, 2);
        assert!(controls.finish);
        assert!(!controls.prev);
    }
}
