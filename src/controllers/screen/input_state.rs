use std::collections::HashSet;
use std::time::Instant;

use crate::core::data::{Point, Size, WidgetId};
use crate::core::events::{Action, Modifiers, MouseButton};

/// Input bookkeeping for one screen, owned by its event pump thread.
#[derive(Debug, Default)]
pub struct InputState {
    pub cursor: Point,
    pub pressed: HashSet<MouseButton>,
    pub modifiers: Modifiers,
    pub last_interaction: Option<Instant>,
    pub focus_path: Vec<WidgetId>,
    pub framebuffer_size: Size,
}

impl InputState {
    pub fn touch(&mut self, now: Instant) {
        self.last_interaction = Some(now);
    }

    /// Moves the cursor and returns the motion since the previous position.
    pub fn move_cursor(&mut self, to: Point) -> Point {
        let delta = to - self.cursor;
        self.cursor = to;
        delta
    }

    pub fn apply_button(&mut self, button: MouseButton, action: Action, modifiers: Modifiers) {
        match action {
            Action::Press | Action::Repeat => {
                self.pressed.insert(button);
            }
            Action::Release => {
                self.pressed.remove(&button);
            }
        }
        self.modifiers = modifiers;
    }

    #[must_use]
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.pressed.contains(&button)
    }
}
