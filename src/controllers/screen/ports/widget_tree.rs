use crate::core::data::{Point, Size, WidgetId};
use crate::core::events::{
    DropEvent, KeyEvent, MouseButtonEvent, MouseMoveEvent, RuneEvent, ScrollEvent,
};
use crate::core::graphics::GraphicsContext;

/// The widget hierarchy rooted at a screen.
///
/// Event handlers run on the screen's event pump thread, `draw` on its render
/// pump thread; the two never overlap because the tree sits behind a mutex.
/// Only the handlers mutate the tree. `draw` paints whatever the last handler
/// left behind. Handlers return `true` when the event changed something worth
/// repainting.
pub trait WidgetTree: Send {
    fn draw(&self, ctx: &mut dyn GraphicsContext);

    fn on_mouse_move(&mut self, _target: Option<WidgetId>, _event: &MouseMoveEvent) -> bool {
        false
    }

    fn on_mouse_button(&mut self, _target: Option<WidgetId>, _event: &MouseButtonEvent) -> bool {
        false
    }

    fn on_key_event(&mut self, _focus_path: &[WidgetId], _event: &KeyEvent) -> bool {
        false
    }

    fn on_rune_event(&mut self, _focus_path: &[WidgetId], _event: &RuneEvent) -> bool {
        false
    }

    fn on_drop_event(&mut self, _target: Option<WidgetId>, _event: &DropEvent) -> bool {
        false
    }

    fn on_scroll_event(&mut self, _target: Option<WidgetId>, _event: &ScrollEvent) -> bool {
        false
    }

    fn on_resize_event(&mut self, _size: Size) -> bool {
        false
    }

    /// Close policy. Returning `false` keeps the window open.
    fn on_close_event(&mut self) -> bool {
        true
    }

    /// Topmost widget under `point`.
    fn hit_test(&self, point: Point) -> Option<WidgetId>;

    /// Focused widgets from the root down, most specific last.
    fn focus_path(&self) -> Vec<WidgetId>;

    fn perform_layout(&mut self) {}
}
