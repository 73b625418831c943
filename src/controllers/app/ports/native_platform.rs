use std::path::PathBuf;

use crate::controllers::app::errors::PlatformError;
use crate::core::config::WindowHints;
use crate::core::data::{Point, Size, WindowId};
use crate::core::dispatch::Waker;
use crate::core::events::{KeyEvent, MouseButtonEvent, RuneEvent};
use crate::core::graphics::GraphicsContext;

/// Raw input signals as reported by the native layer.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeInput {
    CursorPos(Point),
    MouseButton(MouseButtonEvent),
    Key(KeyEvent),
    Char(RuneEvent),
    Drop(Vec<PathBuf>),
    Scroll { x: f64, y: f64 },
    FramebufferSize(Size),
}

/// The native windowing/graphics library.
///
/// Every method is called on the bound thread only, so implementations may
/// hold thread-affine native state and need not be `Send`.
pub trait NativePlatform: 'static {
    type Context: GraphicsContext + 'static;

    fn create_window(
        &mut self,
        hints: &WindowHints,
    ) -> Result<(WindowId, Self::Context), PlatformError>;

    /// Destroys the native window. Its context has already been released.
    fn destroy_window(&mut self, window: WindowId);

    /// Reads and clears the window's native should-close flag.
    fn take_close_request(&mut self, window: WindowId) -> bool;

    fn window_size(&self, window: WindowId) -> Option<Size>;

    fn framebuffer_size(&self, window: WindowId) -> Option<Size>;

    /// Blocks until input arrives or the platform is woken, then delivers
    /// whatever input is pending.
    fn wait_events(
        &mut self,
        deliver: &mut dyn FnMut(WindowId, NativeInput),
    ) -> Result<(), PlatformError>;

    /// A thread-safe routine that makes a concurrent `wait_events` return.
    fn waker(&self) -> Waker;

    /// Releases global native resources.
    fn terminate(&mut self);
}
