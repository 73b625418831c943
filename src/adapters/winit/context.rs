use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use pixels::Pixels;
use winit::window::Window;

use crate::core::data::Size;
use crate::core::graphics::{ContextError, GraphicsContext, Surface};

const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];

/// Framebuffer size written by the event loop and read by the render pump.
#[derive(Debug, Default)]
pub(crate) struct SharedSize(AtomicU64);

impl SharedSize {
    pub(crate) fn new(size: Size) -> Self {
        let shared = Self::default();
        shared.store(size);
        shared
    }

    pub(crate) fn store(&self, size: Size) {
        let packed = (u64::from(size.width) << 32) | u64::from(size.height);
        self.0.store(packed, Ordering::Release);
    }

    pub(crate) fn load(&self) -> Size {
        let packed = self.0.load(Ordering::Acquire);
        Size::new((packed >> 32) as u32, packed as u32)
    }
}

/// A `pixels` surface bound to one winit window.
pub struct WinitContext {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    shared_size: Arc<SharedSize>,
    size: Size,
    current: bool,
}

impl WinitContext {
    pub(crate) fn new(window: Arc<Window>, pixels: Pixels<'static>, shared_size: Arc<SharedSize>) -> Self {
        let size = shared_size.load();
        Self {
            window,
            pixels,
            shared_size,
            size,
            current: false,
        }
    }

    /// Follows the window's framebuffer. Minimized windows keep their last
    /// buffer since a zero-sized surface is invalid.
    fn follow_resize(&mut self) -> Result<(), ContextError> {
        let size = self.shared_size.load();
        if size == self.size || size.is_empty() {
            return Ok(());
        }

        self.pixels
            .resize_surface(size.width, size.height)
            .map_err(|e| ContextError::Swap(e.to_string()))?;
        self.pixels
            .resize_buffer(size.width, size.height)
            .map_err(|e| ContextError::Swap(e.to_string()))?;
        self.size = size;

        Ok(())
    }
}

impl GraphicsContext for WinitContext {
    fn make_current(&mut self) -> Result<(), ContextError> {
        if self.current {
            return Err(ContextError::MakeCurrent(format!(
                "surface for window {:?} is already bound",
                self.window.id()
            )));
        }
        self.current = true;
        Ok(())
    }

    fn clear(&mut self) {
        if let Err(e) = self.follow_resize() {
            tracing::warn!("{e}");
        }
        for pixel in self.pixels.frame_mut().chunks_exact_mut(4) {
            pixel.copy_from_slice(&CLEAR_COLOR);
        }
    }

    fn swap_buffers(&mut self) -> Result<(), ContextError> {
        self.pixels
            .render()
            .map_err(|e| ContextError::Swap(e.to_string()))
    }

    fn framebuffer_size(&self) -> Size {
        self.size
    }

    fn surface(&mut self) -> Surface<'_> {
        Surface {
            pixels: self.pixels.frame_mut(),
            size: self.size,
        }
    }
}
