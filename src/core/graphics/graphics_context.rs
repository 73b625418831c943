use thiserror::Error;

use crate::core::data::size::Size;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("graphics context could not be made current: {0}")]
    MakeCurrent(String),

    #[error("buffer swap failed: {0}")]
    Swap(String),
}

/// Mutable view of the back buffer, tightly packed RGBA8 rows.
pub struct Surface<'a> {
    pub pixels: &'a mut [u8],
    pub size: Size,
}

impl Surface<'_> {
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, rgba: [u8; 4]) {
        let x_end = x.saturating_add(width).min(self.size.width);
        let y_end = y.saturating_add(height).min(self.size.height);
        let stride = self.size.width as usize * 4;

        for row in y..y_end {
            let start = row as usize * stride;
            for col in x..x_end {
                let offset = start + col as usize * 4;
                self.pixels[offset..offset + 4].copy_from_slice(&rgba);
            }
        }
    }
}

/// A window's drawing context.
///
/// Owned by exactly one render pump for the whole life of the window and only
/// ever called from that pump's thread.
pub trait GraphicsContext: Send {
    /// Binds the context to the calling thread. Called once, before anything else.
    fn make_current(&mut self) -> Result<(), ContextError>;

    fn clear(&mut self);

    fn swap_buffers(&mut self) -> Result<(), ContextError>;

    fn framebuffer_size(&self) -> Size;

    fn surface(&mut self) -> Surface<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_is_clipped_to_surface() {
        let mut pixels = vec![0u8; 4 * 4 * 4];
        let mut surface = Surface {
            pixels: &mut pixels,
            size: Size::new(4, 4),
        };

        surface.fill_rect(2, 2, 10, 10, [1, 2, 3, 4]);

        let painted = pixels.chunks_exact(4).filter(|p| *p == [1, 2, 3, 4]).count();
        assert_eq!(painted, 4);
        assert_eq!(&pixels[0..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_fill_covers_every_pixel() {
        let mut pixels = vec![0u8; 2 * 3 * 4];
        let mut surface = Surface {
            pixels: &mut pixels,
            size: Size::new(2, 3),
        };

        surface.fill([9, 9, 9, 255]);

        assert!(pixels.chunks_exact(4).all(|p| p == [9, 9, 9, 255]));
    }
}
