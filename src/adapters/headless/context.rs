use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::data::Size;
use crate::core::graphics::{ContextError, GraphicsContext, Surface};

const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];

/// What happened to one headless context, observable from any thread.
#[derive(Debug, Default)]
pub struct ContextJournal {
    make_current: AtomicUsize,
    clears: AtomicUsize,
    swaps: AtomicUsize,
    released: AtomicBool,
    fail_swaps: AtomicBool,
    fail_make_current: AtomicBool,
    last_frame: Mutex<Option<Vec<u8>>>,
}

impl ContextJournal {
    #[must_use]
    pub fn make_current_count(&self) -> usize {
        self.make_current.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn swap_count(&self) -> usize {
        self.swaps.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Pixels presented by the most recent successful swap.
    #[must_use]
    pub fn last_frame(&self) -> Option<Vec<u8>> {
        self.last_frame.lock().unwrap().clone()
    }

    /// Makes every later swap fail, as a lost surface would.
    pub fn fail_swaps(&self, fail: bool) {
        self.fail_swaps.store(fail, Ordering::SeqCst);
    }

    /// Makes the next `make_current` fail, as a context whose pixel format
    /// the display rejects would.
    pub fn fail_make_current(&self, fail: bool) {
        self.fail_make_current.store(fail, Ordering::SeqCst);
    }
}

/// In-memory RGBA8 back buffer standing in for a native drawing context.
pub struct HeadlessContext {
    size: Size,
    buffer: Vec<u8>,
    journal: Arc<ContextJournal>,
}

impl HeadlessContext {
    pub(crate) fn new(size: Size, journal: Arc<ContextJournal>) -> Self {
        let len = usize::try_from(size.area() * 4).unwrap_or(0);
        Self {
            size,
            buffer: vec![0; len],
            journal,
        }
    }
}

impl GraphicsContext for HeadlessContext {
    fn make_current(&mut self) -> Result<(), ContextError> {
        let previous = self.journal.make_current.fetch_add(1, Ordering::SeqCst);
        if self.journal.fail_make_current.swap(false, Ordering::SeqCst) {
            return Err(ContextError::MakeCurrent(
                "headless display refused the context".to_owned(),
            ));
        }
        if previous > 0 {
            return Err(ContextError::MakeCurrent(
                "headless context is already current on a thread".to_owned(),
            ));
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.journal.clears.fetch_add(1, Ordering::SeqCst);
        self.surface().fill(CLEAR_COLOR);
    }

    fn swap_buffers(&mut self) -> Result<(), ContextError> {
        if self.journal.fail_swaps.load(Ordering::SeqCst) {
            return Err(ContextError::Swap("headless surface lost".to_owned()));
        }

        *self.journal.last_frame.lock().unwrap() = Some(self.buffer.clone());
        self.journal.swaps.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn framebuffer_size(&self) -> Size {
        self.size
    }

    fn surface(&mut self) -> Surface<'_> {
        Surface {
            pixels: &mut self.buffer,
            size: self.size,
        }
    }
}

impl Drop for HeadlessContext {
    fn drop(&mut self) {
        self.journal.released.store(true, Ordering::SeqCst);
    }
}
