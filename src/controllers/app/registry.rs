use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use crate::controllers::screen::Screen;
use crate::core::data::WindowId;

/// A screen plus the threads serving it.
pub(crate) struct RegisteredScreen {
    screen: Arc<Screen>,
    event_pump: Option<JoinHandle<()>>,
    render_pump: Option<JoinHandle<()>>,
}

impl RegisteredScreen {
    pub(crate) fn new(
        screen: Arc<Screen>,
        event_pump: JoinHandle<()>,
        render_pump: JoinHandle<()>,
    ) -> Self {
        Self {
            screen,
            event_pump: Some(event_pump),
            render_pump: Some(render_pump),
        }
    }

    pub(crate) fn screen(&self) -> &Arc<Screen> {
        &self.screen
    }

    /// Waits for both pumps to finish. The render pump releases the graphics
    /// context on its way out.
    ///
    /// Returns the payload of the first pump that died unwinding; the caller
    /// re-raises it.
    pub(crate) fn join(mut self) -> Option<Box<dyn Any + Send>> {
        let window = self.screen.id();
        let mut panicked = None;
        for (role, handle) in [
            ("event", self.event_pump.take()),
            ("render", self.render_pump.take()),
        ] {
            let Some(handle) = handle else { continue };
            if let Err(payload) = handle.join() {
                tracing::error!(%window, role, "pump thread panicked");
                panicked.get_or_insert(payload);
            }
        }
        panicked
    }
}

/// Native handle to screen table.
///
/// Lives inside the main-thread context and is never moved off the bound
/// thread; mutations assert that in debug builds.
pub struct Registry {
    screens: HashMap<WindowId, RegisteredScreen>,
    owner: ThreadId,
    _bound: PhantomData<*const ()>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            screens: HashMap::new(),
            owner: thread::current().id(),
            _bound: PhantomData,
        }
    }

    pub(crate) fn insert(&mut self, entry: RegisteredScreen) {
        self.assert_owner();
        let window = entry.screen().id();
        if self.screens.insert(window, entry).is_some() {
            tracing::warn!(%window, "native handle reused while still registered");
        }
    }

    /// Removes a screen. `None` if it was already removed.
    pub(crate) fn remove(&mut self, window: WindowId) -> Option<RegisteredScreen> {
        self.assert_owner();
        self.screens.remove(&window)
    }

    pub(crate) fn drain(&mut self) -> Vec<RegisteredScreen> {
        self.assert_owner();
        self.screens.drain().map(|(_, entry)| entry).collect()
    }

    pub(crate) fn get(&self, window: WindowId) -> Option<&Arc<Screen>> {
        self.screens.get(&window).map(RegisteredScreen::screen)
    }

    pub(crate) fn screens(&self) -> impl Iterator<Item = &Arc<Screen>> {
        self.screens.values().map(RegisteredScreen::screen)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.screens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    #[must_use]
    pub fn contains(&self, window: WindowId) -> bool {
        self.screens.contains_key(&window)
    }

    fn assert_owner(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.owner,
            "registry mutated off the bound thread"
        );
    }
}
