use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::adapters::headless::context::{ContextJournal, HeadlessContext};
use crate::controllers::app::{NativeInput, NativePlatform, PlatformError};
use crate::core::config::WindowHints;
use crate::core::data::{Size, WindowId};
use crate::core::dispatch::Waker;

struct HeadlessWindow {
    title: String,
    size: Size,
    journal: Arc<ContextJournal>,
}

#[derive(Default)]
struct HeadlessState {
    next_id: u64,
    windows: HashMap<WindowId, HeadlessWindow>,
    pending: VecDeque<(WindowId, NativeInput)>,
    close_requests: HashSet<WindowId>,
    woken: bool,
    wait_count: usize,
    fail_next_wait: Option<String>,
    fail_next_make_current: bool,
    created: Vec<WindowId>,
    destroyed: Vec<WindowId>,
    terminated: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<HeadlessState>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap()
    }

    fn wake(&self) {
        self.lock().woken = true;
        self.changed.notify_all();
    }
}

/// Native layer with no display: windows are table entries, input is
/// injected through a [`HeadlessControl`].
#[derive(Default)]
pub struct HeadlessPlatform {
    shared: Arc<Shared>,
}

impl HeadlessPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle for driving and observing this platform from other threads.
    #[must_use]
    pub fn control(&self) -> HeadlessControl {
        HeadlessControl {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl NativePlatform for HeadlessPlatform {
    type Context = HeadlessContext;

    fn create_window(
        &mut self,
        hints: &WindowHints,
    ) -> Result<(WindowId, Self::Context), PlatformError> {
        let mut state = self.shared.lock();
        if state.terminated {
            return Err(PlatformError::Terminated);
        }
        if hints.size.is_empty() {
            return Err(PlatformError::WindowCreation(format!(
                "{:?} has an empty size {}x{}",
                hints.title, hints.size.width, hints.size.height
            )));
        }

        state.next_id += 1;
        let window = WindowId(state.next_id);
        let journal = Arc::new(ContextJournal::default());
        if std::mem::take(&mut state.fail_next_make_current) {
            journal.fail_make_current(true);
        }

        state.windows.insert(
            window,
            HeadlessWindow {
                title: hints.title.clone(),
                size: hints.size,
                journal: Arc::clone(&journal),
            },
        );
        state.created.push(window);

        Ok((window, HeadlessContext::new(hints.size, journal)))
    }

    fn destroy_window(&mut self, window: WindowId) {
        let mut state = self.shared.lock();
        if state.windows.remove(&window).is_some() {
            state.close_requests.remove(&window);
            state.destroyed.push(window);
        }
    }

    fn take_close_request(&mut self, window: WindowId) -> bool {
        self.shared.lock().close_requests.remove(&window)
    }

    fn window_size(&self, window: WindowId) -> Option<Size> {
        self.shared.lock().windows.get(&window).map(|w| w.size)
    }

    fn framebuffer_size(&self, window: WindowId) -> Option<Size> {
        self.window_size(window)
    }

    fn wait_events(
        &mut self,
        deliver: &mut dyn FnMut(WindowId, NativeInput),
    ) -> Result<(), PlatformError> {
        let pending = {
            let mut state = self.shared.lock();
            state.wait_count += 1;

            while state.pending.is_empty() && !state.woken && state.fail_next_wait.is_none() {
                state = self.shared.changed.wait(state).unwrap();
            }

            if state.terminated {
                return Err(PlatformError::Terminated);
            }
            if let Some(reason) = state.fail_next_wait.take() {
                return Err(PlatformError::EventLoop(reason));
            }

            state.woken = false;
            std::mem::take(&mut state.pending)
        };

        for (window, input) in pending {
            if let NativeInput::FramebufferSize(size) = input {
                if let Some(record) = self.shared.lock().windows.get_mut(&window) {
                    record.size = size;
                }
            }
            deliver(window, input);
        }

        Ok(())
    }

    fn waker(&self) -> Waker {
        let shared = Arc::clone(&self.shared);
        Arc::new(move || shared.wake())
    }

    fn terminate(&mut self) {
        let mut state = self.shared.lock();
        state.terminated = true;
        state.windows.clear();
    }
}

/// Thread-safe remote for a [`HeadlessPlatform`].
#[derive(Clone)]
pub struct HeadlessControl {
    shared: Arc<Shared>,
}

impl HeadlessControl {
    /// Queues native input for delivery on the next `wait_events`.
    pub fn inject(&self, window: WindowId, input: NativeInput) {
        self.shared.lock().pending.push_back((window, input));
        self.shared.changed.notify_all();
    }

    /// Raises the window's should-close flag, as clicking its close button would.
    pub fn request_close(&self, window: WindowId) {
        self.shared.lock().close_requests.insert(window);
        self.shared.wake();
    }

    pub fn wake(&self) {
        self.shared.wake();
    }

    /// Makes the next `wait_events` return an error.
    pub fn fail_next_wait(&self, reason: impl Into<String>) {
        self.shared.lock().fail_next_wait = Some(reason.into());
        self.shared.changed.notify_all();
    }

    /// Makes the context of the next created window refuse `make_current`.
    pub fn fail_next_make_current(&self) {
        self.shared.lock().fail_next_make_current = true;
    }

    #[must_use]
    pub fn has_close_request(&self, window: WindowId) -> bool {
        self.shared.lock().close_requests.contains(&window)
    }

    #[must_use]
    pub fn is_open(&self, window: WindowId) -> bool {
        self.shared.lock().windows.contains_key(&window)
    }

    #[must_use]
    pub fn title(&self, window: WindowId) -> Option<String> {
        self.shared.lock().windows.get(&window).map(|w| w.title.clone())
    }

    #[must_use]
    pub fn created(&self) -> Vec<WindowId> {
        self.shared.lock().created.clone()
    }

    #[must_use]
    pub fn destroyed(&self) -> Vec<WindowId> {
        self.shared.lock().destroyed.clone()
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.shared.lock().terminated
    }

    #[must_use]
    pub fn wait_count(&self) -> usize {
        self.shared.lock().wait_count
    }

    /// Journal of the window's graphics context. Stays valid after the window
    /// is destroyed when fetched beforehand.
    #[must_use]
    pub fn journal(&self, window: WindowId) -> Option<Arc<ContextJournal>> {
        self.shared
            .lock()
            .windows
            .get(&window)
            .map(|w| Arc::clone(&w.journal))
    }

    /// Polls `condition` until it holds or `timeout` elapses.
    pub fn wait_until(&self, timeout: Duration, mut condition: impl FnMut(&Self) -> bool) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        while std::time::Instant::now() < deadline {
            if condition(self) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        condition(self)
    }
}
