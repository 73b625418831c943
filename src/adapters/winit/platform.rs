use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pixels::{Pixels, SurfaceTexture};
use winit::dpi::PhysicalSize;
use winit::event::Event as WinitEvent;
use winit::event_loop::{EventLoop, EventLoopBuilder, EventLoopProxy};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window, WindowBuilder};

use crate::adapters::winit::context::{SharedSize, WinitContext};
use crate::adapters::winit::translate::{self, WindowInput};
use crate::controllers::app::{NativeInput, NativePlatform, PlatformError};
use crate::core::config::WindowHints;
use crate::core::data::{Size, WindowId};
use crate::core::dispatch::Waker;

struct NativeWindow {
    id: WindowId,
    window: Arc<Window>,
    size: Arc<SharedSize>,
    input: WindowInput,
}

/// Desktop windows through winit, painted with `pixels`.
///
/// Must be created and driven on the process's main thread.
pub struct WinitPlatform {
    event_loop: EventLoop<()>,
    proxy: Arc<Mutex<EventLoopProxy<()>>>,
    windows: HashMap<winit::window::WindowId, NativeWindow>,
    native_ids: HashMap<WindowId, winit::window::WindowId>,
    next_id: u64,
    terminated: bool,
}

impl WinitPlatform {
    pub fn new() -> Result<Self, PlatformError> {
        let event_loop = EventLoopBuilder::<()>::with_user_event()
            .build()
            .map_err(|e| PlatformError::EventLoop(e.to_string()))?;
        let proxy = Arc::new(Mutex::new(event_loop.create_proxy()));

        Ok(Self {
            event_loop,
            proxy,
            windows: HashMap::new(),
            native_ids: HashMap::new(),
            next_id: 0,
            terminated: false,
        })
    }

    fn window(&self, window: WindowId) -> Option<&NativeWindow> {
        self.native_ids
            .get(&window)
            .and_then(|native| self.windows.get(native))
    }
}

impl NativePlatform for WinitPlatform {
    type Context = WinitContext;

    fn create_window(
        &mut self,
        hints: &WindowHints,
    ) -> Result<(WindowId, Self::Context), PlatformError> {
        if self.terminated {
            return Err(PlatformError::Terminated);
        }
        if hints.samples > 1 {
            tracing::debug!(samples = hints.samples, "multisampling not supported by pixels, ignoring");
        }

        let window = WindowBuilder::new()
            .with_title(&hints.title)
            .with_inner_size(PhysicalSize::new(hints.size.width, hints.size.height))
            .with_resizable(hints.resizable)
            .with_fullscreen(hints.fullscreen.then_some(Fullscreen::Borderless(None)))
            .build(&self.event_loop)
            .map_err(|e| PlatformError::WindowCreation(e.to_string()))?;
        let window = Arc::new(window);

        let inner = window.inner_size();
        let size = Arc::new(SharedSize::new(Size::new(inner.width, inner.height)));
        let surface = SurfaceTexture::new(inner.width, inner.height, Arc::clone(&window));
        let pixels = Pixels::new(inner.width, inner.height, surface)
            .map_err(|e| PlatformError::WindowCreation(e.to_string()))?;

        self.next_id += 1;
        let id = WindowId(self.next_id);
        let native = window.id();

        self.native_ids.insert(id, native);
        self.windows.insert(
            native,
            NativeWindow {
                id,
                window: Arc::clone(&window),
                size: Arc::clone(&size),
                input: WindowInput::default(),
            },
        );

        Ok((id, WinitContext::new(window, pixels, size)))
    }

    fn destroy_window(&mut self, window: WindowId) {
        if let Some(native) = self.native_ids.remove(&window) {
            self.windows.remove(&native);
        }
    }

    fn take_close_request(&mut self, window: WindowId) -> bool {
        let Some(native) = self.native_ids.get(&window) else {
            return false;
        };
        self.windows
            .get_mut(native)
            .is_some_and(|entry| std::mem::take(&mut entry.input.close_requested))
    }

    fn window_size(&self, window: WindowId) -> Option<Size> {
        self.window(window).map(|entry| {
            let size = entry.window.inner_size();
            Size::new(size.width, size.height)
        })
    }

    fn framebuffer_size(&self, window: WindowId) -> Option<Size> {
        self.window(window).map(|entry| entry.size.load())
    }

    fn wait_events(
        &mut self,
        deliver: &mut dyn FnMut(WindowId, NativeInput),
    ) -> Result<(), PlatformError> {
        if self.terminated {
            return Err(PlatformError::Terminated);
        }

        let Self {
            event_loop, windows, ..
        } = self;

        let status = event_loop.pump_events(None, |event, _target| {
            let WinitEvent::WindowEvent { window_id, event } = event else {
                return;
            };
            let Some(entry) = windows.get_mut(&window_id) else {
                return;
            };

            for input in translate::window_event(event, &mut entry.input) {
                if let NativeInput::FramebufferSize(size) = input {
                    entry.size.store(size);
                }
                deliver(entry.id, input);
            }
        });

        match status {
            PumpStatus::Continue => Ok(()),
            PumpStatus::Exit(code) => Err(PlatformError::EventLoop(format!(
                "event loop exited with code {code}"
            ))),
        }
    }

    fn waker(&self) -> Waker {
        let proxy = Arc::clone(&self.proxy);
        Arc::new(move || {
            if proxy.lock().unwrap().send_event(()).is_err() {
                tracing::trace!("event loop closed, wake dropped");
            }
        })
    }

    fn terminate(&mut self) {
        self.windows.clear();
        self.native_ids.clear();
        self.terminated = true;
    }
}
