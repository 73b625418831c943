use crate::controllers::app::bridge;
use crate::controllers::app::errors::PlatformError;
use crate::controllers::app::ports::NativePlatform;
use crate::controllers::app::registry::{RegisteredScreen, Registry};
use crate::core::data::{Point, WindowId};
use crate::core::events::Event;

/// State that only exists on the bound thread: the native platform and the
/// window registry. Reached exclusively through dispatched closures.
pub struct MainContext<P: NativePlatform> {
    platform: P,
    registry: Registry,
}

impl<P: NativePlatform> MainContext<P> {
    pub(crate) fn new(platform: P) -> Self {
        Self {
            platform,
            registry: Registry::new(),
        }
    }

    pub fn platform(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn register(&mut self, entry: RegisteredScreen) {
        self.registry.insert(entry);
    }

    pub(crate) fn unregister(&mut self, window: WindowId) -> Option<RegisteredScreen> {
        self.registry.remove(window)
    }

    pub(crate) fn unregister_all(&mut self) -> Vec<RegisteredScreen> {
        self.registry.drain()
    }

    /// Turns pending native should-close flags into `Close` events. Returns
    /// how many were forwarded.
    pub(crate) fn forward_close_requests(&mut self) -> usize {
        let mut forwarded = 0;
        for screen in self.registry.screens() {
            if self.platform.take_close_request(screen.id()) {
                tracing::debug!(window = %screen.id(), "native close requested");
                screen.send_event(Event::Close);
                forwarded += 1;
            }
        }
        forwarded
    }

    pub(crate) fn wait_events(&mut self, cursor_offset: Point) -> Result<(), PlatformError> {
        let Self { platform, registry } = self;

        platform.wait_events(&mut |window, input| {
            bridge::deliver(registry, window, input, cursor_offset);
        })
    }

    pub(crate) fn into_platform(self) -> P {
        self.platform
    }
}
