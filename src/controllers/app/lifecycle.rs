use std::any::Any;
use std::panic;
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::controllers::app::errors::AppError;
use crate::controllers::app::main_context::MainContext;
use crate::controllers::app::ports::NativePlatform;
use crate::controllers::app::registry::RegisteredScreen;
use crate::controllers::screen::{
    CloseNotifier, EventPump, PumpNotice, RenderPump, Screen, ScreenHandle, SharedTree,
    WidgetTree,
};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::{PumpConfig, WindowHints};
use crate::core::data::WindowId;
use crate::core::dispatch::fatal::fatal;
use crate::core::dispatch::{Dispatcher, Waker};
use crate::core::events::Event;

/// Process entry point: binds the calling thread to the native platform and
/// runs `run` on an application thread until it returns.
///
/// Must be called once, from the thread the native library requires. Returns
/// the platform after the application routine finished.
pub fn main<P, F>(platform: P, run: F) -> P
where
    P: NativePlatform,
    F: FnOnce(Dispatcher<MainContext<P>>) + Send + 'static,
{
    let dispatcher = Dispatcher::new();
    let waker = platform.waker();
    dispatcher.set_waker(move || waker());

    dispatcher.main(MainContext::new(platform), run).into_platform()
}

/// Owns window lifecycle: creation, the run loop and teardown.
///
/// Lives on the application thread. Dropping it tears down any screen still
/// open and terminates the native platform. A pump thread that panics takes
/// the App down with it: the payload is re-raised on the application thread
/// and from there out of [`main`].
///
/// Every request the App makes of the bound thread is quiet. The App is the
/// only caller of `wait_events`, so while it waits on a request the bound
/// thread is never parked on its behalf.
pub struct App<P: NativePlatform> {
    dispatcher: Dispatcher<MainContext<P>>,
    config: PumpConfig,
    clock: Arc<dyn Clock>,
    notices_tx: Sender<PumpNotice>,
    notices_rx: Receiver<PumpNotice>,
    waker: Waker,
    terminated: bool,
}

impl<P: NativePlatform> App<P> {
    pub fn new(dispatcher: Dispatcher<MainContext<P>>, config: PumpConfig) -> Self {
        Self::with_clock(dispatcher, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        dispatcher: Dispatcher<MainContext<P>>,
        config: PumpConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let waker = dispatcher.call_quiet(|ctx| ctx.platform().waker());
        let (notices_tx, notices_rx) = unbounded();

        Self {
            dispatcher,
            config,
            clock,
            notices_tx,
            notices_rx,
            waker,
            terminated: false,
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher<MainContext<P>> {
        &self.dispatcher
    }

    #[must_use]
    pub fn config(&self) -> &PumpConfig {
        &self.config
    }

    /// Creates a native window and starts its pumps. A first paint is queued.
    ///
    /// Window or context creation failure is fatal.
    pub fn new_screen(&mut self, hints: WindowHints, tree: impl WidgetTree + 'static) -> ScreenHandle {
        let title = hints.title.clone();
        let (window, context) = match self
            .dispatcher
            .call_quiet(move |ctx| ctx.platform().create_window(&hints))
        {
            Ok(created) => created,
            Err(e) => fatal(format!("cannot create screen {title:?}: {e}")),
        };

        let tree: SharedTree = Arc::new(Mutex::new(tree));
        let screen = Arc::new(Screen::new(window, tree, Arc::clone(&self.clock)));

        let notifier = CloseNotifier::new(self.notices_tx.clone(), Arc::clone(&self.waker));

        let render_pump = RenderPump::new(
            Arc::clone(&screen),
            context,
            self.config.render_staleness,
            notifier.clone(),
        )
        .spawn(self.config.thread_name(window.0, "render"));

        let event_pump = EventPump::new(Arc::clone(&screen), notifier)
            .spawn(self.config.thread_name(window.0, "events"));

        let entry = RegisteredScreen::new(Arc::clone(&screen), event_pump, render_pump);
        self.dispatcher.call_quiet(move |ctx| ctx.register(entry));

        tracing::debug!(%window, title = %title, "screen created");
        screen.send_event(Event::Paint);

        ScreenHandle::new(screen)
    }

    #[must_use]
    pub fn screen_count(&self) -> usize {
        self.dispatcher.call_quiet(|ctx| ctx.registry().len())
    }

    /// Runs until every screen has closed.
    ///
    /// The platform is terminated when the App is dropped, which `run`
    /// guarantees on every return path.
    pub fn run(mut self) -> Result<(), AppError> {
        self.run_loop()
    }

    fn run_loop(&mut self) -> Result<(), AppError> {
        if self.screen_count() == 0 {
            tracing::debug!("no screens open, nothing to run");
            return Ok(());
        }

        loop {
            let notices: Vec<PumpNotice> = self.notices_rx.try_iter().collect();
            if !notices.is_empty() {
                for notice in notices {
                    match notice {
                        PumpNotice::Closed(window) => self.teardown(window),
                        PumpNotice::Panicked {
                            window,
                            role,
                            payload,
                        } => {
                            tracing::error!(%window, role, "pump died, shutting down");
                            panic::resume_unwind(payload);
                        }
                    }
                }

                if self.screen_count() == 0 {
                    tracing::info!("last screen closed");
                    return Ok(());
                }
                continue;
            }

            self.dispatcher.call_quiet(|ctx| ctx.forward_close_requests());

            let cursor_offset = self.config.cursor_offset;
            self.dispatcher
                .call_quiet(move |ctx| ctx.wait_events(cursor_offset))?;
        }
    }

    /// Second phase of the close protocol. Idempotent.
    fn teardown(&self, window: WindowId) {
        let Some(entry) = self.dispatcher.call_quiet(move |ctx| ctx.unregister(window)) else {
            tracing::trace!(%window, "already torn down");
            return;
        };

        let panicked = entry.join();
        self.dispatcher
            .call_quiet(move |ctx| ctx.platform().destroy_window(window));

        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }
        tracing::debug!(%window, "screen torn down");
    }

    fn shutdown(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;

        if self.dispatcher.is_drained() {
            tracing::warn!("app outlived the dispatcher; native platform not terminated");
            return;
        }

        let remaining = self.dispatcher.call_quiet(|ctx| ctx.unregister_all());
        let windows: Vec<WindowId> = remaining.iter().map(|entry| entry.screen().id()).collect();

        let mut panicked: Option<Box<dyn Any + Send>> = None;
        for entry in remaining {
            entry.screen().force_close();
            if let Some(payload) = entry.join() {
                panicked.get_or_insert(payload);
            }
        }
        for notice in self.notices_rx.try_iter() {
            if let PumpNotice::Panicked { payload, .. } = notice {
                panicked.get_or_insert(payload);
            }
        }

        self.dispatcher.call_quiet(move |ctx| {
            for window in windows {
                ctx.platform().destroy_window(window);
            }
            ctx.platform().terminate();
        });

        tracing::debug!("native platform terminated");

        if let Some(payload) = panicked {
            if !thread::panicking() {
                panic::resume_unwind(payload);
            }
        }
    }
}

impl<P: NativePlatform> Drop for App<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
