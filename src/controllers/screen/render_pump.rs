use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::controllers::screen::close_notifier::CloseNotifier;
use crate::controllers::screen::record::Screen;
use crate::core::dispatch::fatal::fatal;
use crate::core::events::{Event, RenderTask};
use crate::core::graphics::GraphicsContext;

/// Owns a screen's graphics context and drains its render queue.
///
/// The context is made current once on the pump thread and is dropped there
/// when the pump sees its `Close` sentinel.
pub struct RenderPump<G: GraphicsContext> {
    screen: Arc<Screen>,
    context: G,
    staleness: Duration,
    notifier: CloseNotifier,
}

impl<G: GraphicsContext + 'static> RenderPump<G> {
    pub(crate) fn new(
        screen: Arc<Screen>,
        context: G,
        staleness: Duration,
        notifier: CloseNotifier,
    ) -> Self {
        Self {
            screen,
            context,
            staleness,
            notifier,
        }
    }

    /// Starts the pump. A panic on the pump thread, including a context that
    /// cannot be made current, is handed to the App instead of dying quietly.
    pub(crate) fn spawn(self, name: String) -> JoinHandle<()> {
        let window = self.screen.id();
        let notifier = self.notifier.clone();

        thread::Builder::new()
            .name(name)
            .spawn(move || {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.run())) {
                    notifier.report_panic(window, "render", payload);
                }
            })
            .unwrap_or_else(|e| fatal(format!("failed to spawn render pump: {e}")))
    }

    pub(crate) fn run(mut self) {
        let window = self.screen.id();

        if let Err(e) = self.context.make_current() {
            fatal(format!("{window}: {e}"));
        }
        tracing::debug!(%window, "render pump started");

        loop {
            let event = self.screen.render_queue().next_event();
            if self.handle(event).is_break() {
                break;
            }
        }

        tracing::debug!(%window, "render pump stopped, releasing context");
    }

    pub(crate) fn handle(&mut self, event: Event) -> ControlFlow<()> {
        match event {
            Event::RawClosure(f) => f(),
            Event::RenderTask(task) => self.render(task),
            Event::Close => return ControlFlow::Break(()),
            other @ (Event::Paint
            | Event::MouseMove(_)
            | Event::MouseButton(_)
            | Event::Key(_)
            | Event::Rune(_)
            | Event::Drop(_)
            | Event::Scroll(_)
            | Event::Resize(_)) => {
                tracing::warn!(
                    window = %self.screen.id(),
                    kind = ?other.kind(),
                    "ui event on render queue, ignoring"
                );
            }
        }

        ControlFlow::Continue(())
    }

    fn render(&mut self, task: RenderTask) {
        let age = self
            .screen
            .clock()
            .now()
            .saturating_duration_since(task.stamped);

        if age > self.staleness {
            tracing::trace!(window = %self.screen.id(), ?age, "dropping stale render task");
            self.screen.stats().record_dropped();
            return;
        }

        let on_load = self.screen.callbacks().lock().unwrap().take_on_load();
        if let Some(on_load) = on_load {
            on_load(&mut self.context);
        }

        self.context.clear();
        (task.draw)(&mut self.context);

        match self.context.swap_buffers() {
            Ok(()) => self.screen.stats().record_drawn(),
            Err(e) => {
                tracing::warn!(window = %self.screen.id(), "{e}");
                self.screen.stats().record_swap_failure();
            }
        }
    }
}
