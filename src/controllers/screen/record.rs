use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::controllers::screen::ports::WidgetTree;
use crate::controllers::screen::stats::{RenderStats, RenderStatsSnapshot};
use crate::core::clock::Clock;
use crate::core::data::{Size, WindowId};
use crate::core::events::{DropEvent, Event, RenderTask};
use crate::core::graphics::GraphicsContext;
use crate::core::queue::BlockingDeque;

pub type SharedTree = Arc<Mutex<dyn WidgetTree>>;

type OnLoad = Box<dyn FnOnce(&mut dyn GraphicsContext) + Send>;
type DrawContents = Box<dyn FnMut(&mut dyn GraphicsContext) + Send>;
type ResizeCallback = Arc<dyn Fn(Size) -> bool + Send + Sync>;
type DropCallback = Arc<dyn Fn(&DropEvent) -> bool + Send + Sync>;

#[derive(Default)]
pub(crate) struct ScreenCallbacks {
    pub(crate) on_load: Option<OnLoad>,
    pub(crate) draw_contents: Option<DrawContents>,
    pub(crate) resize: Option<ResizeCallback>,
    pub(crate) drop: Option<DropCallback>,
}

impl ScreenCallbacks {
    pub(crate) fn take_on_load(&mut self) -> Option<OnLoad> {
        self.on_load.take()
    }

    pub(crate) fn resize(&self) -> Option<ResizeCallback> {
        self.resize.clone()
    }

    pub(crate) fn drop_handler(&self) -> Option<DropCallback> {
        self.drop.clone()
    }
}

/// Per-window record shared by the App, both pumps and every handle.
pub(crate) struct Screen {
    id: WindowId,
    events: BlockingDeque<Event>,
    render: BlockingDeque<Event>,
    tree: SharedTree,
    callbacks: Arc<Mutex<ScreenCallbacks>>,
    stats: RenderStats,
    clock: Arc<dyn Clock>,
    force_close: AtomicBool,
}

impl Screen {
    pub(crate) fn new(id: WindowId, tree: SharedTree, clock: Arc<dyn Clock>) -> Self {
        Self {
            id,
            events: BlockingDeque::new(),
            render: BlockingDeque::new(),
            tree,
            callbacks: Arc::new(Mutex::new(ScreenCallbacks::default())),
            stats: RenderStats::default(),
            clock,
            force_close: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> WindowId {
        self.id
    }

    pub(crate) fn events(&self) -> &BlockingDeque<Event> {
        &self.events
    }

    pub(crate) fn render_queue(&self) -> &BlockingDeque<Event> {
        &self.render
    }

    pub(crate) fn tree(&self) -> &SharedTree {
        &self.tree
    }

    pub(crate) fn callbacks(&self) -> &Mutex<ScreenCallbacks> {
        &self.callbacks
    }

    pub(crate) fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn send_event(&self, event: Event) {
        self.events.send(event);
    }

    /// Queues a paint of the whole tree stamped with the current time.
    pub(crate) fn request_render(&self) {
        self.render.send(self.render_task(self.clock.now()));
    }

    pub(crate) fn render_task(&self, stamped: Instant) -> Event {
        let tree = Arc::clone(&self.tree);
        let callbacks = Arc::clone(&self.callbacks);

        Event::RenderTask(RenderTask::new(stamped, move |ctx| {
            let draw_contents = callbacks.lock().unwrap().draw_contents.take();
            if let Some(mut draw_contents) = draw_contents {
                draw_contents(ctx);
                callbacks
                    .lock()
                    .unwrap()
                    .draw_contents
                    .get_or_insert(draw_contents);
            }

            tree.lock().unwrap().draw(ctx);
        }))
    }

    /// Marks the screen so its next `Close` bypasses the close policy, then
    /// queues that `Close` ahead of everything else.
    pub(crate) fn force_close(&self) {
        self.force_close.store(true, Ordering::Release);
        self.events.send_first(Event::Close);
    }

    pub(crate) fn is_force_closing(&self) -> bool {
        self.force_close.load(Ordering::Acquire)
    }
}

/// Caller-facing handle to a window created by [`App::new_screen`](crate::App::new_screen).
///
/// Cheap to clone and usable from any thread; every operation is a queue
/// insertion and none of them blocks.
#[derive(Clone)]
pub struct ScreenHandle {
    screen: Arc<Screen>,
}

impl ScreenHandle {
    pub(crate) fn new(screen: Arc<Screen>) -> Self {
        Self { screen }
    }

    #[must_use]
    pub fn id(&self) -> WindowId {
        self.screen.id()
    }

    /// Runs once on the render thread, with the context current, before the
    /// next frame that is actually drawn.
    pub fn set_on_load(&self, f: impl FnOnce(&mut dyn GraphicsContext) + Send + 'static) {
        self.screen.callbacks().lock().unwrap().on_load = Some(Box::new(f));
    }

    /// Draws behind the widget tree on every frame.
    pub fn set_draw_contents_callback(
        &self,
        f: impl FnMut(&mut dyn GraphicsContext) + Send + 'static,
    ) {
        self.screen.callbacks().lock().unwrap().draw_contents = Some(Box::new(f));
    }

    pub fn set_resize_event_callback(&self, f: impl Fn(Size) -> bool + Send + Sync + 'static) {
        self.screen.callbacks().lock().unwrap().resize = Some(Arc::new(f));
    }

    pub fn set_drop_event_callback(
        &self,
        f: impl Fn(&DropEvent) -> bool + Send + Sync + 'static,
    ) {
        self.screen.callbacks().lock().unwrap().drop = Some(Arc::new(f));
    }

    /// Lays the tree out on the event pump thread.
    pub fn perform_layout(&self) {
        let tree = Arc::clone(self.screen.tree());
        self.screen.send_event(Event::raw(move || {
            tree.lock().unwrap().perform_layout();
        }));
    }

    pub fn on_paint(&self) {
        self.screen.request_render();
    }

    /// Asks the close policy whether the window may close.
    pub fn request_close(&self) {
        self.screen.send_event(Event::Close);
    }

    pub fn send_event(&self, event: Event) {
        self.screen.send_event(event);
    }

    pub fn run_on_event_thread(&self, f: impl FnOnce() + Send + 'static) {
        self.screen.send_event(Event::raw(f));
    }

    pub fn run_on_render_thread(&self, f: impl FnOnce() + Send + 'static) {
        self.screen.render_queue().send(Event::raw(f));
    }

    #[must_use]
    pub fn stats(&self) -> RenderStatsSnapshot {
        self.screen.stats().snapshot()
    }

    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.screen.events().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::data::{Point, WidgetId};
    use crate::core::events::EventKind;
    use crate::core::graphics::{ContextError, Surface};
    use std::sync::atomic::AtomicUsize;

    struct CountingTree {
        draws: Arc<AtomicUsize>,
        layouts: Arc<AtomicUsize>,
    }

    impl WidgetTree for CountingTree {
        fn draw(&self, _ctx: &mut dyn GraphicsContext) {
            self.draws.fetch_add(1, Ordering::SeqCst);
        }

        fn hit_test(&self, _point: Point) -> Option<WidgetId> {
            None
        }

        fn focus_path(&self) -> Vec<WidgetId> {
            Vec::new()
        }

        fn perform_layout(&mut self) {
            self.layouts.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct NullContext {
        buffer: Vec<u8>,
    }

    impl GraphicsContext for NullContext {
        fn make_current(&mut self) -> Result<(), ContextError> {
            Ok(())
        }

        fn clear(&mut self) {}

        fn swap_buffers(&mut self) -> Result<(), ContextError> {
            Ok(())
        }

        fn framebuffer_size(&self) -> Size {
            Size::new(1, 1)
        }

        fn surface(&mut self) -> Surface<'_> {
            Surface {
                pixels: &mut self.buffer,
                size: Size::new(1, 1),
            }
        }
    }

    fn screen() -> (Arc<Screen>, Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<ManualClock>) {
        let draws = Arc::new(AtomicUsize::new(0));
        let layouts = Arc::new(AtomicUsize::new(0));
        let clock = Arc::new(ManualClock::default());
        let tree: SharedTree = Arc::new(Mutex::new(CountingTree {
            draws: Arc::clone(&draws),
            layouts: Arc::clone(&layouts),
        }));

        let screen = Arc::new(Screen::new(
            WindowId(1),
            tree,
            Arc::clone(&clock) as Arc<dyn Clock>,
        ));
        (screen, draws, layouts, clock)
    }

    #[test]
    fn test_on_paint_enqueues_render_task_stamped_now() {
        let (screen, _, _, clock) = screen();
        let handle = ScreenHandle::new(Arc::clone(&screen));

        handle.on_paint();

        match screen.render_queue().try_next_event() {
            Some(Event::RenderTask(task)) => assert_eq!(task.stamped, clock.now()),
            other => panic!("expected a render task, got {other:?}"),
        }
    }

    #[test]
    fn test_render_task_draws_contents_then_tree() {
        let (screen, draws, _, clock) = screen();
        let handle = ScreenHandle::new(Arc::clone(&screen));
        let contents = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&contents);
        handle.set_draw_contents_callback(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut ctx = NullContext { buffer: vec![0; 4] };
        for _ in 0..2 {
            let Event::RenderTask(task) = screen.render_task(clock.now()) else {
                panic!("render_task must build a RenderTask");
            };
            (task.draw)(&mut ctx);
        }

        assert_eq!(contents.load(Ordering::SeqCst), 2);
        assert_eq!(draws.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_perform_layout_runs_as_raw_closure_on_event_queue() {
        let (screen, _, layouts, _) = screen();
        let handle = ScreenHandle::new(Arc::clone(&screen));

        handle.perform_layout();
        assert_eq!(layouts.load(Ordering::SeqCst), 0);

        match screen.events().try_next_event() {
            Some(Event::RawClosure(f)) => f(),
            other => panic!("expected a raw closure, got {other:?}"),
        }
        assert_eq!(layouts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_force_close_preempts_pending_events() {
        let (screen, _, _, _) = screen();
        screen.send_event(Event::Paint);

        screen.force_close();

        assert!(screen.is_force_closing());
        assert_eq!(screen.events().next_event().kind(), EventKind::Close);
        assert_eq!(screen.events().next_event().kind(), EventKind::Paint);
    }
}
