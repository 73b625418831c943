use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::controllers::screen::close_notifier::CloseNotifier;
use crate::controllers::screen::input_state::InputState;
use crate::controllers::screen::record::Screen;
use crate::core::data::Size;
use crate::core::dispatch::fatal::fatal;
use crate::core::events::{
    DropEvent, Event, KeyEvent, MouseButtonEvent, MouseMoveEvent, RuneEvent, ScrollEvent,
};

/// Drains one screen's UI-event queue and drives its widget tree.
///
/// All widget-tree mutation for the screen happens on this pump's thread.
pub struct EventPump {
    screen: Arc<Screen>,
    close_notifier: CloseNotifier,
    input: InputState,
}

impl EventPump {
    pub(crate) fn new(screen: Arc<Screen>, close_notifier: CloseNotifier) -> Self {
        Self {
            screen,
            close_notifier,
            input: InputState::default(),
        }
    }

    pub(crate) fn spawn(self, name: String) -> JoinHandle<()> {
        let window = self.screen.id();
        let notifier = self.close_notifier.clone();

        thread::Builder::new()
            .name(name)
            .spawn(move || {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.run())) {
                    notifier.report_panic(window, "event", payload);
                }
            })
            .unwrap_or_else(|e| fatal(format!("failed to spawn event pump: {e}")))
    }

    pub(crate) fn run(mut self) {
        let window = self.screen.id();
        tracing::debug!(%window, "event pump started");

        loop {
            let event = self.screen.events().next_event();
            if self.handle(event).is_break() {
                break;
            }
        }

        tracing::debug!(%window, "event pump stopped");
    }

    pub(crate) fn handle(&mut self, event: Event) -> ControlFlow<()> {
        tracing::trace!(window = %self.screen.id(), kind = ?event.kind(), "ui event");

        match event {
            Event::Paint => self.screen.request_render(),
            Event::MouseMove(ev) => self.mouse_move(ev),
            Event::MouseButton(ev) => self.mouse_button(ev),
            Event::Key(ev) => self.key(ev),
            Event::Rune(ev) => self.rune(ev),
            Event::Drop(ev) => self.drop_files(ev),
            Event::Scroll(ev) => self.scroll(ev),
            Event::Resize(size) => self.resize(size),
            Event::Close => return self.close(),
            Event::RenderTask(task) => {
                self.screen.render_queue().send(Event::RenderTask(task));
            }
            Event::RawClosure(f) => f(),
        }

        ControlFlow::Continue(())
    }

    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    fn mouse_move(&mut self, ev: MouseMoveEvent) {
        self.input.touch(self.screen.clock().now());
        let delta = self.input.move_cursor(ev.position);
        let ev = MouseMoveEvent { delta, ..ev };

        let handled = {
            let mut tree = self.screen.tree().lock().unwrap();
            let target = tree.hit_test(ev.position);
            tree.on_mouse_move(target, &ev)
        };
        self.repaint_if(handled);
    }

    fn mouse_button(&mut self, ev: MouseButtonEvent) {
        self.input.touch(self.screen.clock().now());
        self.input.apply_button(ev.button, ev.action, ev.modifiers);

        let handled = {
            let mut tree = self.screen.tree().lock().unwrap();
            let target = tree.hit_test(self.input.cursor);
            let handled = tree.on_mouse_button(target, &ev);
            self.input.focus_path = tree.focus_path();
            handled
        };
        self.repaint_if(handled);
    }

    fn key(&mut self, ev: KeyEvent) {
        self.input.touch(self.screen.clock().now());
        self.input.modifiers = ev.modifiers;

        let handled = {
            let mut tree = self.screen.tree().lock().unwrap();
            self.input.focus_path = tree.focus_path();
            tree.on_key_event(&self.input.focus_path, &ev)
        };
        self.repaint_if(handled);
    }

    fn rune(&mut self, ev: RuneEvent) {
        self.input.touch(self.screen.clock().now());

        let handled = {
            let mut tree = self.screen.tree().lock().unwrap();
            self.input.focus_path = tree.focus_path();
            tree.on_rune_event(&self.input.focus_path, &ev)
        };
        self.repaint_if(handled);
    }

    fn drop_files(&mut self, ev: DropEvent) {
        self.input.touch(self.screen.clock().now());

        let mut handled = {
            let mut tree = self.screen.tree().lock().unwrap();
            let target = tree.hit_test(self.input.cursor);
            tree.on_drop_event(target, &ev)
        };

        let callback = self.screen.callbacks().lock().unwrap().drop_handler();
        if let Some(callback) = callback {
            handled |= callback(&ev);
        }
        self.repaint_if(handled);
    }

    fn scroll(&mut self, ev: ScrollEvent) {
        self.input.touch(self.screen.clock().now());

        let handled = {
            let mut tree = self.screen.tree().lock().unwrap();
            let target = tree.hit_test(self.input.cursor);
            tree.on_scroll_event(target, &ev)
        };
        self.repaint_if(handled);
    }

    fn resize(&mut self, size: Size) {
        self.input.framebuffer_size = size;

        self.screen.tree().lock().unwrap().on_resize_event(size);

        let callback = self.screen.callbacks().lock().unwrap().resize();
        if let Some(callback) = callback {
            callback(size);
        }

        // a resized framebuffer holds garbage until redrawn
        self.screen.request_render();
    }

    fn close(&mut self) -> ControlFlow<()> {
        let window = self.screen.id();
        let accepted =
            self.screen.is_force_closing() || self.screen.tree().lock().unwrap().on_close_event();

        if !accepted {
            tracing::debug!(%window, "close rejected by policy");
            return ControlFlow::Continue(());
        }

        self.screen.render_queue().send(Event::Close);
        self.close_notifier.notify(window);

        ControlFlow::Break(())
    }

    fn repaint_if(&self, handled: bool) {
        if handled {
            self.screen.request_render();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::screen::ports::WidgetTree;
    use crate::controllers::screen::close_notifier::PumpNotice;
    use crate::controllers::screen::record::SharedTree;
    use crate::core::clock::{Clock, ManualClock};
    use crate::core::data::{Point, WidgetId, WindowId};
    use crate::core::events::{Action, EventKind, Modifiers, MouseButton};
    use crate::core::graphics::GraphicsContext;
    use crossbeam_channel::{Receiver, unbounded};
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct Journal {
        calls: Vec<String>,
    }

    struct RecordingTree {
        journal: Arc<Mutex<Journal>>,
        accept_close: bool,
    }

    impl RecordingTree {
        fn log(&self, entry: String) {
            self.journal.lock().unwrap().calls.push(entry);
        }
    }

    impl WidgetTree for RecordingTree {
        fn draw(&self, _ctx: &mut dyn GraphicsContext) {}

        fn on_mouse_move(&mut self, target: Option<WidgetId>, event: &MouseMoveEvent) -> bool {
            self.log(format!(
                "move {:?} {},{} d{},{}",
                target.map(|w| w.0),
                event.position.x,
                event.position.y,
                event.delta.x,
                event.delta.y
            ));
            false
        }

        fn on_mouse_button(&mut self, target: Option<WidgetId>, _event: &MouseButtonEvent) -> bool {
            self.log(format!("button {:?}", target.map(|w| w.0)));
            true
        }

        fn on_key_event(&mut self, focus_path: &[WidgetId], event: &KeyEvent) -> bool {
            self.log(format!("key {} path {}", event.key, focus_path.len()));
            false
        }

        fn on_rune_event(&mut self, focus_path: &[WidgetId], event: &RuneEvent) -> bool {
            self.log(format!("rune {} path {}", event.rune, focus_path.len()));
            false
        }

        fn on_drop_event(&mut self, _target: Option<WidgetId>, event: &DropEvent) -> bool {
            self.log(format!("drop {}", event.paths.len()));
            false
        }

        fn on_scroll_event(&mut self, _target: Option<WidgetId>, event: &ScrollEvent) -> bool {
            self.log(format!("scroll {}", event.y));
            false
        }

        fn on_resize_event(&mut self, size: Size) -> bool {
            self.log(format!("resize {}x{}", size.width, size.height));
            true
        }

        fn on_close_event(&mut self) -> bool {
            self.log("close".to_owned());
            self.accept_close
        }

        fn hit_test(&self, point: Point) -> Option<WidgetId> {
            (point.x >= 10.0).then_some(WidgetId(7))
        }

        fn focus_path(&self) -> Vec<WidgetId> {
            vec![WidgetId(0), WidgetId(7)]
        }
    }

    struct Fixture {
        pump: EventPump,
        screen: Arc<Screen>,
        journal: Arc<Mutex<Journal>>,
        closed: Receiver<PumpNotice>,
        wakes: Arc<AtomicUsize>,
        clock: Arc<ManualClock>,
    }

    impl Fixture {
        fn calls(&self) -> Vec<String> {
            self.journal.lock().unwrap().calls.clone()
        }

        fn render_kinds(&self) -> Vec<EventKind> {
            std::iter::from_fn(|| self.screen.render_queue().try_next_event())
                .map(|event| event.kind())
                .collect()
        }
    }

    fn closed_windows(notices: &Receiver<PumpNotice>) -> Vec<WindowId> {
        notices.try_iter().filter_map(|n| n.closed_window()).collect()
    }

    fn fixture(accept_close: bool) -> Fixture {
        let journal = Arc::new(Mutex::new(Journal::default()));
        let tree: SharedTree = Arc::new(Mutex::new(RecordingTree {
            journal: Arc::clone(&journal),
            accept_close,
        }));
        let clock = Arc::new(ManualClock::default());
        let screen = Arc::new(Screen::new(
            WindowId(3),
            tree,
            Arc::clone(&clock) as Arc<dyn Clock>,
        ));

        let (sender, closed) = unbounded();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        let notifier = CloseNotifier::new(
            sender,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        Fixture {
            pump: EventPump::new(Arc::clone(&screen), notifier),
            screen,
            journal,
            closed,
            wakes,
            clock,
        }
    }

    #[test]
    fn test_mouse_move_updates_cursor_and_routes_to_hit_widget() {
        let mut f = fixture(true);
        let moved = |x, y| {
            Event::MouseMove(MouseMoveEvent {
                position: Point::new(x, y),
                delta: Point::default(),
            })
        };

        let _ = f.pump.handle(moved(4.0, 4.0));
        f.clock.advance(Duration::from_millis(3));
        let _ = f.pump.handle(moved(12.0, 6.0));

        assert_eq!(
            f.calls(),
            vec!["move None 4,4 d4,4", "move Some(7) 12,6 d8,2"]
        );
        assert_eq!(f.pump.input().cursor, Point::new(12.0, 6.0));
        assert_eq!(f.pump.input().last_interaction, Some(f.clock.now()));
        assert!(f.render_kinds().is_empty(), "unhandled move must not repaint");
    }

    #[test]
    fn test_handled_button_records_state_and_requests_render() {
        let mut f = fixture(true);
        let _ = f.pump.handle(Event::MouseMove(MouseMoveEvent {
            position: Point::new(20.0, 1.0),
            delta: Point::default(),
        }));

        let _ = f.pump.handle(Event::MouseButton(MouseButtonEvent {
            button: MouseButton::Left,
            action: Action::Press,
            modifiers: Modifiers::NONE,
        }));

        assert!(f.pump.input().is_pressed(MouseButton::Left));
        assert_eq!(f.pump.input().focus_path, vec![WidgetId(0), WidgetId(7)]);
        assert_eq!(f.calls().last().unwrap(), "button Some(7)");
        assert_eq!(f.render_kinds(), vec![EventKind::RenderTask]);
    }

    #[test]
    fn test_keyboard_events_follow_focus_path() {
        let mut f = fixture(true);
        let ctrl = Modifiers {
            control: true,
            ..Modifiers::default()
        };

        let _ = f.pump.handle(Event::Key(KeyEvent {
            key: 65,
            scancode: 30,
            action: Action::Press,
            modifiers: ctrl,
        }));
        let _ = f.pump.handle(Event::Rune(RuneEvent {
            rune: 'a',
            modifiers: ctrl,
        }));

        assert_eq!(f.calls(), vec!["key 65 path 2", "rune a path 2"]);
        assert!(f.pump.input().modifiers.control);
    }

    #[test]
    fn test_drop_reaches_tree_and_screen_callback() {
        let mut f = fixture(true);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        f.screen.callbacks().lock().unwrap().drop = Some(Arc::new(move |ev: &DropEvent| {
            counter.fetch_add(ev.paths.len(), Ordering::SeqCst);
            true
        }));

        let _ = f.pump.handle(Event::Drop(DropEvent {
            paths: vec![PathBuf::from("a.png"), PathBuf::from("b.png")],
        }));

        assert_eq!(f.calls(), vec!["drop 2"]);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(f.render_kinds(), vec![EventKind::RenderTask]);
    }

    #[test]
    fn test_resize_notifies_tree_and_callback_then_repaints() {
        let mut f = fixture(true);
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        f.screen.callbacks().lock().unwrap().resize = Some(Arc::new(move |size: Size| {
            *sink.lock().unwrap() = Some(size);
            false
        }));

        let _ = f.pump.handle(Event::Resize(Size::new(640, 480)));

        assert_eq!(f.calls(), vec!["resize 640x480"]);
        assert_eq!(*seen.lock().unwrap(), Some(Size::new(640, 480)));
        assert_eq!(f.pump.input().framebuffer_size, Size::new(640, 480));
        assert_eq!(f.render_kinds(), vec![EventKind::RenderTask]);
    }

    #[test]
    fn test_paint_stamps_render_task_with_current_time() {
        let mut f = fixture(true);
        f.clock.advance(Duration::from_millis(40));

        let _ = f.pump.handle(Event::Paint);

        match f.screen.render_queue().try_next_event() {
            Some(Event::RenderTask(task)) => assert_eq!(task.stamped, f.clock.now()),
            other => panic!("expected a render task, got {other:?}"),
        }
    }

    #[test]
    fn test_accepted_close_stops_render_pump_and_notifies_app_once() {
        let mut f = fixture(true);

        let flow = f.pump.handle(Event::Close);

        assert!(flow.is_break());
        assert_eq!(f.render_kinds(), vec![EventKind::Close]);
        assert_eq!(closed_windows(&f.closed), vec![WindowId(3)]);
        assert_eq!(f.wakes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rejected_close_is_absorbed() {
        let mut f = fixture(false);

        let flow = f.pump.handle(Event::Close);

        assert!(flow.is_continue());
        assert_eq!(f.calls(), vec!["close"]);
        assert!(f.render_kinds().is_empty());
        assert!(f.closed.try_recv().is_err());
        assert_eq!(f.wakes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_forced_close_bypasses_policy() {
        let mut f = fixture(false);
        f.screen.force_close();

        let event = f.screen.events().next_event();
        let flow = f.pump.handle(event);

        assert!(flow.is_break());
        assert!(f.calls().is_empty(), "policy must not be consulted");
        assert_eq!(closed_windows(&f.closed), vec![WindowId(3)]);
    }

    #[test]
    fn test_run_executes_raw_closures_on_pump_thread_and_exits_on_close() {
        let f = fixture(true);
        let screen = Arc::clone(&f.screen);
        let handle = f.pump.spawn("test-events".to_owned());

        let (ran_on, observed) = crossbeam_channel::bounded(1);
        screen.send_event(Event::raw(move || {
            let _ = ran_on.send(thread::current().name().map(str::to_owned));
        }));
        screen.send_event(Event::Close);

        assert_eq!(
            observed.recv_timeout(Duration::from_secs(2)).unwrap().as_deref(),
            Some("test-events")
        );
        handle.join().unwrap();
        assert_eq!(closed_windows(&f.closed), vec![WindowId(3)]);
    }

    #[test]
    fn test_panicking_handler_is_reported_to_app() {
        let f = fixture(true);
        let screen = Arc::clone(&f.screen);
        let handle = f.pump.spawn("test-events".to_owned());

        screen.send_event(Event::raw(|| panic!("handler blew up")));

        assert!(handle.join().is_ok(), "the panic is handed over, not left on the thread");
        match f.closed.try_recv() {
            Ok(PumpNotice::Panicked { window, role, payload }) => {
                assert_eq!(window, WindowId(3));
                assert_eq!(role, "event");
                assert_eq!(payload.downcast_ref::<&str>(), Some(&"handler blew up"));
            }
            other => panic!("expected a panic notice, got {other:?}"),
        }
    }

    #[test]
    fn test_render_task_on_ui_queue_is_forwarded() {
        let mut f = fixture(true);
        let task = f.screen.render_task(f.clock.now());

        let _ = f.pump.handle(task);

        assert_eq!(f.render_kinds(), vec![EventKind::RenderTask]);
    }
}
