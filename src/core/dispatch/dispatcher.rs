use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use crossbeam_channel::{Sender, bounded, unbounded};

use crate::core::dispatch::fatal::fatal;

type Request<C> = Box<dyn FnOnce(&mut C) + Send>;

/// Interrupts a blocking native wait so queued requests get serviced.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

enum DispatcherState<C> {
    /// No thread has been bound yet; nothing can be serviced.
    Unbound,
    Bound {
        requests: Sender<Request<C>>,
        thread: ThreadId,
    },
    /// The application routine returned and the conduit is closed.
    Drained,
}

impl<C> DispatcherState<C> {
    fn name(&self) -> &'static str {
        match self {
            DispatcherState::Unbound => "unbound",
            DispatcherState::Bound { .. } => "bound",
            DispatcherState::Drained => "drained",
        }
    }
}

struct Inner<C> {
    state: Mutex<DispatcherState<C>>,
    waker: Mutex<Option<Waker>>,
}

/// Marshals closures onto the one thread allowed to talk to the native
/// windowing system.
///
/// Closures run against a context `C` that lives on that thread for the whole
/// process and never crosses to another one.
pub struct Dispatcher<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: 'static> Dispatcher<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(DispatcherState::Unbound),
                waker: Mutex::new(None),
            }),
        }
    }

    /// Binds the calling thread, runs `run` on a separate application thread
    /// and services [`call`](Self::call) requests until `run` returns.
    ///
    /// Returns the context once the conduit is drained. A panic in `run` is
    /// re-raised here after draining.
    pub fn main<F>(&self, mut context: C, run: F) -> C
    where
        F: FnOnce(Dispatcher<C>) + Send + 'static,
    {
        let (requests, inbox) = unbounded::<Request<C>>();

        let previous = {
            let mut state = self.inner.state.lock().unwrap();
            let previous = state.name();
            if matches!(*state, DispatcherState::Unbound) {
                *state = DispatcherState::Bound {
                    requests,
                    thread: thread::current().id(),
                };
            }
            previous
        };

        if previous != "unbound" {
            fatal(format!("Dispatcher::main entered twice (dispatcher is {previous})"));
        }

        tracing::debug!(thread = ?thread::current().id(), "dispatcher bound");

        let app_dispatcher = self.clone();
        let app = thread::Builder::new()
            .name("app".to_owned())
            .spawn(move || {
                let _drain = DrainOnExit(app_dispatcher.clone());
                run(app_dispatcher);
            })
            .unwrap_or_else(|e| fatal(format!("failed to spawn the application thread: {e}")));

        for request in inbox.iter() {
            request(&mut context);
        }

        tracing::debug!("dispatch conduit drained");

        if let Err(panic) = app.join() {
            std::panic::resume_unwind(panic);
        }

        context
    }

    /// Runs `f` on the bound thread and blocks until it has returned.
    ///
    /// Fatal before [`main`](Self::main) has bound a thread or after the
    /// application routine has returned. Must not be called from the bound
    /// thread itself. There is no timeout: a closure that never returns
    /// blocks every later caller.
    pub fn call<R, F>(&self, f: F) -> R
    where
        R: Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        self.submit(f, true)
    }

    /// Like [`call`](Self::call) but leaves the native wait alone.
    ///
    /// For the one caller that also drives the native wait: while it is
    /// blocked here the bound thread cannot be parked on its behalf, so a wake
    /// would only make the next wait return at once.
    pub(crate) fn call_quiet<R, F>(&self, f: F) -> R
    where
        R: Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        self.submit(f, false)
    }

    fn submit<R, F>(&self, f: F, wake: bool) -> R
    where
        R: Send + 'static,
        F: FnOnce(&mut C) -> R + Send + 'static,
    {
        let (requests, bound_thread) = match self.bound_sender() {
            Ok(bound) => bound,
            Err("unbound") => fatal(
                "Dispatcher::call before Dispatcher::main: no thread is bound to the windowing system",
            ),
            Err(state) => fatal(format!("Dispatcher::call on a {state} dispatcher")),
        };

        debug_assert_ne!(
            bound_thread,
            thread::current().id(),
            "Dispatcher::call from the bound thread deadlocks"
        );

        let (done, completion) = bounded(1);
        let request: Request<C> = Box::new(move |context| {
            let _ = done.send(f(context));
        });

        if requests.send(request).is_err() {
            fatal("dispatch conduit closed while bound");
        }
        drop(requests);

        if wake {
            self.wake();
        }

        completion
            .recv()
            .unwrap_or_else(|_| fatal("dispatch request dropped before completing"))
    }

    /// Installs the routine used to interrupt a blocking native wait.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self.inner.waker.lock().unwrap() = Some(Arc::new(waker));
    }

    #[must_use]
    pub fn is_bound_thread(&self) -> bool {
        matches!(
            &*self.inner.state.lock().unwrap(),
            DispatcherState::Bound { thread, .. } if *thread == thread::current().id()
        )
    }

    #[must_use]
    pub fn is_drained(&self) -> bool {
        matches!(*self.inner.state.lock().unwrap(), DispatcherState::Drained)
    }

    fn bound_sender(&self) -> Result<(Sender<Request<C>>, ThreadId), &'static str> {
        let state = self.inner.state.lock().unwrap();
        match &*state {
            DispatcherState::Bound { requests, thread } => Ok((requests.clone(), *thread)),
            other => Err(other.name()),
        }
    }

    fn wake(&self) {
        let waker = self.inner.waker.lock().unwrap().clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl<C: 'static> Default for Dispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Closes the conduit when the application routine ends, including by panic.
struct DrainOnExit<C>(Dispatcher<C>);

impl<C> Drop for DrainOnExit<C> {
    fn drop(&mut self) {
        let mut state = match self.0.inner.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *state = DispatcherState::Drained;
    }
}
