use std::any::Any;
use std::fmt;
use std::panic;

use crossbeam_channel::Sender;

use crate::core::data::WindowId;
use crate::core::dispatch::Waker;

/// What a pump thread reports to the App's run loop.
pub enum PumpNotice {
    /// The event pump accepted a close; the screen awaits teardown.
    Closed(WindowId),
    /// A pump thread died. The App re-raises the payload.
    Panicked {
        window: WindowId,
        role: &'static str,
        payload: Box<dyn Any + Send>,
    },
}

impl PumpNotice {
    #[must_use]
    pub fn closed_window(&self) -> Option<WindowId> {
        match self {
            PumpNotice::Closed(window) => Some(*window),
            PumpNotice::Panicked { .. } => None,
        }
    }
}

impl fmt::Debug for PumpNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PumpNotice::Closed(window) => f.debug_tuple("Closed").field(window).finish(),
            PumpNotice::Panicked { window, role, .. } => f
                .debug_struct("Panicked")
                .field("window", window)
                .field("role", role)
                .finish_non_exhaustive(),
        }
    }
}

/// The pumps' end of the App's notification conduit.
///
/// Holds no reference to the App itself; it only posts a notice and
/// interrupts the native wait so the run loop notices promptly.
#[derive(Clone)]
pub struct CloseNotifier {
    sender: Sender<PumpNotice>,
    waker: Waker,
}

impl CloseNotifier {
    pub fn new(sender: Sender<PumpNotice>, waker: Waker) -> Self {
        Self { sender, waker }
    }

    pub fn notify(&self, window: WindowId) {
        if self.sender.send(PumpNotice::Closed(window)).is_err() {
            tracing::debug!(%window, "close conduit gone, app already shut down");
            return;
        }

        (self.waker)();
    }

    /// Hands a pump thread's panic to the App. With no App left to take it
    /// the panic continues on the pump thread.
    pub fn report_panic(&self, window: WindowId, role: &'static str, payload: Box<dyn Any + Send>) {
        tracing::error!(%window, role, "pump thread panicked");

        let notice = PumpNotice::Panicked {
            window,
            role,
            payload,
        };
        match self.sender.send(notice) {
            Ok(()) => (self.waker)(),
            Err(crossbeam_channel::SendError(PumpNotice::Panicked { payload, .. })) => {
                panic::resume_unwind(payload)
            }
            Err(_) => {}
        }
    }
}
