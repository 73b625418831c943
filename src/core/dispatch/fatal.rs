use std::fmt::Display;

/// Reports an unrecoverable invariant violation and unwinds.
///
/// Sequencing mistakes and resource-acquisition failures in the windowing
/// core are not recoverable, so there is no error channel for them.
#[track_caller]
pub(crate) fn fatal(message: impl Display) -> ! {
    tracing::error!("fatal: {message}");
    panic!("{message}");
}
