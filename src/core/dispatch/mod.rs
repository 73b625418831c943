pub mod dispatcher;
pub(crate) mod fatal;

pub use dispatcher::{Dispatcher, Waker};
