pub mod blocking_deque;

pub use blocking_deque::BlockingDeque;
