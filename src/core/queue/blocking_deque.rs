use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

struct Sequences<T> {
    /// Priority insertions, delivered last-in first-out.
    front: Vec<T>,
    /// Normal arrivals, delivered in order.
    back: VecDeque<T>,
}

impl<T> Sequences<T> {
    fn pop(&mut self) -> Option<T> {
        self.front.pop().or_else(|| self.back.pop_front())
    }

    fn len(&self) -> usize {
        self.front.len() + self.back.len()
    }
}

/// Unbounded multi-producer queue drained by a single logical consumer.
///
/// Items pushed with [`send_first`](Self::send_first) always come out before
/// anything pushed with [`send`](Self::send) that is still pending. There is no
/// capacity limit: a producer that outpaces the consumer grows the queue
/// without bound.
pub struct BlockingDeque<T> {
    sequences: Mutex<Sequences<T>>,
    available: Condvar,
}

impl<T> BlockingDeque<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sequences: Mutex::new(Sequences {
                front: Vec::new(),
                back: VecDeque::new(),
            }),
            available: Condvar::new(),
        }
    }

    /// Appends `item` to the back sequence.
    pub fn send(&self, item: T) {
        {
            let mut guard = self.sequences.lock().unwrap();
            guard.back.push_back(item);
        }

        self.available.notify_one();
    }

    /// Pushes `item` onto the front stack, ahead of every pending item.
    pub fn send_first(&self, item: T) {
        {
            let mut guard = self.sequences.lock().unwrap();
            guard.front.push(item);
        }

        self.available.notify_one();
    }

    /// Removes the next item, suspending the calling thread until one arrives.
    pub fn next_event(&self) -> T {
        let mut guard = self.sequences.lock().unwrap();
        loop {
            if let Some(item) = guard.pop() {
                return item;
            }

            guard = self.available.wait(guard).unwrap();
        }
    }

    /// Like [`next_event`](Self::next_event) but gives up after `timeout`.
    pub fn next_event_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.sequences.lock().unwrap();
        loop {
            if let Some(item) = guard.pop() {
                return Some(item);
            }

            let remaining = deadline.checked_duration_since(Instant::now())?;
            if remaining.is_zero() {
                return None;
            }

            guard = self.available.wait_timeout(guard, remaining).unwrap().0;
        }
    }

    pub fn try_next_event(&self) -> Option<T> {
        self.sequences.lock().unwrap().pop()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.lock().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for BlockingDeque<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_send_first_preempts_pending_sends() {
        let queue = BlockingDeque::new();

        queue.send('a');
        queue.send('b');
        queue.send_first('c');

        assert_eq!(queue.next_event(), 'c');
        assert_eq!(queue.next_event(), 'a');
        assert_eq!(queue.next_event(), 'b');
    }

    #[test]
    fn test_send_first_sent_before_normal_items_still_leads() {
        let queue = BlockingDeque::new();

        queue.send_first('c');
        queue.send('a');
        queue.send('b');

        assert_eq!(queue.next_event(), 'c');
        assert_eq!(queue.next_event(), 'a');
        assert_eq!(queue.next_event(), 'b');
    }

    #[test]
    fn test_front_sequence_is_last_in_first_out() {
        let queue = BlockingDeque::new();

        queue.send(0);
        queue.send_first(1);
        queue.send_first(2);

        assert_eq!(queue.next_event(), 2);
        assert_eq!(queue.next_event(), 1);
        assert_eq!(queue.next_event(), 0);
    }

    #[test]
    fn test_next_event_blocks_until_item_arrives() {
        let queue = Arc::new(BlockingDeque::new());
        let consumer_queue = Arc::clone(&queue);

        let consumer = thread::spawn(move || consumer_queue.next_event());

        thread::sleep(Duration::from_millis(50));
        assert!(!consumer.is_finished(), "consumer should still be waiting");

        queue.send(42);

        assert_eq!(consumer.join().unwrap(), 42);
    }

    #[test]
    fn test_next_event_timeout_on_idle_queue_returns_none() {
        let queue: BlockingDeque<u8> = BlockingDeque::new();

        assert_eq!(queue.next_event_timeout(Duration::from_millis(20)), None);
    }

    #[test]
    fn test_try_next_event_and_len() {
        let queue = BlockingDeque::new();
        assert!(queue.is_empty());
        assert_eq!(queue.try_next_event(), None::<u8>);

        queue.send(1);
        queue.send_first(2);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.try_next_event(), Some(2));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_concurrent_producers_lose_and_duplicate_nothing() {
        const PRODUCERS: usize = 8;
        const PER_PRODUCER: usize = 250;

        let queue = Arc::new(BlockingDeque::new());

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for seq in 0..PER_PRODUCER {
                        queue.send((producer, seq));
                    }
                })
            })
            .collect();

        let mut seen = HashSet::new();
        let mut last_seq = vec![None; PRODUCERS];

        for _ in 0..PRODUCERS * PER_PRODUCER {
            let (producer, seq) = queue.next_event();
            assert!(seen.insert((producer, seq)), "duplicate item {producer}/{seq}");

            if let Some(previous) = last_seq[producer] {
                assert!(seq > previous, "producer {producer} reordered: {previous} then {seq}");
            }
            last_seq[producer] = Some(seq);
        }

        for handle in producers {
            handle.join().unwrap();
        }

        assert_eq!(seen.len(), PRODUCERS * PER_PRODUCER);
        assert!(queue.is_empty());
    }
}
