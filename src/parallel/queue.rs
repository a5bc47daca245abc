use crossbeam::channel::{Receiver, Sender, unbounded};

/// Unbounded FIFO shared between threads.
///
/// `push` never blocks; `pop` parks the calling thread until an item is
/// available. Any number of producers and consumers may use the queue
/// concurrently and each item is handed to exactly one `pop`.
#[derive(Debug)]
pub struct BlockingQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> BlockingQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Enqueue an item and wake one waiting consumer
    pub fn push(&self, item: T) {
        // Cannot fail: `self.rx` keeps the channel connected
        let _ = self.tx.send(item);
    }

    /// Dequeue the oldest item, blocking while the queue is empty
    pub fn pop(&self) -> T {
        match self.rx.recv() {
            Ok(item) => item,
            // `self.tx` keeps the channel connected for as long as `self` lives
            Err(_) => unreachable!("queue disconnected while borrowed"),
        }
    }

    /// Dequeue the oldest item if there is one
    pub fn try_pop(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
