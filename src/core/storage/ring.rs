use crate::{
    Error,
    Result,
};

/// Ring/bounded buffer of T's.
#[derive(Clone, Debug)]
pub struct Ring<T> {
    buffer: Vec<Option<T>>,
    begin: usize,
    len: usize,
}

impl<T> Ring<T> {
    /// Creates an empty ring which holds at most capacity items.
    pub fn new(capacity: usize) -> Ring<T> {
        let mut buffer = Vec::with_capacity(capacity);
        buffer.resize_with(capacity, || None);

        Ring {
            buffer,
            begin: 0,
            len: 0,
        }
    }

    /// Removes and returns the head of the buffer or returns an error if the
    /// buffer is empty.
    pub fn dequeue(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(Error::Exhausted);
        }

        let item = self.buffer[self.begin].take();
        self.begin = (self.begin + 1) % self.buffer.len();
        self.len -= 1;
        item.ok_or(Error::Exhausted)
    }

    /// Appends an item to the tail of the buffer or returns an error if the
    /// buffer is full, in which case the item is dropped.
    pub fn enqueue(&mut self, item: T) -> Result<()> {
        if self.len == self.buffer.len() {
            return Err(Error::Exhausted);
        }

        let idx = (self.begin + self.len) % self.buffer.len();
        self.buffer[idx] = Some(item);
        self.len += 1;
        Ok(())
    }

    /// Removes every item f returns false for, keeping the order of the rest.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        for _ in 0 .. self.len {
            if let Ok(item) = self.dequeue() {
                if f(&item) {
                    // Cannot fail, an item was just dequeued.
                    let _ = self.enqueue(item);
                }
            }
        }
    }

    /// Returns the current number of items in the ring.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks if the ring holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the maximum number of items in the ring.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}
