//! Fixed-capacity circular sample buffer.

use alloc::vec::Vec;

use crate::error::DelayLineError;

/// A FIFO ring of samples whose capacity never changes after construction.
///
/// All operations are O(1) and allocation-free. `head` is the oldest sample,
/// `tail` is where the next sample will be written.
#[derive(Clone, Debug)]
pub struct DelayLine {
    buf: Vec<f32>,
    head: usize,
    tail: usize,
    count: usize,
}

impl DelayLine {
    /// Create an empty line holding at most `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self::from_storage(Vec::new(), capacity)
    }

    /// Build a line on top of recycled storage.
    ///
    /// Does not allocate when `storage` already has room for `capacity` samples.
    pub fn from_storage(mut storage: Vec<f32>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        storage.clear();
        storage.resize(capacity, 0.0);
        Self {
            buf: storage,
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Give the backing storage back for reuse.
    pub fn into_storage(self) -> Vec<f32> {
        self.buf
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.buf.len()
    }

    /// Append a sample behind the newest one.
    #[inline]
    pub fn enqueue(&mut self, x: f32) -> Result<(), DelayLineError> {
        if self.is_full() {
            return Err(DelayLineError::Full);
        }
        self.buf[self.tail] = x;
        self.tail = self.wrap(self.tail + 1);
        self.count += 1;
        Ok(())
    }

    /// Remove and return the oldest sample.
    #[inline]
    pub fn dequeue(&mut self) -> Result<f32, DelayLineError> {
        if self.is_empty() {
            return Err(DelayLineError::Empty);
        }
        let x = self.buf[self.head];
        self.head = self.wrap(self.head + 1);
        self.count -= 1;
        Ok(x)
    }

    /// The oldest sample, without removing it.
    #[inline]
    pub fn peek(&self) -> Result<f32, DelayLineError> {
        if self.is_empty() {
            return Err(DelayLineError::Empty);
        }
        Ok(self.buf[self.head])
    }

    /// Replace the whole contents with `f()` per cell, leaving the line full.
    pub fn fill_with(&mut self, mut f: impl FnMut() -> f32) {
        for cell in self.buf.iter_mut() {
            *cell = f();
        }
        self.head = 0;
        self.tail = 0;
        self.count = self.buf.len();
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let cap = self.buf.len();
        (0..self.count).map(move |i| self.buf[(self.head + i) % cap])
    }

    #[inline]
    fn wrap(&self, idx: usize) -> usize {
        if idx == self.buf.len() { 0 } else { idx }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_and_count() {
        let mut line = DelayLine::new(4);
        let mut enq = 0;
        let mut deq = 0;
        let mut next_in = 0.0;
        let mut next_out = 0.0;

        // interleave pushes and pops so head and tail wrap several times
        for round in 0..20 {
            let pushes = 1 + round % 3;
            for _ in 0..pushes {
                if line.is_full() {
                    break;
                }
                line.enqueue(next_in).unwrap();
                next_in += 1.0;
                enq += 1;
            }
            let pops = 1 + round % 2;
            for _ in 0..pops {
                if line.is_empty() {
                    break;
                }
                assert_eq!(line.peek().unwrap(), next_out);
                assert_eq!(line.dequeue().unwrap(), next_out);
                next_out += 1.0;
                deq += 1;
            }
            assert_eq!(line.size(), enq - deq);
            assert!(line.size() <= line.capacity());
        }
    }

    #[test]
    fn overflow_and_underflow_are_errors() {
        let mut line = DelayLine::new(2);
        assert_eq!(line.dequeue(), Err(DelayLineError::Empty));
        assert_eq!(line.peek(), Err(DelayLineError::Empty));

        line.enqueue(1.0).unwrap();
        line.enqueue(2.0).unwrap();
        assert!(line.is_full());
        assert_eq!(line.enqueue(3.0), Err(DelayLineError::Full));
        // the failed enqueue must not disturb existing contents
        assert_eq!(line.iter().collect::<Vec<_>>(), vec![1.0, 2.0]);
    }

    #[test]
    fn fill_replaces_contents() {
        let mut line = DelayLine::new(3);
        line.enqueue(9.0).unwrap();
        line.dequeue().unwrap();

        let mut v = 0.0;
        line.fill_with(|| {
            v += 1.0;
            v
        });
        assert!(line.is_full());
        assert_eq!(line.iter().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn recycled_storage_keeps_allocation() {
        let storage = Vec::with_capacity(2205);
        let ptr = storage.as_ptr();
        let line = DelayLine::from_storage(storage, 100);
        assert_eq!(line.capacity(), 100);
        let storage = line.into_storage();
        assert_eq!(storage.as_ptr(), ptr);
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let line = DelayLine::new(0);
        assert_eq!(line.capacity(), 1);
    }
}
