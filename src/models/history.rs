use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LEN: usize = 60;

/// Fixed-capacity sample history, oldest first. Pushing onto a full history
/// drops the oldest sample.
#[derive(Debug, Clone)]
pub struct History<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: T) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.samples.back()
    }
}

impl<T: Copy> History<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.samples.iter().copied().collect()
    }
}

impl<T: Copy + PartialOrd> History<T> {
    /// Largest sample, handy for scaling a sparkline.
    pub fn max(&self) -> Option<T> {
        self.samples
            .iter()
            .copied()
            .fold(None, |max, sample| match max {
                Some(current) if current >= sample => Some(current),
                _ => Some(sample),
            })
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}
