use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Which extreme a [`MonotonicWindow`] tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extreme {
    Max,
    Min,
}

impl Extreme {
    /// Whether `incoming` makes `held` irrelevant for the rest of its lifetime.
    /// Ties favour the newer value.
    fn displaces(self, incoming: Decimal, held: Decimal) -> bool {
        match self {
            Extreme::Max => incoming >= held,
            Extreme::Min => incoming <= held,
        }
    }
}

/// Sliding-window extreme in O(1) amortized time.
///
/// Entries are `(sequence, value)` pairs kept monotonic from front to back, so the
/// front is always the extreme of the last `len` pushes.
#[derive(Debug, Clone)]
pub(crate) struct MonotonicWindow {
    len: usize,
    kind: Extreme,
    entries: VecDeque<(usize, Decimal)>,
    pushed: usize,
}

impl MonotonicWindow {
    pub(crate) fn new(len: usize, kind: Extreme) -> Self {
        Self {
            len,
            kind,
            entries: VecDeque::with_capacity(len),
            pushed: 0,
        }
    }

    /// Push a value and return the extreme of the trailing window.
    pub(crate) fn push(&mut self, value: Decimal) -> Decimal {
        let seq = self.pushed;
        self.pushed += 1;

        while let Some(&(_, held)) = self.entries.back() {
            if self.kind.displaces(value, held) {
                self.entries.pop_back();
            } else {
                break;
            }
        }
        self.entries.push_back((seq, value));

        while let Some(&(front_seq, _)) = self.entries.front() {
            if front_seq + self.len <= seq {
                self.entries.pop_front();
            } else {
                break;
            }
        }

        self.extreme().unwrap_or(value)
    }

    pub(crate) fn extreme(&self) -> Option<Decimal> {
        self.entries.front().map(|&(_, v)| v)
    }

    /// Pushes since the current extreme entered the window.
    pub(crate) fn periods_since(&self) -> usize {
        match self.entries.front() {
            Some(&(seq, _)) => self.pushed - 1 - seq,
            None => 0,
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.pushed >= self.len
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.pushed = 0;
    }
}
