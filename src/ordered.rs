// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Re-establishes input order for results that complete in any order.

/// Index-keyed slots for results of `len` tasks.
///
/// Results are inserted by their input position as they complete. `pop_ready` hands out the contiguous prefix of
/// completed results that has not been handed out yet, so a consumer may flush incrementally without ever skipping
/// a position.
#[derive(Debug)]
pub struct OrderedOutput<T> {
    slots: Vec<Option<T>>,
    next: usize,
}

impl<T> OrderedOutput<T> {
    pub fn new(len: usize) -> OrderedOutput<T> {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        OrderedOutput { slots, next: 0 }
    }

    /// Stores `value` at `index`. Returns `false` if `index` is out of range or has already been filled.
    pub fn insert(&mut self, index: usize, value: T) -> bool {
        if index < self.next {
            return false;
        }
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(value);
                true
            }
            _ => false,
        }
    }

    /// Takes all results from the next expected index onwards up to the first missing one.
    pub fn pop_ready(&mut self) -> Vec<T> {
        let mut ready = Vec::new();
        while let Some(value) = self.slots.get_mut(self.next).and_then(Option::take) {
            ready.push(value);
            self.next += 1;
        }

        ready
    }

    pub fn is_complete(&self) -> bool {
        self.next == self.slots.len()
    }

    /// Returns all results not yet handed out in index order; missing results are skipped.
    pub fn into_ordered(self) -> Vec<T> {
        let next = self.next;
        self.slots.into_iter().skip(next).flatten().collect()
    }
}
