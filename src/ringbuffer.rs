//! Ringbuffer module for tracking the rolling history of one series.
//!
//! This module provides a fixed-size ringbuffer with predictable memory
//! usage: once full, every push replaces the oldest entry.

use serde::Serialize;

/// A single labeled value of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Point {
    /// Tick time formatted as `HH:MM:SS`.
    pub label: String,
    /// Value in bytes/sec.
    pub value: u64,
}

impl Point {
    pub fn new(label: impl Into<String>, value: u64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A circular buffer with fixed capacity.
#[derive(Debug, Clone)]
pub struct Ringbuffer<T> {
    entries: Vec<T>,
    capacity: usize,
    write_index: usize,
}

impl<T: Clone> Ringbuffer<T> {
    /// Creates a new ringbuffer with the specified capacity (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            write_index: 0,
        }
    }

    /// Pushes a new entry into the ringbuffer.
    ///
    /// If the buffer is full, the oldest entry will be overwritten.
    pub fn push(&mut self, entry: T) {
        if self.entries.len() < self.capacity {
            self.entries.push(entry);
        } else {
            self.entries[self.write_index] = entry;
        }
        self.write_index = (self.write_index + 1) % self.capacity;
    }

    /// Returns all entries in chronological order (oldest to newest).
    pub fn get_history(&self) -> Vec<T> {
        if self.entries.len() < self.capacity {
            // Not yet wrapped, entries are in insertion order
            return self.entries.clone();
        }

        // Full: the oldest entry sits at write_index
        let mut result = Vec::with_capacity(self.capacity);
        result.extend_from_slice(&self.entries[self.write_index..]);
        result.extend_from_slice(&self.entries[..self.write_index]);
        result
    }

    /// Returns the most recently pushed entry.
    pub fn latest(&self) -> Option<&T> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = (self.write_index + self.capacity - 1) % self.capacity;
        self.entries.get(idx)
    }

    /// Returns the current number of entries in the buffer.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the maximum capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
