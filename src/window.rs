// Rolling window of recent raw labels with majority vote

use std::collections::VecDeque;

/// Fixed-capacity FIFO of the most recent raw labels
#[derive(Debug, Clone)]
pub struct RecentWindow {
    labels: VecDeque<String>,
    capacity: usize,
}

impl RecentWindow {
    /// Creates an empty window. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            labels: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a label, returning the evicted oldest label if the window was full
    pub fn push(&mut self, label: impl Into<String>) -> Option<String> {
        let evicted = if self.labels.len() >= self.capacity {
            self.labels.pop_front()
        } else {
            None
        };
        self.labels.push_back(label.into());
        evicted
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Labels in arrival order, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Per-label counts, ordered by first occurrence in the window
    pub fn counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for label in self.iter() {
            match counts.iter_mut().find(|(seen, _)| *seen == label) {
                Some((_, count)) => *count += 1,
                None => counts.push((label, 1)),
            }
        }
        counts
    }

    /// Most frequent label in the window.
    ///
    /// Ties go to the label whose first occurrence in the window is oldest.
    pub fn majority(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (label, count) in self.counts() {
            // strictly greater keeps the earlier-seen label on ties
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label)
    }
}
