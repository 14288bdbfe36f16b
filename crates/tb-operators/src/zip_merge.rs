use std::collections::BinaryHeap;
use tb_buffer::{DateTime, Message};

struct Pending<T> {
    input: usize,
    message: Message<T>,
}

impl<T> PartialEq for Pending<T> {
    fn eq(&self, other: &Self) -> bool {
        self.message.originating_time() == other.message.originating_time() && self.message.envelope.source_id == other.message.envelope.source_id
    }
}
impl<T> Eq for Pending<T> {}
impl<T> PartialOrd for Pending<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Pending<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed: BinaryHeap is a max-heap, we want earliest time first.
        other
            .message
            .originating_time()
            .cmp(&self.message.originating_time())
            .then_with(|| other.message.envelope.source_id.cmp(&self.message.envelope.source_id))
    }
}

/// Reorders `N` input streams into a single stream grouped by originating
/// time: every message sharing the earliest observed time across all
/// inputs is emitted together, in `source_id` order, once the frontier
/// (the minimum of each input's last-observed time) has advanced past it.
pub struct Zip<T> {
    input_count: usize,
    heap: BinaryHeap<Pending<T>>,
    last_observed: Vec<Option<DateTime>>,
    closed: Vec<bool>,
}

impl<T> Zip<T> {
    #[must_use]
    pub fn new(input_count: usize) -> Self {
        Zip {
            input_count,
            heap: BinaryHeap::new(),
            last_observed: vec![None; input_count],
            closed: vec![false; input_count],
        }
    }

    fn frontier(&self) -> Option<DateTime> {
        if self.closed.iter().all(|c| *c) {
            return Some(DateTime::MAX);
        }
        let mut min = None;
        for (idx, observed) in self.last_observed.iter().enumerate() {
            if self.closed[idx] {
                continue;
            }
            match observed {
                None => return None,
                Some(t) => min = Some(min.map_or(*t, |m: DateTime| m.min(*t))),
            }
        }
        min
    }

    pub fn close_input(&mut self, input: usize) {
        self.closed[input] = true;
    }

    /// Pushes a message from `input` and returns every group of messages
    /// (sharing one originating time, sorted by `source_id`) that the
    /// updated frontier now allows releasing.
    pub fn push(&mut self, input: usize, message: Message<T>) -> Vec<Vec<Message<T>>> {
        self.last_observed[input] = Some(message.originating_time());
        self.heap.push(Pending { input, message });
        self.drain_ready()
    }

    fn drain_ready(&mut self) -> Vec<Vec<Message<T>>> {
        let mut groups = Vec::new();
        loop {
            let Some(frontier) = self.frontier() else { break };
            let Some(top) = self.heap.peek() else { break };
            if top.message.originating_time() > frontier {
                break;
            }
            let t = top.message.originating_time();
            let mut group = Vec::new();
            while let Some(next) = self.heap.peek() {
                if next.message.originating_time() != t {
                    break;
                }
                group.push(self.heap.pop().unwrap().message);
            }
            group.sort_by_key(|m| m.envelope.source_id);
            groups.push(group);
        }
        groups
    }

    #[must_use]
    pub fn input_count(&self) -> usize {
        self.input_count
    }
}

/// Arrival-order passthrough of `N` inputs into one stream, with no
/// reordering: each pushed message is emitted immediately.
pub struct Merge;

impl Merge {
    #[must_use]
    pub fn push<T>(message: Message<T>) -> Message<T> {
        message
    }
}
