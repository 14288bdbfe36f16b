use crate::error::{OperatorError, OperatorResult};
use std::collections::VecDeque;
use tb_buffer::{DateTime, Message, RelativeTimeInterval, TimeInterval};

/// A time window anchored on each arriving message: every message is
/// simultaneously data and anchor. For a backward-looking interval (e.g.
/// `[-100ms, 0]`) this emits as soon as the message itself arrives, having
/// accumulated everything still within range; for a window reaching
/// forward it holds the anchor until enough later messages have arrived
/// to know the window is complete.
pub struct RelativeTimeWindow<T, O, F> {
    interval: RelativeTimeInterval,
    buffer: VecDeque<Message<T>>,
    pending_anchors: VecDeque<Message<T>>,
    reduce: F,
    _marker: std::marker::PhantomData<O>,
}

impl<T: Clone, O, F> RelativeTimeWindow<T, O, F>
where
    F: Fn(&[Message<T>]) -> O,
{
    #[must_use]
    pub fn new(interval: RelativeTimeInterval, reduce: F) -> Self {
        RelativeTimeWindow {
            interval,
            buffer: VecDeque::new(),
            pending_anchors: VecDeque::new(),
            reduce,
            _marker: std::marker::PhantomData,
        }
    }

    /// Pushes a new message, which acts as both a data point and a
    /// candidate anchor, and returns every window that can now be emitted.
    pub fn push(&mut self, message: Message<T>) -> Vec<Message<O>> {
        self.buffer.push_back(message.clone());
        self.pending_anchors.push_back(message);
        self.drain_ready(false)
    }

    /// No more messages will arrive; flush every anchor still pending,
    /// using only the data observed so far.
    pub fn flush_final(&mut self) -> Vec<Message<O>> {
        self.drain_ready(true)
    }

    fn drain_ready(&mut self, final_flush: bool) -> Vec<Message<O>> {
        let latest_observed = self.buffer.back().map(Message::originating_time);
        let mut out = Vec::new();
        while let Some(anchor) = self.pending_anchors.front() {
            let window = self.interval.resolve(anchor.originating_time());
            let ready = final_flush || latest_observed.is_some_and(|t| t >= window.right);
            if !ready {
                break;
            }
            let anchor = self.pending_anchors.pop_front().unwrap();
            let members: Vec<Message<T>> = self
                .buffer
                .iter()
                .filter(|m| window.contains(m.originating_time()))
                .cloned()
                .collect();
            let payload = (self.reduce)(&members);
            out.push(Message::new(payload, anchor.envelope));
            self.trim_buffer();
        }
        out
    }

    fn trim_buffer(&mut self) {
        let earliest_needed = self
            .pending_anchors
            .front()
            .map(|a| self.interval.resolve(a.originating_time()).left);
        if let Some(cutoff) = earliest_needed {
            while self.buffer.front().is_some_and(|m| m.originating_time() < cutoff) {
                self.buffer.pop_front();
            }
        }
    }
}

/// A window defined by a fixed count of messages either side of the
/// anchor: `trim_left` before, the anchor itself, `window_size - 1 -
/// trim_left - trim_right` after, `trim_right` trimmed from the trailing
/// edge before reduction.
pub struct RelativeIndexWindow<T, O, F> {
    window_size: usize,
    trim_left: usize,
    trim_right: usize,
    buffer: VecDeque<Message<T>>,
    reduce: F,
    _marker: std::marker::PhantomData<O>,
}

impl<T: Clone, O, F> RelativeIndexWindow<T, O, F>
where
    F: Fn(&[Message<T>]) -> O,
{
    #[must_use]
    pub fn new(window_size: usize, trim_left: usize, trim_right: usize, reduce: F) -> Self {
        RelativeIndexWindow {
            window_size,
            trim_left,
            trim_right,
            buffer: VecDeque::with_capacity(window_size),
            reduce,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn push(&mut self, message: Message<T>) -> Option<Message<O>> {
        self.buffer.push_back(message);
        if self.buffer.len() < self.window_size {
            return None;
        }
        while self.buffer.len() > self.window_size {
            self.buffer.pop_front();
        }
        let trimmed: Vec<Message<T>> = self
            .buffer
            .iter()
            .skip(self.trim_left)
            .take(self.window_size - self.trim_left - self.trim_right)
            .cloned()
            .collect();
        let anchor_envelope = self.buffer[self.trim_left].envelope;
        let payload = (self.reduce)(&trimmed);
        Some(Message::new(payload, anchor_envelope))
    }
}

/// A window whose bounds are recomputed per message from caller state,
/// e.g. a control stream driving a variable-width aggregation. The
/// obsolete time returned by `window_fn` must never move backward.
pub struct DynamicWindow<W, T, O, WinFn, OutFn> {
    state: W,
    buffer: VecDeque<Message<T>>,
    last_obsolete: Option<DateTime>,
    window_fn: WinFn,
    reduce: OutFn,
    _marker: std::marker::PhantomData<O>,
}

impl<W, T: Clone, O, WinFn, OutFn> DynamicWindow<W, T, O, WinFn, OutFn>
where
    WinFn: Fn(&W, DateTime) -> (TimeInterval, DateTime),
    OutFn: Fn(&[Message<T>]) -> O,
{
    #[must_use]
    pub fn new(state: W, window_fn: WinFn, reduce: OutFn) -> Self {
        DynamicWindow {
            state,
            buffer: VecDeque::new(),
            last_obsolete: None,
            window_fn,
            reduce,
            _marker: std::marker::PhantomData,
        }
    }

    #[must_use]
    pub fn state_mut(&mut self) -> &mut W {
        &mut self.state
    }

    pub fn push(&mut self, message: Message<T>) -> OperatorResult<Message<O>> {
        let (window, obsolete) = (self.window_fn)(&self.state, message.originating_time());
        if let Some(last) = self.last_obsolete {
            if obsolete < last {
                return Err(OperatorError::NonMonotonicObsolete);
            }
        }
        self.last_obsolete = Some(obsolete);
        self.buffer.push_back(message.clone());
        self.buffer.retain(|m| m.originating_time() >= obsolete);
        let members: Vec<Message<T>> = self
            .buffer
            .iter()
            .filter(|m| window.contains(m.originating_time()))
            .cloned()
            .collect();
        let payload = (self.reduce)(&members);
        Ok(Message::new(payload, message.envelope))
    }
}
