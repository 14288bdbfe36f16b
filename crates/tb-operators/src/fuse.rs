use crate::interpolation::{Interpolator, ReproducibleInterpolator};
use std::ops::{Deref, DerefMut};
use tb_buffer::{DateTime, Message};

/// Time-aligns a primary stream against any number of secondary streams,
/// resolving each secondary against the primary's originating time via its
/// own `Interpolator`, then combining the results with `output`.
///
/// Per-input buffers are `Vec`-backed rather than array-backed so that
/// `add_input` can grow the input set at runtime.
pub struct Fuse<P, S, I, O, Interp, F> {
    interpolators: Vec<Interp>,
    buffers: Vec<Vec<Message<S>>>,
    closed: Vec<bool>,
    last_resolved: Vec<Option<I>>,
    pending_primary: Vec<Message<P>>,
    output: F,
}

impl<P, S, I, O, Interp, F> Fuse<P, S, I, O, Interp, F>
where
    I: Clone,
    Interp: Interpolator<S, I>,
    F: Fn(&P, &[I]) -> O,
{
    #[must_use]
    pub fn new(output: F) -> Self {
        Fuse {
            interpolators: Vec::new(),
            buffers: Vec::new(),
            closed: Vec::new(),
            last_resolved: Vec::new(),
            pending_primary: Vec::new(),
            output,
        }
    }

    /// Adds a new secondary input, returning its index. May be called after
    /// messages have already flowed through existing inputs.
    pub fn add_input(&mut self, interpolator: Interp) -> usize {
        self.interpolators.push(interpolator);
        self.buffers.push(Vec::new());
        self.closed.push(false);
        self.last_resolved.push(None);
        self.interpolators.len() - 1
    }

    pub fn push_secondary(&mut self, input: usize, message: Message<S>) -> Vec<Message<O>> {
        let buf = &mut self.buffers[input];
        let pos = buf.partition_point(|m| m.originating_time() <= message.originating_time());
        buf.insert(pos, message);
        self.try_resolve()
    }

    pub fn close_secondary(&mut self, input: usize) -> Vec<Message<O>> {
        self.closed[input] = true;
        self.try_resolve()
    }

    pub fn push_primary(&mut self, message: Message<P>) -> Vec<Message<O>> {
        self.pending_primary.push(message);
        self.try_resolve()
    }

    /// Resolves every pending primary against the current secondary
    /// buffers. A primary is produced only once every secondary resolves
    /// to `Created`; `InsufficientData` on any secondary defers the primary
    /// back onto `pending_primary` for the next call, while `DoesNotExist`
    /// on any secondary drops the primary silently, it will never resolve.
    fn try_resolve(&mut self) -> Vec<Message<O>> {
        let mut produced = Vec::new();
        let mut still_pending = Vec::new();
        'primaries: for primary in self.pending_primary.drain(..) {
            let mut resolved = Vec::with_capacity(self.interpolators.len());
            for idx in 0..self.interpolators.len() {
                match self.interpolators[idx].interpolate(
                    primary.originating_time(),
                    &self.buffers[idx],
                    self.closed[idx],
                ) {
                    crate::interpolation::InterpolationResult::Created(v, obsolete) => {
                        self.last_resolved[idx] = Some(v.clone());
                        self.buffers[idx].retain(|m| m.originating_time() >= obsolete);
                        resolved.push(v);
                    }
                    crate::interpolation::InterpolationResult::DoesNotExist(obsolete) => {
                        self.buffers[idx].retain(|m| m.originating_time() >= obsolete);
                        continue 'primaries;
                    }
                    crate::interpolation::InterpolationResult::InsufficientData => {
                        still_pending.push(primary);
                        continue 'primaries;
                    }
                }
            }
            let payload = (self.output)(&primary.payload, &resolved);
            produced.push(Message::new(payload, primary.envelope));
        }
        self.pending_primary = still_pending;
        produced
    }
}

/// A `Fuse` whose secondaries are all resolved with a
/// `ReproducibleInterpolator`, guaranteeing output is independent of
/// message arrival order.
pub struct Join<P, S, I, O, Interp, F>(Fuse<P, S, I, O, Interp, F>);

impl<P, S, I, O, Interp, F> Join<P, S, I, O, Interp, F>
where
    I: Clone,
    Interp: ReproducibleInterpolator<S, I>,
    F: Fn(&P, &[I]) -> O,
{
    #[must_use]
    pub fn new(output: F) -> Self {
        Join(Fuse::new(output))
    }
}

impl<P, S, I, O, Interp, F> Deref for Join<P, S, I, O, Interp, F> {
    type Target = Fuse<P, S, I, O, Interp, F>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<P, S, I, O, Interp, F> DerefMut for Join<P, S, I, O, Interp, F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::AdjacentValues;
    use tb_buffer::Envelope;

    fn msg<T>(source: i32, seq: i32, t: i64, payload: T) -> Message<T> {
        Message::new(payload, Envelope::new(source, seq, DateTime::from_ticks(t), DateTime::from_ticks(t)))
    }

    #[test]
    fn fuse_combines_interpolated_secondary_with_primary() {
        let mut fuse: Fuse<i32, f64, f64, f64, _, _> =
            Fuse::new(|p: &i32, secondaries: &[f64]| *p as f64 + secondaries[0]);
        fuse.add_input(AdjacentValues::new(tb_buffer::TimeSpan::from_ticks(1_000), |a: &f64, b: &f64, r| {
            a + (b - a) * r
        }));
        fuse.push_secondary(0, msg(2, 0, 100, 10.0));
        fuse.push_secondary(0, msg(2, 1, 200, 20.0));
        let out = fuse.push_primary(msg(1, 0, 150, 5));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, 5.0 + 15.0);
    }

    #[test]
    fn fuse_defers_primary_until_secondary_sufficient() {
        let mut fuse: Fuse<i32, f64, f64, f64, _, _> =
            Fuse::new(|p: &i32, secondaries: &[f64]| *p as f64 + secondaries[0]);
        fuse.add_input(AdjacentValues::new(tb_buffer::TimeSpan::from_ticks(1_000), |a: &f64, b: &f64, r| {
            a + (b - a) * r
        }));
        fuse.push_secondary(0, msg(2, 0, 100, 10.0));
        let out = fuse.push_primary(msg(1, 0, 150, 5));
        assert!(out.is_empty());
        let out = fuse.push_secondary(0, msg(2, 1, 200, 20.0));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, 5.0 + 15.0);
    }

    #[test]
    fn add_input_after_messages_already_flowed() {
        let mut fuse: Fuse<i32, f64, f64, i32, _, _> =
            Fuse::new(|p: &i32, secondaries: &[f64]| *p + secondaries.iter().map(|v| *v as i32).sum::<i32>());
        fuse.add_input(AdjacentValues::new(tb_buffer::TimeSpan::from_ticks(1_000), |a: &f64, b: &f64, r| {
            a + (b - a) * r
        }));
        fuse.push_secondary(0, msg(2, 0, 100, 10.0));
        fuse.push_secondary(0, msg(2, 1, 200, 20.0));
        let second_input = fuse.add_input(AdjacentValues::new(tb_buffer::TimeSpan::from_ticks(1_000), |a: &f64, b: &f64, r| {
            a + (b - a) * r
        }));
        fuse.push_secondary(second_input, msg(3, 0, 100, 1.0));
        fuse.push_secondary(second_input, msg(3, 1, 200, 1.0));
        let out = fuse.push_primary(msg(1, 0, 150, 5));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payload, 5 + 15 + 1);
    }

    #[test]
    fn does_not_exist_drops_the_primary_instead_of_passing_a_placeholder() {
        // max_span of 50 is smaller than the 100-tick gap between the two
        // secondaries, so interpolation reports DoesNotExist for this primary.
        let mut fuse: Fuse<i32, f64, f64, f64, _, _> =
            Fuse::new(|p: &i32, secondaries: &[f64]| *p as f64 + secondaries[0]);
        fuse.add_input(AdjacentValues::new(tb_buffer::TimeSpan::from_ticks(50), |a: &f64, b: &f64, r| {
            a + (b - a) * r
        }));
        fuse.push_secondary(0, msg(2, 0, 100, 10.0));
        fuse.push_secondary(0, msg(2, 1, 200, 20.0));
        let out = fuse.push_primary(msg(1, 0, 150, 5));
        assert!(out.is_empty());
        // The primary is dropped, not deferred: it must not resurface once
        // more secondaries arrive.
        let out = fuse.push_secondary(0, msg(2, 2, 300, 30.0));
        assert!(out.is_empty());
    }

    #[test]
    fn does_not_exist_still_prunes_the_secondary_buffer() {
        let mut fuse: Fuse<i32, f64, f64, f64, _, _> =
            Fuse::new(|p: &i32, secondaries: &[f64]| *p as f64 + secondaries[0]);
        fuse.add_input(AdjacentValues::new(tb_buffer::TimeSpan::from_ticks(50), |a: &f64, b: &f64, r| {
            a + (b - a) * r
        }));
        fuse.push_secondary(0, msg(2, 0, 100, 10.0));
        fuse.push_secondary(0, msg(2, 1, 200, 20.0));
        fuse.push_primary(msg(1, 0, 150, 5));
        assert_eq!(fuse.buffers[0].len(), 1);
        assert_eq!(fuse.buffers[0][0].originating_time(), DateTime::from_ticks(100));
    }
}
