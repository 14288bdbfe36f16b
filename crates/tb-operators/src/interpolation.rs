use tb_buffer::{DateTime, Message, TimeSpan};

/// The outcome of interpolating a secondary stream against a target time.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpolationResult<I> {
    /// Interpolation succeeded; any secondary strictly before `obsolete_time`
    /// may be discarded.
    Created(I, DateTime),
    /// No value exists at the target time; the producer may advance.
    DoesNotExist(DateTime),
    /// Not enough secondaries observed yet to decide.
    InsufficientData,
}

/// A function from `(target_time, secondary_message_buffer, stream_closed?)`
/// to an `InterpolationResult`. `secondaries` is always supplied sorted by
/// originating time, oldest first.
pub trait Interpolator<S, I> {
    fn interpolate(
        &self,
        target_time: DateTime,
        secondaries: &[Message<S>],
        stream_closed: bool,
    ) -> InterpolationResult<I>;
}

/// Marker for interpolators whose result depends only on the ordered set of
/// secondary originating times and payloads, never on arrival order. `Fuse`
/// requires nothing stronger; `Join` requires this.
pub trait ReproducibleInterpolator<S, I>: Interpolator<S, I> {}

/// Linear (or otherwise blended) interpolation between the nearest-before
/// and nearest-at-or-after secondaries, via a caller-supplied blend
/// function `f(before, after, ratio)`.
pub struct AdjacentValues<S, I, F> {
    max_span: TimeSpan,
    blend: F,
    or_default: Option<I>,
    _marker: std::marker::PhantomData<(S, I)>,
}

impl<S, I, F> AdjacentValues<S, I, F>
where
    F: Fn(&S, &S, f64) -> I,
{
    #[must_use]
    pub fn new(max_span: TimeSpan, blend: F) -> Self {
        AdjacentValues {
            max_span,
            blend,
            or_default: None,
            _marker: std::marker::PhantomData,
        }
    }

    #[must_use]
    pub fn or_default(mut self, value: I) -> Self {
        self.or_default = Some(value);
        self
    }
}

impl<S, I: Clone, F> Interpolator<S, I> for AdjacentValues<S, I, F>
where
    F: Fn(&S, &S, f64) -> I,
{
    fn interpolate(
        &self,
        target_time: DateTime,
        secondaries: &[Message<S>],
        stream_closed: bool,
    ) -> InterpolationResult<I> {
        if let Some(exact) = secondaries.iter().find(|m| m.originating_time() == target_time) {
            return InterpolationResult::Created((self.blend)(&exact.payload, &exact.payload, 0.0), target_time);
        }

        let before = secondaries.iter().rev().find(|m| m.originating_time() < target_time);
        let after = secondaries.iter().find(|m| m.originating_time() > target_time);

        match (before, after) {
            (_, None) => {
                if stream_closed {
                    let obsolete = before.map_or(DateTime::MIN, Message::originating_time);
                    match &self.or_default {
                        Some(v) => InterpolationResult::Created(v.clone(), obsolete),
                        None => InterpolationResult::DoesNotExist(obsolete),
                    }
                } else {
                    InterpolationResult::InsufficientData
                }
            }
            (None, Some(_)) => {
                if stream_closed {
                    InterpolationResult::DoesNotExist(DateTime::MIN)
                } else {
                    InterpolationResult::InsufficientData
                }
            }
            (Some(before), Some(after)) => {
                let span = after.originating_time() - before.originating_time();
                if span > self.max_span {
                    InterpolationResult::DoesNotExist(before.originating_time())
                } else {
                    let ratio = (target_time - before.originating_time()).ticks() as f64 / span.ticks() as f64;
                    let value = (self.blend)(&before.payload, &after.payload, ratio);
                    InterpolationResult::Created(value, before.originating_time())
                }
            }
        }
    }
}

impl<S, I: Clone, F> ReproducibleInterpolator<S, I> for AdjacentValues<S, I, F> where F: Fn(&S, &S, f64) -> I {}

/// Requires a secondary whose originating time equals the target exactly;
/// `or_default` supplies the value used when no such secondary will ever
/// appear (the stream closed, or a strictly later secondary was observed).
pub struct Exact<T> {
    or_default: Option<T>,
}

impl<T> Exact<T> {
    #[must_use]
    pub fn new() -> Self {
        Exact { or_default: None }
    }

    #[must_use]
    pub fn or_default(value: T) -> Self {
        Exact {
            or_default: Some(value),
        }
    }
}

impl<T> Default for Exact<T> {
    fn default() -> Self {
        Exact::new()
    }
}

impl<T: Clone> Interpolator<T, T> for Exact<T> {
    fn interpolate(
        &self,
        target_time: DateTime,
        secondaries: &[Message<T>],
        stream_closed: bool,
    ) -> InterpolationResult<T> {
        if let Some(exact) = secondaries.iter().find(|m| m.originating_time() == target_time) {
            return InterpolationResult::Created(exact.payload.clone(), target_time);
        }
        let later_exists = secondaries.iter().any(|m| m.originating_time() > target_time);
        if later_exists || stream_closed {
            match &self.or_default {
                Some(v) => InterpolationResult::Created(v.clone(), target_time),
                None => InterpolationResult::DoesNotExist(target_time),
            }
        } else {
            InterpolationResult::InsufficientData
        }
    }
}

impl<T: Clone> ReproducibleInterpolator<T, T> for Exact<T> {}
