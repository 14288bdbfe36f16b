use tb_buffer::Message;

/// Latches the most recent secondary and pairs it with every primary that
/// arrives after it, without interpolation. Unlike `Fuse`, a primary with
/// no secondary observed yet produces nothing rather than blocking.
pub struct Pair<P, S, O, F> {
    last_secondary: Option<Message<S>>,
    output: F,
    _marker: std::marker::PhantomData<(P, O)>,
}

impl<P, S, O, F> Pair<P, S, O, F>
where
    F: Fn(&P, &S) -> O,
{
    #[must_use]
    pub fn new(output: F) -> Self {
        Pair {
            last_secondary: None,
            output,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn push_secondary(&mut self, message: Message<S>) {
        self.last_secondary = Some(message);
    }

    pub fn push_primary(&mut self, message: Message<P>) -> Option<Message<O>> {
        let secondary = self.last_secondary.as_ref()?;
        let payload = (self.output)(&message.payload, &secondary.payload);
        Some(Message::new(payload, message.envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_buffer::{DateTime, Envelope};

    fn msg<T>(source: i32, t: i64, payload: T) -> Message<T> {
        Message::new(payload, Envelope::new(source, 0, DateTime::from_ticks(t), DateTime::from_ticks(t)))
    }

    #[test]
    fn primary_before_any_secondary_produces_nothing() {
        let mut pair: Pair<i32, f64, f64, _> = Pair::new(|p, s| *p as f64 + s);
        assert!(pair.push_primary(msg(1, 10, 1)).is_none());
    }

    #[test]
    fn primary_pairs_with_latest_secondary() {
        let mut pair: Pair<i32, f64, f64, _> = Pair::new(|p, s| *p as f64 + s);
        pair.push_secondary(msg(2, 5, 100.0));
        pair.push_secondary(msg(2, 15, 200.0));
        let out = pair.push_primary(msg(1, 20, 1)).unwrap();
        assert_eq!(out.payload, 201.0);
    }
}
