use crate::datetime::DateTime;

/// The 24-byte packed message header that accompanies every payload.
///
/// `source_id` is assigned by the pipeline at emitter-creation time.
/// `originating_time` is the timestamp of the real-world event; for any
/// two messages sharing a `source_id`, originating time strictly increases
/// with `sequence_id` (see `tb-pipeline`'s emitter, which is the only
/// place this invariant is enforced).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub source_id: i32,
    pub sequence_id: i32,
    pub originating_time: DateTime,
    pub creation_time: DateTime,
}

impl Envelope {
    #[must_use]
    pub const fn new(
        source_id: i32,
        sequence_id: i32,
        originating_time: DateTime,
        creation_time: DateTime,
    ) -> Self {
        Envelope {
            source_id,
            sequence_id,
            originating_time,
            creation_time,
        }
    }

    /// `creation_time - originating_time`. Callers should treat a negative
    /// result as a data error, not a valid value — the invariant is
    /// `creation_time >= originating_time`, but this type does not enforce
    /// it at construction so that partially-built records can flow through
    /// catalog scanning code.
    #[must_use]
    pub fn latency(&self) -> crate::datetime::TimeSpan {
        self.creation_time - self.originating_time
    }

    /// A stronger hash than the source's naive field-XOR (see spec §9 open
    /// question: the original `GetHashCode` XORs fields that can
    /// legitimately be equal across distinct envelopes, e.g. mirror-image
    /// sequence ids on two different sources). Mixes fields with distinct
    /// rotations before folding.
    #[must_use]
    pub fn mixed_hash(&self) -> u64 {
        let a = (self.source_id as u32 as u64).rotate_left(7);
        let b = (self.sequence_id as u32 as u64).rotate_left(19);
        let c = (self.originating_time.ticks() as u64).rotate_left(31);
        let d = (self.creation_time.ticks() as u64).rotate_left(53);
        let mut h = a ^ b ^ c ^ d;
        // SplitMix64 finalizer to spread the XOR-folded bits.
        h ^= h >> 30;
        h = h.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        h ^= h >> 27;
        h = h.wrapping_mul(0x94d0_49bb_1331_11eb);
        h ^= h >> 31;
        h
    }
}

/// A payload paired with its envelope. Equality is by-envelope plus payload
/// equality.
#[derive(Debug, Clone)]
pub struct Message<T> {
    pub payload: T,
    pub envelope: Envelope,
}

impl<T> Message<T> {
    #[must_use]
    pub const fn new(payload: T, envelope: Envelope) -> Self {
        Message { payload, envelope }
    }

    #[must_use]
    pub fn originating_time(&self) -> DateTime {
        self.envelope.originating_time
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Message<U> {
        Message {
            payload: f(self.payload),
            envelope: self.envelope,
        }
    }
}

impl<T: PartialEq> PartialEq for Message<T> {
    fn eq(&self, other: &Self) -> bool {
        self.envelope == other.envelope && self.payload == other.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::TimeSpan;

    #[test]
    fn latency_is_creation_minus_originating() {
        let e = Envelope::new(1, 1, DateTime::from_ticks(100), DateTime::from_ticks(150));
        assert_eq!(e.latency(), TimeSpan::from_ticks(50));
    }

    #[test]
    fn mixed_hash_distinguishes_mirror_sequence_ids() {
        let a = Envelope::new(1, 2, DateTime::from_ticks(10), DateTime::from_ticks(10));
        let b = Envelope::new(2, 1, DateTime::from_ticks(10), DateTime::from_ticks(10));
        assert_ne!(a.mixed_hash(), b.mixed_hash());
    }
}
