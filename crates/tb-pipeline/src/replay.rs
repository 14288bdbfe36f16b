use tb_buffer::{DateTime, TimeInterval};
use tb_clock::VirtualClock;

/// `DateTime`'s documented epoch is Jan 1, year 1 UTC; `SystemTime`'s is
/// Jan 1, 1970 UTC. This is the tick count between them, used only to read
/// the wall clock for replay pacing.
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;

/// The time window and pacing mode a pipeline replays under. Delivery is
/// always in per-emitter originating-time order; `enforce_replay_clock`
/// only controls whether the scheduler paces deliveries against wall-clock
/// time or runs as fast as possible.
#[derive(Debug, Clone, Copy)]
pub struct ReplayDescriptor {
    pub interval: TimeInterval,
    pub enforce_replay_clock: bool,
}

impl ReplayDescriptor {
    #[must_use]
    pub const fn new(interval: TimeInterval, enforce_replay_clock: bool) -> Self {
        ReplayDescriptor {
            interval,
            enforce_replay_clock,
        }
    }

    /// Runs as fast as possible over the full unbounded time range —
    /// the default for deterministic offline processing.
    #[must_use]
    pub const fn as_fast_as_possible() -> Self {
        ReplayDescriptor {
            interval: TimeInterval::INFINITE,
            enforce_replay_clock: false,
        }
    }

    /// Paces delivery against wall-clock time over the given window, for
    /// live or live-like playback.
    #[must_use]
    pub const fn real_time(start: DateTime, end: DateTime) -> Self {
        ReplayDescriptor {
            interval: TimeInterval::new(start, end),
            enforce_replay_clock: true,
        }
    }
}

impl Default for ReplayDescriptor {
    fn default() -> Self {
        ReplayDescriptor::as_fast_as_possible()
    }
}

/// The wall clock, expressed as a `DateTime` in the same tick epoch the
/// rest of this crate uses.
fn real_now() -> DateTime {
    let since_unix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let ticks = UNIX_EPOCH_TICKS
        + (since_unix.as_secs() as i64) * TICKS_PER_SECOND
        + i64::from(since_unix.subsec_nanos()) / 100;
    DateTime::from_ticks(ticks)
}

/// How long a replay worker should sleep before delivering a message that
/// originated at `originating_time`, given the pipeline's current replay
/// descriptor and virtual clock. `None` means deliver immediately: either
/// pacing isn't enforced, or the paced moment has already passed.
#[must_use]
pub(crate) fn pacing_delay(
    descriptor: &ReplayDescriptor,
    clock: &VirtualClock,
    originating_time: DateTime,
) -> Option<std::time::Duration> {
    if !descriptor.enforce_replay_clock {
        return None;
    }
    let target_real = clock.to_real(originating_time);
    let remaining = target_real - real_now();
    if remaining.ticks() <= 0 {
        return None;
    }
    Some(std::time::Duration::from_nanos((remaining.ticks() as u64) * 100))
}
