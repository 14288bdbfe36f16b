use tb_buffer::{DateTime, TimeSpan};

/// Maps real (wall-clock) time to virtual (pipeline) time via an origin,
/// an additive offset, and a multiplicative dilation factor.
///
/// `now_virtual = real_origin + (real_now - real_origin) * inverse_dilation + virtual_offset`
///
/// A dilation of `0.0` means virtual time does not advance at all; the
/// implementation never divides by `dilation` to avoid this case, instead
/// special-casing it directly.
#[derive(Debug, Clone, Copy)]
pub struct VirtualClock {
    real_origin: DateTime,
    virtual_offset: TimeSpan,
    dilation: f64,
    inverse_dilation: f64,
}

impl VirtualClock {
    #[must_use]
    pub fn new(real_origin: DateTime) -> Self {
        VirtualClock {
            real_origin,
            virtual_offset: TimeSpan::ZERO,
            dilation: 1.0,
            inverse_dilation: 1.0,
        }
    }

    #[must_use]
    pub fn with_params(real_origin: DateTime, virtual_offset: TimeSpan, dilation: f64) -> Self {
        let inverse_dilation = if dilation == 0.0 { 0.0 } else { 1.0 / dilation };
        VirtualClock {
            real_origin,
            virtual_offset,
            dilation,
            inverse_dilation,
        }
    }

    #[must_use]
    pub fn offset(&self) -> TimeSpan {
        self.virtual_offset
    }

    pub fn set_offset(&mut self, offset: TimeSpan) {
        self.virtual_offset = offset;
    }

    #[must_use]
    pub fn dilation(&self) -> f64 {
        self.dilation
    }

    /// Maps a real (wall-clock) time to virtual time.
    #[must_use]
    pub fn to_virtual(&self, real_now: DateTime) -> DateTime {
        if self.dilation == 0.0 {
            return self.real_origin + self.virtual_offset;
        }
        let real_delta = real_now - self.real_origin;
        let scaled = (real_delta.ticks() as f64 * self.inverse_dilation).round() as i64;
        self.real_origin + TimeSpan::from_ticks(scaled) + self.virtual_offset
    }

    /// Maps a virtual time back to real time. Undefined (returns the
    /// origin) when `dilation == 0.0`, since no real time corresponds to a
    /// frozen virtual clock's advancing virtual time.
    #[must_use]
    pub fn to_real(&self, virtual_time: DateTime) -> DateTime {
        if self.dilation == 0.0 {
            return self.real_origin;
        }
        let virtual_delta = (virtual_time - self.virtual_offset) - self.real_origin;
        let scaled = (virtual_delta.ticks() as f64 * self.dilation).round() as i64;
        self.real_origin + TimeSpan::from_ticks(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_dilation_passes_time_through_with_offset() {
        let origin = DateTime::from_ticks(1_000);
        let clock = VirtualClock::with_params(origin, TimeSpan::from_ticks(500), 1.0);
        assert_eq!(
            clock.to_virtual(DateTime::from_ticks(2_000)),
            DateTime::from_ticks(2_500)
        );
    }

    #[test]
    fn zero_dilation_freezes_virtual_time() {
        let origin = DateTime::from_ticks(1_000);
        let clock = VirtualClock::with_params(origin, TimeSpan::from_ticks(10), 0.0);
        let frozen = clock.to_virtual(origin);
        assert_eq!(clock.to_virtual(DateTime::from_ticks(50_000)), frozen);
        assert_eq!(clock.to_virtual(DateTime::from_ticks(999_999)), frozen);
    }

    #[test]
    fn double_speed_dilation_halves_elapsed_virtual_ticks() {
        // dilation=2.0 means 2 real ticks pass per 1 virtual tick.
        let origin = DateTime::from_ticks(0);
        let clock = VirtualClock::with_params(origin, TimeSpan::ZERO, 2.0);
        assert_eq!(
            clock.to_virtual(DateTime::from_ticks(1_000)),
            DateTime::from_ticks(500)
        );
    }

    #[test]
    fn to_real_inverts_to_virtual() {
        let origin = DateTime::from_ticks(500);
        let clock = VirtualClock::with_params(origin, TimeSpan::from_ticks(200), 3.0);
        let real = DateTime::from_ticks(5_000);
        let v = clock.to_virtual(real);
        assert_eq!(clock.to_real(v), real);
    }
}
