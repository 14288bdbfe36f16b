use std::collections::VecDeque;
use tb_buffer::{DateTime, TimeSpan};

/// Supplies the two raw clocks a calibration point is built from: a
/// monotonic performance counter (100ns ticks, arbitrary origin) and the
/// system wall clock.
pub trait TimeSource {
    fn counter_ticks(&self) -> i64;
    fn system_time(&self) -> DateTime;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationPoint {
    pub ticks: i64,
    pub file_time: DateTime,
}

/// Bounded-capacity ring of `(ticks, file_time)` calibration points mapping
/// a monotonic counter to wall-clock time, with drift-triggered
/// recalibration and monotonicity enforcement across insertions.
#[derive(Debug)]
pub struct TickCalibration {
    capacity: usize,
    precision: i64,
    max_drift: i64,
    points: VecDeque<CalibrationPoint>,
    high_water_mark: Option<DateTime>,
}

impl Default for TickCalibration {
    fn default() -> Self {
        TickCalibration::new(512, 10, 10_000)
    }
}

impl TickCalibration {
    #[must_use]
    pub fn new(capacity: usize, precision: i64, max_drift: i64) -> Self {
        TickCalibration {
            capacity,
            precision,
            max_drift,
            points: VecDeque::with_capacity(capacity),
            high_water_mark: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Samples `counter -> clock -> counter` and rejects the triple if the
    /// counter delta exceeds `precision`, retrying until an acceptable
    /// sample is taken. There is no time bound on the retry loop; a
    /// misbehaving `TimeSource` will spin forever, matching the source
    /// behavior described in the spec.
    pub fn recalibrate(&mut self, source: &impl TimeSource) -> CalibrationPoint {
        loop {
            let before = source.counter_ticks();
            let file_time = source.system_time();
            let after = source.counter_ticks();
            if after - before <= self.precision {
                let ticks = before + (after - before) / 2;
                return self.observe(ticks, file_time);
            }
        }
    }

    /// Records an observed `(ticks, file_time)` sample. Inserts a new
    /// calibration point only if the sample drifts from the projection of
    /// the most recent point by more than `max_drift`; otherwise the
    /// existing calibration is considered still valid and the most recent
    /// point is returned unchanged.
    pub fn observe(&mut self, ticks: i64, file_time: DateTime) -> CalibrationPoint {
        if let Some(last) = self.points.back().copied() {
            let projected = last.file_time + TimeSpan::from_ticks(ticks - last.ticks);
            let drift = (file_time.ticks() - projected.ticks()).abs();
            if drift <= self.max_drift {
                return last;
            }
        }
        self.insert(ticks, file_time)
    }

    fn insert(&mut self, ticks: i64, file_time: DateTime) -> CalibrationPoint {
        let file_time = match self.high_water_mark {
            Some(hwm) if file_time < hwm => hwm,
            _ => file_time,
        };
        let point = CalibrationPoint { ticks, file_time };
        if self.points.len() == self.capacity {
            let evicted = self.points.pop_front();
            tracing::debug!(?evicted, "calibration ring full, evicting oldest point");
        }
        self.points.push_back(point);
        self.high_water_mark = Some(file_time);
        point
    }

    /// Maps a tick count to wall-clock file time, walking the ring
    /// backwards from the most recent calibration point to find the
    /// closest point whose tick value is `<=` the requested one. The
    /// result is clamped to the next calibration point's file time (if
    /// any) to preserve monotonicity across the whole ring.
    pub fn ticks_to_file_time(&mut self, ticks: i64) -> Option<DateTime> {
        let idx = self
            .points
            .iter()
            .rposition(|p| p.ticks <= ticks)
            .or(if self.points.is_empty() { None } else { Some(0) })?;
        let point = self.points[idx];
        let mut result = point.file_time + TimeSpan::from_ticks(ticks - point.ticks);
        if let Some(next) = self.points.get(idx + 1) {
            result = result.min(next.file_time);
        }
        self.high_water_mark = Some(self.high_water_mark.map_or(result, |h| h.max(result)));
        Some(result)
    }
}
