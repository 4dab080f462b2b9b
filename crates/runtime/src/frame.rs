use foundation::time::Time;

/// Metadata for one rendered frame.
///
/// The engine never reads a wall clock: every per-frame decision is driven by
/// the `Frame` handed in by the scene runtime, so a run can be recorded and
/// replayed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds).
    pub dt_s: f64,
    /// Scene time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    /// Frame `index` of a fixed-rate clock.
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// Frame at an explicit scene time, for runtimes with a variable frame rate.
    pub fn at(index: u64, time: Time, dt_s: f64) -> Self {
        Self { index, dt_s, time }
    }

    pub fn next(self) -> Self {
        Self::at(self.index + 1, Time(self.time.0 + self.dt_s), self.dt_s)
    }
}
