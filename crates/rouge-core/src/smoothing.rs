//! Temporal smoothing of detector output.

use std::collections::VecDeque;

use crate::landmarks::{Landmark, LandmarkSet};

/// Moving average over the most recent landmark sets.
///
/// Frame-to-frame detector jitter makes painted features shimmer; the
/// per-index mean of the last few frames steadies them. A set whose
/// length differs from the buffered ones (a different mesh model, or
/// refinement toggled) restarts the window.
#[derive(Debug, Clone)]
pub struct LandmarkSmoother {
    window: usize,
    frames: VecDeque<LandmarkSet>,
}

impl LandmarkSmoother {
    pub const DEFAULT_WINDOW: usize = 10;

    /// `window` is clamped to at least 1 (which disables smoothing).
    #[must_use]
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            frames: VecDeque::with_capacity(window),
        }
    }

    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Frames currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Forget every buffered frame, e.g. when the face is lost.
    pub fn reset(&mut self) {
        self.frames.clear();
    }

    /// Add a frame and return the smoothed set.
    ///
    /// Non-finite coordinates in older frames are skipped for that index,
    /// so one bad frame does not poison the average.
    pub fn push(&mut self, set: LandmarkSet) -> LandmarkSet {
        if self.frames.front().is_some_and(|f| f.len() != set.len()) {
            tracing::debug!(len = set.len(), "landmark count changed, restarting smoothing");
            self.frames.clear();
        }
        if self.frames.len() == self.window {
            self.frames.pop_front();
        }
        self.frames.push_back(set);
        self.mean()
    }

    fn mean(&self) -> LandmarkSet {
        let len = self.frames.back().map_or(0, LandmarkSet::len);
        let points = (0..len)
            .map(|i| {
                let (mut sx, mut sy, mut sz, mut n) = (0.0, 0.0, 0.0, 0_u32);
                for lm in self.frames.iter().filter_map(|f| f.get(i)) {
                    if lm.is_finite() {
                        sx += lm.x;
                        sy += lm.y;
                        sz += lm.z;
                        n += 1;
                    }
                }
                if n == 0 {
                    // Nothing finite to average; keep the newest value.
                    return self
                        .frames
                        .back()
                        .and_then(|f| f.get(i))
                        .copied()
                        .unwrap_or(Landmark::new(f64::NAN, f64::NAN, f64::NAN));
                }
                let n = f64::from(n);
                Landmark::new(sx / n, sy / n, sz / n)
            })
            .collect();
        LandmarkSet::new(points)
    }
}

impl Default for LandmarkSmoother {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}
