//! Temporal pattern buffer: decay-weighted memory of recent patterns.
//!
//! Each entry carries a hypervector pattern, a scalar resonance, a set of
//! category tags and a timestamp. Older entries count less:
//!
//! ```text
//! weight = exp(-decay_rate * age) * (1 + shared_categories)
//! ```
//!
//! Aggregates use weights normalized to sum to one. Time is always passed in
//! explicitly as seconds (`f64`); [`now_secs`] reads the wall clock for
//! callers that want it.

use std::collections::{BTreeSet, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::vsa::HyperVector;
use crate::vsa::ops::{VsaOps, VsaResult};

/// Trend depth used by multi-resolution analysis and prediction.
pub const BASE_DEPTH: usize = 7;

/// Timescales (in entries) examined by multi-resolution analysis.
pub const TIMESCALES: [f64; SCALE_COUNT] = [1.0, 4.0, 8.0, 12.0];

/// Number of entries in [`TIMESCALES`].
pub const SCALE_COUNT: usize = 4;

const PHI: f64 = 1.618_033_988_749_895;

/// Seconds since the Unix epoch.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// A recorded pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternEntry {
    pub pattern: HyperVector,
    pub resonance: f64,
    pub categories: BTreeSet<String>,
    pub timestamp: f64,
}

impl PatternEntry {
    /// Seconds elapsed since the entry was recorded (never negative).
    pub fn age(&self, now: f64) -> f64 {
        (now - self.timestamp).max(0.0)
    }

    /// Number of this entry's categories present in `current`.
    pub fn matches(&self, current: &BTreeSet<String>) -> usize {
        self.categories.intersection(current).count()
    }

    /// Unnormalized weight of this entry at time `now`.
    pub fn weight(&self, decay_rate: f64, now: f64, current: &BTreeSet<String>) -> f64 {
        (-decay_rate * self.age(now)).exp() * (1 + self.matches(current)) as f64
    }
}

/// Correlation of the resonance stream at several timescales.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiResolution {
    /// Mean Pearson correlation between successive windows, per timescale.
    pub scale_correlations: [f64; SCALE_COUNT],
    /// φ-weighted coherence across the 4–8 and 6–12 ranges.
    pub cross_scale_coherence: f64,
    /// Index into [`TIMESCALES`] of the most correlated scale.
    pub dominant_scale: usize,
}

impl MultiResolution {
    fn flat() -> Self {
        Self {
            scale_correlations: [0.0; SCALE_COUNT],
            cross_scale_coherence: 0.0,
            dominant_scale: 0,
        }
    }

    pub fn dominant_correlation(&self) -> f64 {
        self.scale_correlations[self.dominant_scale]
    }
}

impl std::fmt::Display for MultiResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MR[scales={:.3?}, coherence={:.3}, dominant={}]",
            self.scale_correlations, self.cross_scale_coherence, self.dominant_scale
        )
    }
}

/// Bounded, time-windowed buffer of weighted patterns.
///
/// Entries older than `window_secs` are evicted lazily on every add and on
/// every time-aware read; beyond `max_entries` the oldest are dropped.
#[derive(Debug, Clone)]
pub struct TemporalPatternBuffer {
    entries: VecDeque<PatternEntry>,
    window_secs: f64,
    max_entries: usize,
    decay_rate: f64,
}

impl Default for TemporalPatternBuffer {
    fn default() -> Self {
        Self::new(60.0, 1000)
    }
}

impl TemporalPatternBuffer {
    /// Create a buffer with unit decay rate.
    pub fn new(window_secs: f64, max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            window_secs,
            max_entries,
            decay_rate: 1.0,
        }
    }

    pub fn with_decay_rate(mut self, decay_rate: f64) -> Self {
        self.decay_rate = decay_rate;
        self
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    /// Record a pattern observed at `now`.
    pub fn add_pattern(
        &mut self,
        pattern: HyperVector,
        resonance: f64,
        categories: BTreeSet<String>,
        now: f64,
    ) {
        self.entries.push_back(PatternEntry {
            pattern,
            resonance,
            categories,
            timestamp: now,
        });
        self.evict(now);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Drop entries older than the time window.
    pub fn evict(&mut self, now: f64) {
        let cutoff = now - self.window_secs;
        let before = self.entries.len();
        self.entries.retain(|e| e.timestamp >= cutoff);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::trace!(evicted, remaining = self.entries.len(), "evicted stale patterns");
        }
    }

    fn normalized_weights(&self, current: &BTreeSet<String>, now: f64) -> Vec<f64> {
        let mut weights: Vec<f64> = self
            .entries
            .iter()
            .map(|e| e.weight(self.decay_rate, now, current))
            .collect();
        let sum: f64 = weights.iter().sum();
        if sum > 0.0 {
            weights.iter_mut().for_each(|w| *w /= sum);
        } else {
            // Every weight underflowed: treat entries equally.
            let uniform = 1.0 / weights.len() as f64;
            weights.iter_mut().for_each(|w| *w = uniform);
        }
        weights
    }

    /// Decay- and category-weighted mean resonance. Empty buffer → 1.0.
    pub fn weighted_resonance(&mut self, current: &BTreeSet<String>, now: f64) -> f64 {
        self.evict(now);
        if self.entries.is_empty() {
            return 1.0;
        }
        self.normalized_weights(current, now)
            .iter()
            .zip(&self.entries)
            .map(|(w, e)| w * e.resonance)
            .sum()
    }

    /// Weighted mean similarity between `query` and the stored patterns.
    ///
    /// `None` when the buffer is empty.
    pub fn recall(
        &mut self,
        ops: &VsaOps,
        query: &HyperVector,
        current: &BTreeSet<String>,
        now: f64,
    ) -> VsaResult<Option<f64>> {
        self.evict(now);
        if self.entries.is_empty() {
            return Ok(None);
        }
        let weights = self.normalized_weights(current, now);
        let mut total = 0.0;
        for (w, entry) in weights.iter().zip(&self.entries) {
            total += w * f64::from(ops.similarity(query, &entry.pattern)?);
        }
        Ok(Some(total))
    }

    pub fn most_recent(&self) -> Option<&PatternEntry> {
        self.entries.back()
    }

    pub fn entries_with_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a PatternEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.categories.contains(category))
    }

    /// Plain mean resonance. Empty buffer → 1.0.
    pub fn average_resonance(&self) -> f64 {
        if self.entries.is_empty() {
            return 1.0;
        }
        self.entries.iter().map(|e| e.resonance).sum::<f64>() / self.entries.len() as f64
    }

    /// Resonances of the last `depth` entries, oldest first.
    pub fn trend(&mut self, depth: usize, now: f64) -> Vec<f64> {
        self.evict(now);
        let start = self.entries.len().saturating_sub(depth);
        self.entries.iter().skip(start).map(|e| e.resonance).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Correlate the resonance stream with itself at each of [`TIMESCALES`].
    ///
    /// Returns all zeros until at least [`BASE_DEPTH`] entries are buffered.
    pub fn analyze_multi_resolution(&mut self, now: f64) -> MultiResolution {
        self.evict(now);
        if self.entries.len() < BASE_DEPTH {
            return MultiResolution::flat();
        }

        let mut scale_correlations = [0.0; SCALE_COUNT];
        for (slot, &scale) in scale_correlations.iter_mut().zip(TIMESCALES.iter()) {
            *slot = self.scale_correlation(scale);
        }

        let coherence = (self.correlate_range(4.0, 8.0) + self.correlate_range(6.0, 12.0)) / 2.0;

        let mut dominant_scale = 0;
        for (i, &c) in scale_correlations.iter().enumerate().skip(1) {
            if c > scale_correlations[dominant_scale] {
                dominant_scale = i;
            }
        }

        MultiResolution {
            scale_correlations,
            cross_scale_coherence: coherence,
            dominant_scale,
        }
    }

    /// Next resonance: trend extrapolation blended with the mean by how
    /// coherent the stream is across scales.
    pub fn predict_next_resonance(&mut self, now: f64) -> f64 {
        let analysis = self.analyze_multi_resolution(now);
        let trend = self.trend(BASE_DEPTH, now);
        let &[.., prev, last] = &trend[..] else {
            return self.average_resonance();
        };

        let coherence = analysis.cross_scale_coherence;
        let extrapolated = last + (last - prev) * coherence;
        let blend = coherence.abs().min(1.0);
        extrapolated * blend + self.average_resonance() * (1.0 - blend)
    }

    // Mean correlation between up to three successive windows of recent
    // resonances, each `BASE_DEPTH / scale` long and `scale` entries apart.
    fn scale_correlation(&self, scale: f64) -> f64 {
        let window = (BASE_DEPTH as f64 / scale).max(2.0) as usize;
        let len = self.entries.len();
        if len < window * 2 {
            return 0.0;
        }
        let step = (scale as usize).max(1);

        let mut windows: Vec<Vec<f64>> = Vec::with_capacity(3);
        let mut i = len - 1;
        while i >= window && windows.len() < 3 {
            windows.push((0..window).map(|j| self.entries[i - j].resonance).collect());
            match i.checked_sub(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        if windows.len() < 2 {
            return 0.0;
        }

        let total: f64 = windows.windows(2).map(|w| pearson(&w[0], &w[1])).sum();
        total / (windows.len() - 1) as f64
    }

    fn correlate_range(&self, min: f64, max: f64) -> f64 {
        let c_min = self.scale_correlation(min);
        let c_mid = self.scale_correlation((min + max) / 2.0);
        let c_max = self.scale_correlation(max);
        (c_min * PHI + c_mid + c_max / PHI) / (PHI + 1.0 + 1.0 / PHI)
    }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let (mut sx, mut sy, mut sxy, mut sx2, mut sy2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y).take(n) {
        sx += a;
        sy += b;
        sxy += a * b;
        sx2 += a * a;
        sy2 += b * b;
    }
    let n = n as f64;
    let num = n * sxy - sx * sy;
    let den = ((n * sx2 - sx * sx) * (n * sy2 - sy * sy)).sqrt();
    if den > 0.0 { num / den } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd;
    use crate::vsa::Dimension;

    fn ops() -> VsaOps {
        VsaOps::new(simd::best_kernel(), Dimension::TEST)
    }

    fn cats(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_buffer_defaults() {
        let ops = ops();
        let mut buf = TemporalPatternBuffer::default();
        assert_eq!(buf.weighted_resonance(&cats(&[]), 0.0), 1.0);
        assert_eq!(buf.average_resonance(), 1.0);
        assert!(buf.most_recent().is_none());
        assert!(buf.recall(&ops, &ops.seeded(1), &cats(&[]), 0.0).unwrap().is_none());
        assert!(buf.trend(5, 0.0).is_empty());
        assert_eq!(buf.predict_next_resonance(0.0), 1.0);
    }

    #[test]
    fn recent_entries_dominate() {
        let ops = ops();
        let mut buf = TemporalPatternBuffer::new(100.0, 10);
        buf.add_pattern(ops.seeded(1), 0.2, cats(&[]), 0.0);
        buf.add_pattern(ops.seeded(2), 0.9, cats(&[]), 5.0);
        let r = buf.weighted_resonance(&cats(&[]), 5.0);
        // Weights e^-5 and 1.
        assert!(r > 0.89 && r < 0.9, "r={r}");
        assert!((buf.average_resonance() - 0.55).abs() < 1e-12);
    }

    #[test]
    fn shared_categories_boost_weight() {
        let ops = ops();
        let mut buf = TemporalPatternBuffer::new(100.0, 10);
        buf.add_pattern(ops.seeded(1), 0.0, cats(&["music"]), 1.0);
        buf.add_pattern(ops.seeded(2), 1.0, cats(&["math"]), 1.0);
        let r = buf.weighted_resonance(&cats(&["music"]), 1.0);
        assert!((r - 1.0 / 3.0).abs() < 1e-12, "r={r}");
        assert_eq!(buf.entries_with_category("music").count(), 1);
    }

    #[test]
    fn eviction_by_window_and_capacity() {
        let ops = ops();
        let mut buf = TemporalPatternBuffer::new(10.0, 3);
        buf.add_pattern(ops.seeded(1), 0.5, cats(&[]), 0.0);
        buf.add_pattern(ops.seeded(2), 0.5, cats(&[]), 20.0);
        assert_eq!(buf.len(), 1);

        for t in 0..5 {
            buf.add_pattern(ops.seeded(10 + t), t as f64, cats(&[]), 21.0 + t as f64);
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.trend(10, 25.0), vec![2.0, 3.0, 4.0]);
        assert_eq!(buf.most_recent().unwrap().resonance, 4.0);

        buf.clear();
        assert!(buf.is_empty());
    }

    #[test]
    fn recall_measures_similarity_to_stored_patterns() {
        let ops = ops();
        let stored = ops.seeded(42);
        let mut buf = TemporalPatternBuffer::new(100.0, 10);
        buf.add_pattern(stored.clone(), 1.0, cats(&[]), 0.0);

        let same = buf.recall(&ops, &stored, &cats(&[]), 0.0).unwrap().unwrap();
        let other = buf.recall(&ops, &ops.seeded(7), &cats(&[]), 0.0).unwrap().unwrap();
        assert_eq!(same, 1.0);
        assert!(other > 0.4 && other < 0.6, "other={other}");
    }

    #[test]
    fn short_history_has_flat_analysis() {
        let ops = ops();
        let mut buf = TemporalPatternBuffer::new(100.0, 100);
        for t in 0..BASE_DEPTH - 1 {
            buf.add_pattern(ops.seeded(t as u64), t as f64, cats(&[]), t as f64);
        }
        let mr = buf.analyze_multi_resolution(10.0);
        assert_eq!(mr.scale_correlations, [0.0; 4]);
        assert_eq!(mr.cross_scale_coherence, 0.0);
    }

    #[test]
    fn linear_ramp_is_fully_coherent() {
        let ops = ops();
        let mut buf = TemporalPatternBuffer::new(1000.0, 100);
        for t in 0..20 {
            buf.add_pattern(ops.seeded(t), t as f64 * 0.05, cats(&[]), t as f64);
        }
        let mr = buf.analyze_multi_resolution(20.0);
        for c in mr.scale_correlations {
            assert!((c - 1.0).abs() < 1e-9, "c={c}");
        }
        assert!((mr.cross_scale_coherence - 1.0).abs() < 1e-9);
        assert_eq!(mr.dominant_scale, 0);

        // last = 0.95, step 0.05, full coherence → pure extrapolation.
        let next = buf.predict_next_resonance(20.0);
        assert!((next - 1.0).abs() < 1e-9, "next={next}");
    }

    #[test]
    fn constant_stream_predicts_average() {
        let ops = ops();
        let mut buf = TemporalPatternBuffer::new(1000.0, 100);
        for t in 0..12 {
            buf.add_pattern(ops.seeded(t), 0.5, cats(&[]), t as f64);
        }
        let mr = buf.analyze_multi_resolution(12.0);
        assert_eq!(mr.cross_scale_coherence, 0.0);
        assert_eq!(buf.predict_next_resonance(12.0), 0.5);
    }
}
